use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::user::{change_role, get_current_user, list_users, sync_user, update_current_user};

pub fn build_user_routers() -> Router<AppRegistry> {
    let users_routers = Router::new()
        .route("/", get(list_users))
        .route("/sync", post(sync_user))
        .route("/me", get(get_current_user))
        .route("/me", put(update_current_user))
        .route("/:user_id/role", put(change_role));

    Router::new().nest("/users", users_routers)
}
