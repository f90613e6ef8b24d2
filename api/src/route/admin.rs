use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::admin::{approve_library, list_libraries, reject_library, show_analytics};

pub fn build_admin_routers() -> Router<AppRegistry> {
    let admin_routers = Router::new()
        .route("/libraries", get(list_libraries))
        .route("/libraries/:library_id/approve", post(approve_library))
        .route("/libraries/:library_id/reject", post(reject_library))
        .route("/analytics", get(show_analytics));

    Router::new().nest("/admin", admin_routers)
}
