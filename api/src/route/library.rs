use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::library::{
    list_libraries, register_library, replace_opening_hours, show_dashboard, show_library,
    show_my_library, update_library,
};

// /libraries 配下は座席・予約などのルーターとも共有するので nest せずに登録する
pub fn build_library_routers() -> Router<AppRegistry> {
    Router::new()
        .route("/libraries", get(list_libraries))
        .route("/libraries/register", post(register_library))
        .route("/libraries/mine", get(show_my_library))
        .route("/libraries/:library_id", get(show_library))
        .route("/libraries/:library_id", put(update_library))
        .route(
            "/libraries/:library_id/opening-hours",
            put(replace_opening_hours),
        )
        .route("/libraries/:library_id/dashboard", get(show_dashboard))
}
