use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::booking::{
    cancel_booking, complete_booking, create_booking, list_library_bookings, list_my_bookings,
};

pub fn build_booking_routers() -> Router<AppRegistry> {
    let bookings_routers = Router::new()
        .route("/mine", get(list_my_bookings))
        .route("/:booking_id/cancel", post(cancel_booking))
        .route("/:booking_id/complete", post(complete_booking));

    Router::new()
        .route("/libraries/:library_id/bookings", post(create_booking))
        .route("/libraries/:library_id/bookings", get(list_library_bookings))
        .nest("/bookings", bookings_routers)
}
