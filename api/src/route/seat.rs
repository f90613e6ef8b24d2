use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::seat::{
    create_seat, create_seat_type, delete_seat, delete_seat_type, list_seat_types, list_seats,
    show_availability, update_seat, update_seat_type,
};

pub fn build_seat_routers() -> Router<AppRegistry> {
    Router::new()
        .route("/libraries/:library_id/seat-types", get(list_seat_types))
        .route("/libraries/:library_id/seat-types", post(create_seat_type))
        .route(
            "/libraries/:library_id/seat-types/:seat_type_id",
            put(update_seat_type),
        )
        .route(
            "/libraries/:library_id/seat-types/:seat_type_id",
            delete(delete_seat_type),
        )
        .route("/libraries/:library_id/seats", get(list_seats))
        .route("/libraries/:library_id/seats", post(create_seat))
        .route(
            "/libraries/:library_id/seats/availability",
            get(show_availability),
        )
        .route("/libraries/:library_id/seats/:seat_id", put(update_seat))
        .route("/libraries/:library_id/seats/:seat_id", delete(delete_seat))
}
