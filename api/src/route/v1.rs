use super::{
    admin::build_admin_routers, auth::build_auth_routers, book::build_book_routers,
    booking::build_booking_routers, forum::build_forum_routers, library::build_library_routers,
    membership::build_membership_routers, seat::build_seat_routers, user::build_user_routers,
};
use axum::Router;
use registry::AppRegistry;

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_auth_routers())
        .merge(build_user_routers())
        .merge(build_library_routers())
        .merge(build_admin_routers())
        .merge(build_seat_routers())
        .merge(build_booking_routers())
        .merge(build_membership_routers())
        .merge(build_book_routers())
        .merge(build_forum_routers());
    Router::new().nest("/api/v1", router)
}
