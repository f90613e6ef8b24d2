use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::membership::{
    cancel_membership, create_plan, deactivate_plan, list_members, list_my_memberships,
    list_plans, purchase_membership, update_plan,
};

pub fn build_membership_routers() -> Router<AppRegistry> {
    Router::new()
        .route("/libraries/:library_id/membership-plans", get(list_plans))
        .route("/libraries/:library_id/membership-plans", post(create_plan))
        .route(
            "/libraries/:library_id/membership-plans/:plan_id",
            put(update_plan),
        )
        .route(
            "/libraries/:library_id/membership-plans/:plan_id",
            delete(deactivate_plan),
        )
        .route("/libraries/:library_id/members", get(list_members))
        .route(
            "/membership-plans/:plan_id/purchase",
            post(purchase_membership),
        )
        .route("/memberships/mine", get(list_my_memberships))
        .route(
            "/memberships/:membership_id/cancel",
            post(cancel_membership),
        )
}
