use crate::{
    extractor::{AppJson, AppPath, AppQuery, AuthorizedUser},
    model::{
        membership::{
            CreateMembershipPlanRequest, MembershipPlanResponse, MembershipResponse,
            PurchaseMembershipRequest, UpdateMembershipPlanRequest,
        },
        pagination::{PaginatedResponse, PaginationQuery},
        response::ApiResponse,
    },
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use garde::Validate;
use kernel::model::{
    id::{LibraryId, MembershipId, MembershipPlanId},
    membership::{
        event::{CancelMembership, DeactivateMembershipPlan, PurchaseMembership},
        Membership, MembershipPlan,
    },
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

async fn fetch_plan(registry: &AppRegistry, plan_id: MembershipPlanId) -> AppResult<MembershipPlan> {
    registry
        .membership_repository()
        .find_plan_by_id(plan_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("membership plan ({plan_id}) not found")))
}

async fn fetch_membership(
    registry: &AppRegistry,
    membership_id: MembershipId,
) -> AppResult<Membership> {
    registry
        .membership_repository()
        .find_by_id(membership_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("membership ({membership_id}) not found")))
}

pub async fn list_plans(
    AppPath(library_id): AppPath<LibraryId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<Vec<MembershipPlanResponse>>>> {
    registry
        .membership_repository()
        .find_plans(library_id, false)
        .await
        .map(|plans| plans.into_iter().map(MembershipPlanResponse::from).collect())
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn create_plan(
    user: AuthorizedUser,
    AppPath(library_id): AppPath<LibraryId>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<CreateMembershipPlanRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MembershipPlanResponse>>)> {
    user.ensure_can_manage(library_id)?;
    req.validate(&())?;

    let plan_id = registry
        .membership_repository()
        .create_plan(req.into_event(library_id))
        .await?;
    let plan = fetch_plan(&registry, plan_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(plan.into()))))
}

pub async fn update_plan(
    user: AuthorizedUser,
    AppPath((library_id, plan_id)): AppPath<(LibraryId, MembershipPlanId)>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<UpdateMembershipPlanRequest>,
) -> AppResult<Json<ApiResponse<MembershipPlanResponse>>> {
    user.ensure_can_manage(library_id)?;
    req.validate(&())?;

    registry
        .membership_repository()
        .update_plan(req.into_event(library_id, plan_id))
        .await?;
    let plan = fetch_plan(&registry, plan_id).await?;
    Ok(Json(ApiResponse::ok(plan.into())))
}

pub async fn deactivate_plan(
    user: AuthorizedUser,
    AppPath((library_id, plan_id)): AppPath<(LibraryId, MembershipPlanId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.ensure_can_manage(library_id)?;

    registry
        .membership_repository()
        .deactivate_plan(DeactivateMembershipPlan::new(library_id, plan_id))
        .await?;
    Ok(Json(ApiResponse::ok(()).with_message("membership plan deactivated")))
}

pub async fn purchase_membership(
    user: AuthorizedUser,
    AppPath(plan_id): AppPath<MembershipPlanId>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<PurchaseMembershipRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MembershipResponse>>)> {
    req.validate(&())?;

    let membership_id = registry
        .membership_repository()
        .purchase(PurchaseMembership::new(
            plan_id,
            user.id(),
            req.payment_method,
            Utc::now(),
        ))
        .await?;
    let membership = fetch_membership(&registry, membership_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(membership.into()))))
}

pub async fn list_my_memberships(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<Vec<MembershipResponse>>>> {
    registry
        .membership_repository()
        .find_by_user(user.id())
        .await
        .map(|items| items.into_iter().map(MembershipResponse::from).collect())
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn list_members(
    user: AuthorizedUser,
    AppPath(library_id): AppPath<LibraryId>,
    AppQuery(page): AppQuery<PaginationQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<MembershipResponse>>>> {
    user.ensure_can_manage(library_id)?;
    page.validate(&())?;

    registry
        .membership_repository()
        .find_by_library(library_id, page.into())
        .await
        .map(PaginatedResponse::from_list)
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn cancel_membership(
    user: AuthorizedUser,
    AppPath(membership_id): AppPath<MembershipId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<MembershipResponse>>> {
    let membership = fetch_membership(&registry, membership_id).await?;
    if membership.user.user_id != user.id() {
        user.ensure_can_manage(membership.plan.library_id)?;
    }

    registry
        .membership_repository()
        .cancel(CancelMembership::new(membership_id))
        .await?;
    let membership = fetch_membership(&registry, membership_id).await?;
    Ok(Json(
        ApiResponse::ok(membership.into()).with_message("membership cancelled"),
    ))
}
