use crate::{
    extractor::{AppJson, AppPath, AppQuery, AuthenticatedIdentity, AuthorizedUser},
    model::{
        pagination::{PaginatedResponse, PaginationQuery},
        response::ApiResponse,
        user::{UpdateProfileRequest, UpdateUserRoleRequest, UserListQuery, UserResponse},
    },
};
use axum::{
    extract::State,
    Json,
};
use garde::Validate;
use kernel::model::{
    id::UserId,
    user::{
        event::{CreateUser, UpdateUserRole},
        UserListOptions,
    },
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

// ログイン直後に呼ばれ、ローカルのユーザーがいなければ作成する
pub async fn sync_user(
    identity: AuthenticatedIdentity,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    registry
        .user_repository()
        .create_if_missing(CreateUser::from(identity.identity))
        .await
        .map(UserResponse::from)
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn get_current_user(user: AuthorizedUser) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::ok(user.user.into()))
}

pub async fn update_current_user(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    req.validate(&())?;

    registry
        .user_repository()
        .update_profile(req.into_event(user.id()))
        .await
        .map(UserResponse::from)
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn list_users(
    user: AuthorizedUser,
    AppQuery(page): AppQuery<PaginationQuery>,
    AppQuery(query): AppQuery<UserListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<UserResponse>>>> {
    user.ensure_super_admin()?;
    page.validate(&())?;

    let options = UserListOptions {
        role: query.role,
        search: query.search,
        list: page.into(),
    };
    registry
        .user_repository()
        .find_all(options)
        .await
        .map(PaginatedResponse::from_list)
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn change_role(
    user: AuthorizedUser,
    AppPath(user_id): AppPath<UserId>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<UpdateUserRoleRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.ensure_super_admin()?;
    if user.id() == user_id {
        return Err(AppError::BadRequest("you cannot change your own role".into()));
    }

    registry
        .user_repository()
        .update_role(UpdateUserRole::new(user_id, req.role))
        .await?;
    Ok(Json(ApiResponse::ok(()).with_message("role updated")))
}
