use crate::{extractor::AuthenticatedIdentity, model::response::ApiResponse};
use axum::{extract::State, Json};
use registry::AppRegistry;
use shared::error::AppResult;

// キャッシュ済みのトークンを破棄する（ID プロバイダ側のトークンはそのまま）
pub async fn logout(
    identity: AuthenticatedIdentity,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<()>>> {
    registry
        .auth_repository()
        .delete_token(&identity.access_token)
        .await?;
    Ok(Json(ApiResponse::ok(()).with_message("logged out")))
}
