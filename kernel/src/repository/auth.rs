use crate::model::auth::{AccessToken, ExternalIdentity};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "test-util", mockall::automock)]
#[async_trait]
pub trait AuthRepository: Send + Sync {
    // 検証済みトークンに対応する外部 ID をキャッシュから取得する
    async fn fetch_identity_from_cache(
        &self,
        access_token: &AccessToken,
    ) -> AppResult<Option<ExternalIdentity>>;
    // 外部 ID プロバイダで検証できたトークンをキャッシュする
    async fn cache_identity(
        &self,
        access_token: &AccessToken,
        identity: &ExternalIdentity,
    ) -> AppResult<()>;
    async fn delete_token(&self, access_token: &AccessToken) -> AppResult<()>;
}
