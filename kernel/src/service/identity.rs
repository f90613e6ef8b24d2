use crate::model::auth::{AccessToken, ExternalIdentity};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "test-util", mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Asks the identity provider who owns `access_token`.
    /// `Ok(None)` means the provider rejected the token.
    async fn fetch_identity(&self, access_token: &AccessToken)
        -> AppResult<Option<ExternalIdentity>>;
}
