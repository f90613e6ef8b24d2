use crate::{
    database::model::auth::{AuthorizationKey, CachedIdentity},
    redis::RedisClient,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::auth::{AccessToken, ExternalIdentity},
    repository::auth::AuthRepository,
};
use shared::error::AppResult;
use std::sync::Arc;

#[derive(new)]
pub struct AuthRepositoryImpl {
    kv: Arc<RedisClient>,
    ttl: u64,
}

#[async_trait]
impl AuthRepository for AuthRepositoryImpl {
    async fn fetch_identity_from_cache(
        &self,
        access_token: &AccessToken,
    ) -> AppResult<Option<ExternalIdentity>> {
        let key: AuthorizationKey = access_token.into();
        Ok(self.kv.get(&key).await?.map(|CachedIdentity(identity)| identity))
    }

    async fn cache_identity(
        &self,
        access_token: &AccessToken,
        identity: &ExternalIdentity,
    ) -> AppResult<()> {
        let key: AuthorizationKey = access_token.into();
        self.kv
            .set_ex(&key, &CachedIdentity(identity.clone()), self.ttl)
            .await
    }

    async fn delete_token(&self, access_token: &AccessToken) -> AppResult<()> {
        let key: AuthorizationKey = access_token.into();
        self.kv.delete(&key).await
    }
}
