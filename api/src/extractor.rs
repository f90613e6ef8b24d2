use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use kernel::model::{
    auth::{AccessToken, ExternalIdentity},
    id::{LibraryId, UserId},
    user::User,
};
use registry::AppRegistry;
use serde::de::DeserializeOwned;
use shared::error::{AppError, AppResult};

// axum 標準の抽出器と同じだが、失敗時は AppError の形式で返す
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// JSON body that may be omitted. An empty body yields `T::default()`.
pub struct OptionalJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await?;
        if body.is_empty() {
            return Ok(Self(T::default()));
        }
        serde_json::from_slice(&body)
            .map(Self)
            .map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

/// A caller whose bearer token has been verified. The caller may not have a
/// local user record yet.
pub struct AuthenticatedIdentity {
    pub access_token: AccessToken,
    pub identity: ExternalIdentity,
}

/// A verified caller with a local user record.
pub struct AuthorizedUser {
    pub access_token: AccessToken,
    pub user: User,
}

impl AuthorizedUser {
    pub fn id(&self) -> UserId {
        self.user.user_id
    }

    pub fn is_super_admin(&self) -> bool {
        self.user.is_super_admin()
    }

    pub fn ensure_super_admin(&self) -> AppResult<()> {
        if !self.is_super_admin() {
            return Err(AppError::ForbiddenOperation);
        }
        Ok(())
    }

    pub fn ensure_can_manage(&self, library_id: LibraryId) -> AppResult<()> {
        if !self.user.can_manage(library_id) {
            return Err(AppError::ForbiddenOperation);
        }
        Ok(())
    }
}

/// Resolves the caller when a bearer token is present and valid; anonymous
/// otherwise.
pub struct OptionalUser(pub Option<User>);

impl OptionalUser {
    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(|u| u.user_id)
    }
}

// キャッシュに無ければ ID プロバイダに問い合わせ、結果をキャッシュする
async fn verify(parts: &mut Parts, registry: &AppRegistry) -> AppResult<AuthenticatedIdentity> {
    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| AppError::UnauthenticatedError)?;
    let access_token = AccessToken(bearer.token().to_string());

    let auth = registry.auth_repository();
    match auth.fetch_identity_from_cache(&access_token).await {
        Ok(Some(identity)) => {
            return Ok(AuthenticatedIdentity {
                access_token,
                identity,
            });
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error.message = %e, "failed to read token cache");
        }
    }

    let identity = registry
        .identity_provider()
        .fetch_identity(&access_token)
        .await?
        .ok_or(AppError::UnauthorizedError)?;

    if let Err(e) = auth.cache_identity(&access_token, &identity).await {
        tracing::warn!(error.message = %e, "failed to cache verified identity");
    }

    Ok(AuthenticatedIdentity {
        access_token,
        identity,
    })
}

async fn load_user(registry: &AppRegistry, identity: &ExternalIdentity) -> AppResult<User> {
    registry
        .user_repository()
        .find_by_external_id(&identity.subject)
        .await?
        .ok_or(AppError::UnauthorizedError)
}

#[async_trait]
impl FromRequestParts<AppRegistry> for AuthenticatedIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        verify(parts, registry).await
    }
}

#[async_trait]
impl FromRequestParts<AppRegistry> for AuthorizedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        let AuthenticatedIdentity {
            access_token,
            identity,
        } = verify(parts, registry).await?;
        let user = load_user(registry, &identity).await?;
        Ok(Self { access_token, user })
    }
}

#[async_trait]
impl FromRequestParts<AppRegistry> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(axum::http::header::AUTHORIZATION) {
            return Ok(Self(None));
        }
        // 無効なトークンは未ログインとして扱う
        let user = match verify(parts, registry).await {
            Ok(AuthenticatedIdentity { identity, .. }) => load_user(registry, &identity).await.ok(),
            Err(_) => None,
        };
        Ok(Self(user))
    }
}
