use async_trait::async_trait;
use kernel::{
    model::auth::{AccessToken, ExternalIdentity},
    service::identity::IdentityProvider,
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shared::{
    config::IdentityConfig,
    error::{AppError, AppResult},
};

// ID プロバイダの userinfo エンドポイントが返す JSON
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: String,
    name: Option<String>,
}

impl From<UserInfo> for ExternalIdentity {
    fn from(value: UserInfo) -> Self {
        let UserInfo { sub, email, name } = value;
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.clone());
        ExternalIdentity {
            subject: sub,
            email,
            name,
        }
    }
}

pub struct HttpIdentityProvider {
    client: Client,
    userinfo_url: String,
}

impl HttpIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            client: Client::new(),
            userinfo_url: config.userinfo_url.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn fetch_identity(
        &self,
        access_token: &AccessToken,
    ) -> AppResult<Option<ExternalIdentity>> {
        let res = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(&access_token.0)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("identity provider: {e}")))?;

        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            s if s.is_success() => {
                let info: UserInfo = res.json().await.map_err(|e| {
                    AppError::ExternalServiceError(format!("identity provider response: {e}"))
                })?;
                Ok(Some(info.into()))
            }
            s => Err(AppError::ExternalServiceError(format!(
                "identity provider answered {s}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_name_falls_back_to_email() {
        let info: UserInfo =
            serde_json::from_str(r#"{"sub":"auth0|1","email":"a@example.com"}"#).unwrap();
        let identity = ExternalIdentity::from(info);
        assert_eq!(identity.subject, "auth0|1");
        assert_eq!(identity.name, "a@example.com");
    }
}
