use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use kernel::{model::mail::MailMessage, service::mailer::Mailer};
use reqwest::Client;
use shared::{
    config::MailConfig,
    error::{AppError, AppResult},
};
use std::sync::Arc;

/// Sends mail through an HTTP mail API that accepts a base64url encoded
/// RFC 822 message as `{ "raw": ... }`.
pub struct HttpMailer {
    client: Client,
    api_url: String,
    access_token: String,
    sender: String,
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: MailMessage) -> AppResult<()> {
        let encoded_message =
            general_purpose::URL_SAFE_NO_PAD.encode(message.to_rfc822(&self.sender).as_bytes());

        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "raw": encoded_message }))
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("mail api: {e}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::ExternalServiceError(format!(
                "mail api answered {status}: {body}"
            )));
        }

        tracing::info!(to = %message.to, subject = %message.subject, "mail sent");
        Ok(())
    }
}

// メール API が設定されていない環境ではログ出力のみ行う
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> AppResult<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "mail api is not configured; mail was not sent"
        );
        Ok(())
    }
}

pub fn build_mailer(config: &MailConfig) -> Arc<dyn Mailer> {
    match &config.api_url {
        Some(api_url) => Arc::new(HttpMailer {
            client: Client::new(),
            api_url: api_url.clone(),
            access_token: config.access_token.clone(),
            sender: config.sender.clone(),
        }),
        None => Arc::new(LogMailer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_never_fails() {
        let mailer = build_mailer(&MailConfig {
            api_url: None,
            access_token: String::new(),
            sender: "no-reply@example.com".into(),
        });
        let res = mailer
            .send(MailMessage {
                to: "a@example.com".into(),
                subject: "hi".into(),
                body: "body".into(),
            })
            .await;
        assert!(res.is_ok());
    }
}
