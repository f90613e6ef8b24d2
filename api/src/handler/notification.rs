use kernel::model::mail::MailMessage;
use registry::AppRegistry;

// メール送信はレスポンスを待たせないようにバックグラウンドで行い、失敗はログに残すだけにする
pub(crate) fn send_in_background(registry: &AppRegistry, message: MailMessage) {
    let mailer = registry.mailer();
    tokio::spawn(async move {
        let to = message.to.clone();
        if let Err(e) = mailer.send(message).await {
            tracing::warn!(error.message = %e, to = %to, "failed to send mail");
        }
    });
}
