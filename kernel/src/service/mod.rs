pub mod identity;
pub mod mailer;
