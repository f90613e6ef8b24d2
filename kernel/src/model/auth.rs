use serde::{Deserialize, Serialize};

// Authorization: Bearer <token> で受け取ったアクセストークン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

/// Identity returned by the external identity provider for a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub subject: String,
    pub email: String,
    pub name: String,
}
