use crate::model::{auth::ExternalIdentity, id::UserId, role::Role};
use derive_new::new;

#[derive(Debug, Clone, new)]
pub struct CreateUser {
    pub external_id: String,
    pub name: String,
    pub email: String,
}

impl From<ExternalIdentity> for CreateUser {
    fn from(value: ExternalIdentity) -> Self {
        let ExternalIdentity {
            subject,
            email,
            name,
        } = value;
        Self {
            external_id: subject,
            name,
            email,
        }
    }
}

#[derive(Debug, new)]
pub struct UpdateProfile {
    pub user_id: UserId,
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, new)]
pub struct UpdateUserRole {
    pub user_id: UserId,
    pub role: Role,
}
