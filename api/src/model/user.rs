use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    id::{LibraryId, UserId},
    role::Role,
    user::{event::UpdateProfile, User},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub library_id: Option<LibraryId>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            user_id,
            external_id: _,
            name,
            email,
            phone,
            role,
            library_id,
            created_at,
        } = value;
        Self {
            id: user_id,
            name,
            email,
            phone,
            role,
            library_id,
            created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[garde(inner(length(min = 1, max = 255)))]
    pub name: Option<String>,
    #[garde(inner(length(max = 64)))]
    pub phone: Option<String>,
}

impl UpdateProfileRequest {
    pub fn into_event(self, user_id: UserId) -> UpdateProfile {
        UpdateProfile::new(user_id, self.name, self.phone)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRoleRequest {
    #[garde(skip)]
    pub role: Role,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub role: Option<Role>,
    pub search: Option<String>,
}
