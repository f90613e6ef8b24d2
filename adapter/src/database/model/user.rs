use super::parse_enum;
use chrono::{DateTime, Utc};
use kernel::model::{
    id::{LibraryId, UserId},
    user::User,
};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub user_id: UserId,
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub library_id: Option<LibraryId>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(value: UserRow) -> Result<Self, Self::Error> {
        let UserRow {
            user_id,
            external_id,
            name,
            email,
            phone,
            role,
            library_id,
            created_at,
        } = value;
        Ok(User {
            user_id,
            external_id,
            name,
            email,
            phone,
            role: parse_enum("role", &role)?,
            library_id,
            created_at,
        })
    }
}
