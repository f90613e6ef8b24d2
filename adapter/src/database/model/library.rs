use super::parse_enum;
use chrono::{DateTime, NaiveTime, Utc};
use kernel::model::{
    id::{LibraryId, UserId},
    library::{Library, LibraryOwner, OpeningHours},
};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct LibraryRow {
    pub library_id: LibraryId,
    pub name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub status: String,
    pub is_active: bool,
    pub rejection_reason: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub owner_id: UserId,
    pub owner_name: String,
    pub owner_email: String,
}

// From トレイトの代わりに、開館時間を引数にとる into_library メソッドを定義する
impl LibraryRow {
    pub fn into_library(self, opening_hours: Vec<OpeningHours>) -> Result<Library, AppError> {
        let LibraryRow {
            library_id,
            name,
            description,
            address,
            city,
            phone,
            email,
            status,
            is_active,
            rejection_reason,
            approved_at,
            created_at,
            owner_id,
            owner_name,
            owner_email,
        } = self;
        Ok(Library {
            library_id,
            name,
            description,
            address,
            city,
            phone,
            email,
            status: parse_enum("library status", &status)?,
            is_active,
            rejection_reason,
            approved_at,
            created_at,
            owner: LibraryOwner {
                owner_id,
                owner_name,
                owner_email,
            },
            opening_hours,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct OpeningHoursRow {
    pub library_id: LibraryId,
    pub day_of_week: i16,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub is_closed: bool,
}

impl From<OpeningHoursRow> for OpeningHours {
    fn from(value: OpeningHoursRow) -> Self {
        let OpeningHoursRow {
            library_id: _,
            day_of_week,
            open_time,
            close_time,
            is_closed,
        } = value;
        OpeningHours {
            day_of_week,
            open_time,
            close_time,
            is_closed,
        }
    }
}
