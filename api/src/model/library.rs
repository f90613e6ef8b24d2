use super::time::hhmm;
use chrono::{DateTime, NaiveTime, Utc};
use garde::Validate;
use kernel::model::{
    auth::ExternalIdentity,
    id::{LibraryId, UserId},
    library::{
        event::{RegisterLibrary, UpdateLibrary},
        Library, LibraryOwner, LibraryStatus, OpeningHours,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHoursPayload {
    #[garde(range(min = 0, max = 6))]
    pub day_of_week: i16,
    #[garde(skip)]
    #[serde(with = "hhmm")]
    pub open_time: NaiveTime,
    #[garde(skip)]
    #[serde(with = "hhmm")]
    pub close_time: NaiveTime,
    #[garde(skip)]
    #[serde(default)]
    pub is_closed: bool,
}

impl From<OpeningHoursPayload> for OpeningHours {
    fn from(value: OpeningHoursPayload) -> Self {
        let OpeningHoursPayload {
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

impl From<OpeningHours> for OpeningHoursPayload {
    fn from(value: OpeningHours) -> Self {
        let OpeningHours {
            day_of_week,
            open_time,
            close_time,
            is_closed,
        } = value;
        Self {
            day_of_week,
            open_time,
            close_time,
            is_closed,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterLibraryRequest {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(skip)]
    #[serde(default)]
    pub description: String,
    #[garde(length(min = 1, max = 512))]
    pub address: String,
    #[garde(length(min = 1, max = 255))]
    pub city: String,
    #[garde(length(min = 1, max = 64))]
    pub phone: String,
    #[garde(email)]
    pub email: String,
    #[garde(dive)]
    #[serde(default)]
    pub opening_hours: Vec<OpeningHoursPayload>,
}

impl RegisterLibraryRequest {
    pub fn into_event(self, identity: ExternalIdentity) -> RegisterLibrary {
        let RegisterLibraryRequest {
            name,
            description,
            address,
            city,
            phone,
            email,
            opening_hours,
        } = self;
        RegisterLibrary::new(
            identity,
            name,
            description,
            address,
            city,
            phone,
            email,
            opening_hours.into_iter().map(OpeningHours::from).collect(),
        )
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLibraryRequest {
    #[garde(inner(length(min = 1, max = 255)))]
    pub name: Option<String>,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(inner(length(min = 1, max = 512)))]
    pub address: Option<String>,
    #[garde(inner(length(min = 1, max = 255)))]
    pub city: Option<String>,
    #[garde(inner(length(min = 1, max = 64)))]
    pub phone: Option<String>,
    #[garde(inner(email))]
    pub email: Option<String>,
}

impl UpdateLibraryRequest {
    pub fn into_event(self, library_id: LibraryId) -> UpdateLibrary {
        let UpdateLibraryRequest {
            name,
            description,
            address,
            city,
            phone,
            email,
        } = self;
        UpdateLibrary {
            library_id,
            name,
            description,
            address,
            city,
            phone,
            email,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOpeningHoursRequest {
    #[garde(dive)]
    pub opening_hours: Vec<OpeningHoursPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryListQuery {
    pub city: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryOwnerResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<LibraryOwner> for LibraryOwnerResponse {
    fn from(value: LibraryOwner) -> Self {
        let LibraryOwner {
            owner_id,
            owner_name,
            owner_email,
        } = value;
        Self {
            id: owner_id,
            name: owner_name,
            email: owner_email,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryResponse {
    pub id: LibraryId,
    pub name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub status: LibraryStatus,
    pub is_active: bool,
    pub rejection_reason: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub owner: LibraryOwnerResponse,
    pub opening_hours: Vec<OpeningHoursPayload>,
}

impl From<Library> for LibraryResponse {
    fn from(value: Library) -> Self {
        let Library {
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
            owner,
            opening_hours,
        } = value;
        Self {
            id: library_id,
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
            owner: owner.into(),
            opening_hours: opening_hours.into_iter().map(Into::into).collect(),
        }
    }
}
