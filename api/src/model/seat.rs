use super::time::hhmm;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use garde::Validate;
use kernel::model::{
    id::{LibraryId, SeatId, SeatTypeId},
    seat::{
        event::{CreateSeat, CreateSeatType, UpdateSeat, UpdateSeatType},
        Seat, SeatAvailability, SeatSeatType, SeatType,
    },
};
use serde::{Deserialize, Serialize};

fn default_color() -> String {
    "#3B82F6".into()
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSeatTypeRequest {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(skip)]
    #[serde(default)]
    pub description: String,
    #[garde(range(min = 0))]
    pub price_per_hour: i64,
    #[garde(skip)]
    #[serde(default)]
    pub amenities: Vec<String>,
    #[garde(length(min = 1, max = 32))]
    #[serde(default = "default_color")]
    pub color: String,
}

impl CreateSeatTypeRequest {
    pub fn into_event(self, library_id: LibraryId) -> CreateSeatType {
        let CreateSeatTypeRequest {
            name,
            description,
            price_per_hour,
            amenities,
            color,
        } = self;
        CreateSeatType::new(library_id, name, description, price_per_hour, amenities, color)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSeatTypeRequest {
    #[garde(inner(length(min = 1, max = 255)))]
    pub name: Option<String>,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(inner(range(min = 0)))]
    pub price_per_hour: Option<i64>,
    #[garde(skip)]
    pub amenities: Option<Vec<String>>,
    #[garde(inner(length(min = 1, max = 32)))]
    pub color: Option<String>,
}

impl UpdateSeatTypeRequest {
    pub fn into_event(self, library_id: LibraryId, seat_type_id: SeatTypeId) -> UpdateSeatType {
        let UpdateSeatTypeRequest {
            name,
            description,
            price_per_hour,
            amenities,
            color,
        } = self;
        UpdateSeatType {
            library_id,
            seat_type_id,
            name,
            description,
            price_per_hour,
            amenities,
            color,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatTypeResponse {
    pub id: SeatTypeId,
    pub library_id: LibraryId,
    pub name: String,
    pub description: String,
    pub price_per_hour: i64,
    pub amenities: Vec<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl From<SeatType> for SeatTypeResponse {
    fn from(value: SeatType) -> Self {
        let SeatType {
            seat_type_id,
            library_id,
            name,
            description,
            price_per_hour,
            amenities,
            color,
            created_at,
        } = value;
        Self {
            id: seat_type_id,
            library_id,
            name,
            description,
            price_per_hour,
            amenities,
            color,
            created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSeatRequest {
    #[garde(skip)]
    pub seat_type_id: SeatTypeId,
    #[garde(length(min = 1, max = 64))]
    pub seat_number: String,
}

impl CreateSeatRequest {
    pub fn into_event(self, library_id: LibraryId) -> CreateSeat {
        CreateSeat::new(library_id, self.seat_type_id, self.seat_number)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSeatRequest {
    #[garde(skip)]
    pub seat_type_id: Option<SeatTypeId>,
    #[garde(inner(length(min = 1, max = 64)))]
    pub seat_number: Option<String>,
    #[garde(skip)]
    pub is_active: Option<bool>,
}

impl UpdateSeatRequest {
    pub fn into_event(self, library_id: LibraryId, seat_id: SeatId) -> UpdateSeat {
        let UpdateSeatRequest {
            seat_type_id,
            seat_number,
            is_active,
        } = self;
        UpdateSeat {
            library_id,
            seat_id,
            seat_type_id,
            seat_number,
            is_active,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatListQuery {
    pub seat_type_id: Option<SeatTypeId>,
    pub available: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatSeatTypeResponse {
    pub id: SeatTypeId,
    pub name: String,
    pub price_per_hour: i64,
    pub color: String,
}

impl From<SeatSeatType> for SeatSeatTypeResponse {
    fn from(value: SeatSeatType) -> Self {
        let SeatSeatType {
            seat_type_id,
            name,
            price_per_hour,
            color,
        } = value;
        Self {
            id: seat_type_id,
            name,
            price_per_hour,
            color,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatResponse {
    pub id: SeatId,
    pub library_id: LibraryId,
    pub seat_number: String,
    pub is_available: bool,
    pub is_active: bool,
    pub seat_type: SeatSeatTypeResponse,
}

impl From<Seat> for SeatResponse {
    fn from(value: Seat) -> Self {
        let Seat {
            seat_id,
            library_id,
            seat_number,
            is_available,
            is_active,
            seat_type,
        } = value;
        Self {
            id: seat_id,
            library_id,
            seat_number,
            is_available,
            is_active,
            seat_type: seat_type.into(),
        }
    }
}

// 指定時間帯での空き状況を isAvailable に入れて返す
impl From<SeatAvailability> for SeatResponse {
    fn from(value: SeatAvailability) -> Self {
        let SeatAvailability { seat, is_available } = value;
        Self {
            is_available,
            ..Self::from(seat)
        }
    }
}
