use chrono::{DateTime, Utc};
use kernel::model::{
    id::{LibraryId, SeatId, SeatTypeId},
    seat::{Seat, SeatAvailability, SeatSeatType, SeatType},
};

#[derive(sqlx::FromRow)]
pub struct SeatTypeRow {
    pub seat_type_id: SeatTypeId,
    pub library_id: LibraryId,
    pub name: String,
    pub description: String,
    pub price_per_hour: i64,
    pub amenities: Vec<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl From<SeatTypeRow> for SeatType {
    fn from(value: SeatTypeRow) -> Self {
        let SeatTypeRow {
            seat_type_id,
            library_id,
            name,
            description,
            price_per_hour,
            amenities,
            color,
            created_at,
        } = value;
        SeatType {
            seat_type_id,
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

// seats と seat_types を結合して取得する行
#[derive(sqlx::FromRow)]
pub struct SeatRow {
    pub seat_id: SeatId,
    pub library_id: LibraryId,
    pub seat_number: String,
    pub is_available: bool,
    pub is_active: bool,
    pub seat_type_id: SeatTypeId,
    pub seat_type_name: String,
    pub price_per_hour: i64,
    pub color: String,
}

impl From<SeatRow> for Seat {
    fn from(value: SeatRow) -> Self {
        let SeatRow {
            seat_id,
            library_id,
            seat_number,
            is_available,
            is_active,
            seat_type_id,
            seat_type_name,
            price_per_hour,
            color,
        } = value;
        Seat {
            seat_id,
            library_id,
            seat_number,
            is_available,
            is_active,
            seat_type: SeatSeatType {
                seat_type_id,
                name: seat_type_name,
                price_per_hour,
                color,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct SeatAvailabilityRow {
    #[sqlx(flatten)]
    pub seat: SeatRow,
    pub is_free: bool,
}

impl From<SeatAvailabilityRow> for SeatAvailability {
    fn from(value: SeatAvailabilityRow) -> Self {
        let SeatAvailabilityRow { seat, is_free } = value;
        SeatAvailability {
            seat: seat.into(),
            is_available: is_free,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct SeatCountRow {
    pub total: i64,
    pub available: i64,
}
