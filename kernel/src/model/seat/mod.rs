use crate::model::id::{LibraryId, SeatId, SeatTypeId};
use chrono::{DateTime, Utc};

pub mod event;

#[derive(Debug, Clone)]
pub struct SeatType {
    pub seat_type_id: SeatTypeId,
    pub library_id: LibraryId,
    pub name: String,
    pub description: String,
    // 最小通貨単位での 1 時間あたりの料金
    pub price_per_hour: i64,
    pub amenities: Vec<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Seat {
    pub seat_id: SeatId,
    pub library_id: LibraryId,
    pub seat_number: String,
    pub is_available: bool,
    pub is_active: bool,
    pub seat_type: SeatSeatType,
}

// Seat に埋め込む座席種別の要約
#[derive(Debug, Clone)]
pub struct SeatSeatType {
    pub seat_type_id: SeatTypeId,
    pub name: String,
    pub price_per_hour: i64,
    pub color: String,
}

/// A seat together with whether it is free for a requested window.
#[derive(Debug, Clone)]
pub struct SeatAvailability {
    pub seat: Seat,
    pub is_available: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeatCount {
    pub total: i64,
    pub available: i64,
}

#[derive(Debug)]
pub struct SeatListOptions {
    pub library_id: LibraryId,
    pub seat_type_id: Option<SeatTypeId>,
    pub available: Option<bool>,
}
