use crate::model::id::{LibraryId, SeatId, SeatTypeId};
use derive_new::new;

#[derive(Debug, new)]
pub struct CreateSeatType {
    pub library_id: LibraryId,
    pub name: String,
    pub description: String,
    pub price_per_hour: i64,
    pub amenities: Vec<String>,
    pub color: String,
}

#[derive(Debug)]
pub struct UpdateSeatType {
    pub library_id: LibraryId,
    pub seat_type_id: SeatTypeId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_per_hour: Option<i64>,
    pub amenities: Option<Vec<String>>,
    pub color: Option<String>,
}

#[derive(Debug, new)]
pub struct DeleteSeatType {
    pub library_id: LibraryId,
    pub seat_type_id: SeatTypeId,
}

#[derive(Debug, new)]
pub struct CreateSeat {
    pub library_id: LibraryId,
    pub seat_type_id: SeatTypeId,
    pub seat_number: String,
}

#[derive(Debug)]
pub struct UpdateSeat {
    pub library_id: LibraryId,
    pub seat_id: SeatId,
    pub seat_type_id: Option<SeatTypeId>,
    pub seat_number: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, new)]
pub struct DeleteSeat {
    pub library_id: LibraryId,
    pub seat_id: SeatId,
}
