use kernel::model::{
    analytics::{LibraryBookingCount, StatusCount},
    id::LibraryId,
};

#[derive(sqlx::FromRow)]
pub struct StatusCountRow {
    pub status: String,
    pub count: i64,
}

impl From<StatusCountRow> for StatusCount {
    fn from(value: StatusCountRow) -> Self {
        let StatusCountRow { status, count } = value;
        StatusCount { status, count }
    }
}

#[derive(sqlx::FromRow)]
pub struct LibraryBookingCountRow {
    pub library_id: LibraryId,
    pub library_name: String,
    pub booking_count: i64,
}

impl From<LibraryBookingCountRow> for LibraryBookingCount {
    fn from(value: LibraryBookingCountRow) -> Self {
        let LibraryBookingCountRow {
            library_id,
            library_name,
            booking_count,
        } = value;
        LibraryBookingCount {
            library_id,
            library_name,
            booking_count,
        }
    }
}
