use crate::model::{
    booking::{BookingWindow, PaymentMethod},
    id::{BookingId, LibraryId, SeatId, UserId},
};
use chrono::{DateTime, Utc};
use derive_new::new;

#[derive(Debug, new)]
pub struct CreateBooking {
    pub library_id: LibraryId,
    pub seat_id: SeatId,
    pub booked_by: UserId,
    pub window: BookingWindow,
    pub payment_method: Option<PaymentMethod>,
    pub booked_at: DateTime<Utc>,
}

#[derive(Debug, new)]
pub struct CancelBooking {
    pub booking_id: BookingId,
    pub cancelled_at: DateTime<Utc>,
}

#[derive(Debug, new)]
pub struct CompleteBooking {
    pub booking_id: BookingId,
}
