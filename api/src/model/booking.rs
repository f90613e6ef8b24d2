use super::time::hhmm;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use garde::Validate;
use kernel::model::{
    booking::{
        BookingSeat, BookingStatus, BookingUser, BookingWindow, Payment, PaymentMethod,
        PaymentStatus, SeatBooking,
    },
    id::{BookingId, LibraryId, PaymentId, SeatId, UserId},
};
use serde::{Deserialize, Serialize};
use shared::error::AppResult;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[garde(skip)]
    pub seat_id: SeatId,
    #[garde(skip)]
    pub date: NaiveDate,
    #[garde(skip)]
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[garde(skip)]
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[garde(skip)]
    pub payment_method: Option<PaymentMethod>,
}

impl CreateBookingRequest {
    pub fn window(&self) -> AppResult<BookingWindow> {
        BookingWindow::new(self.date, self.start_time, self.end_time)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    pub status: Option<BookingStatus>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSeatResponse {
    pub id: SeatId,
    pub seat_number: String,
    pub seat_type_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub amount: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(value: Payment) -> Self {
        let Payment {
            payment_id,
            amount,
            method,
            status,
            paid_at,
        } = value;
        Self {
            id: payment_id,
            amount,
            method,
            status,
            paid_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: BookingId,
    pub library_id: LibraryId,
    pub library_name: String,
    pub user: BookingUserResponse,
    pub seat: BookingSeatResponse,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub status: BookingStatus,
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub payment: Option<PaymentResponse>,
}

impl From<SeatBooking> for BookingResponse {
    fn from(value: SeatBooking) -> Self {
        let SeatBooking {
            booking_id,
            library_id,
            library_name,
            user: BookingUser {
                user_id,
                name,
                email,
            },
            seat:
                BookingSeat {
                    seat_id,
                    seat_number,
                    seat_type_name,
                },
            window,
            status,
            price,
            created_at,
            cancelled_at,
            payment,
        } = value;
        Self {
            id: booking_id,
            library_id,
            library_name,
            user: BookingUserResponse {
                id: user_id,
                name,
                email,
            },
            seat: BookingSeatResponse {
                id: seat_id,
                seat_number,
                seat_type_name,
            },
            date: window.date,
            start_time: window.start_time,
            end_time: window.end_time,
            status,
            price,
            created_at,
            cancelled_at,
            payment: payment.map(Into::into),
        }
    }
}
