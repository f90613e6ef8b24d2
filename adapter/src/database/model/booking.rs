use super::parse_enum;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use kernel::model::{
    booking::{BookingSeat, BookingUser, BookingWindow, Payment, SeatBooking},
    id::{BookingId, LibraryId, PaymentId, SeatId, UserId},
};
use shared::error::AppError;

// 予約一覧を取得する際に使う型
// 支払いが無い予約では payment_* 列がすべて NULL になる
#[derive(sqlx::FromRow)]
pub struct BookingRow {
    pub booking_id: BookingId,
    pub library_id: LibraryId,
    pub library_name: String,
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub seat_id: SeatId,
    pub seat_number: String,
    pub seat_type_name: String,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub payment_id: Option<PaymentId>,
    pub payment_amount: Option<i64>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl TryFrom<BookingRow> for SeatBooking {
    type Error = AppError;

    fn try_from(value: BookingRow) -> Result<Self, Self::Error> {
        let BookingRow {
            booking_id,
            library_id,
            library_name,
            user_id,
            user_name,
            user_email,
            seat_id,
            seat_number,
            seat_type_name,
            booking_date,
            start_time,
            end_time,
            status,
            price,
            created_at,
            cancelled_at,
            payment_id,
            payment_amount,
            payment_method,
            payment_status,
            paid_at,
        } = value;

        let payment = match (payment_id, payment_amount, payment_method, payment_status, paid_at) {
            (Some(payment_id), Some(amount), Some(method), Some(status), Some(paid_at)) => {
                Some(Payment {
                    payment_id,
                    amount,
                    method: parse_enum("payment method", &method)?,
                    status: parse_enum("payment status", &status)?,
                    paid_at,
                })
            }
            _ => None,
        };

        Ok(SeatBooking {
            booking_id,
            library_id,
            library_name,
            user: BookingUser {
                user_id,
                name: user_name,
                email: user_email,
            },
            seat: BookingSeat {
                seat_id,
                seat_number,
                seat_type_name,
            },
            // DB の CHECK 制約で start_time < end_time は保証されている
            window: BookingWindow {
                date: booking_date,
                start_time,
                end_time,
            },
            status: parse_enum("booking status", &status)?,
            price,
            created_at,
            cancelled_at,
            payment,
        })
    }
}

// 予約作成時に座席の状態を確認するための型
#[derive(sqlx::FromRow)]
pub struct BookableSeatRow {
    pub seat_id: SeatId,
    pub is_active: bool,
    pub price_per_hour: i64,
}
