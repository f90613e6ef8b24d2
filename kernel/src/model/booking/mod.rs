use crate::model::{
    id::{BookingId, LibraryId, PaymentId, SeatId, UserId},
    list::ListOptions,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use strum::{AsRefStr, Display, EnumString};

pub mod event;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Online,
}

/// A seat booking window on a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl BookingWindow {
    pub fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> AppResult<Self> {
        if start_time >= end_time {
            return Err(AppError::BadRequest(
                "startTime must be before endTime".into(),
            ));
        }
        Ok(Self {
            date,
            start_time,
            end_time,
        })
    }

    pub fn minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    // 同じ日付で existing.start < new.end AND new.start < existing.end のとき重複
    pub fn overlaps(&self, other: &BookingWindow) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }

    pub fn ensure_not_past(&self, today: NaiveDate) -> AppResult<()> {
        if self.date < today {
            return Err(AppError::BadRequest(format!(
                "cannot book a seat for a past date ({})",
                self.date
            )));
        }
        Ok(())
    }

    /// Price for this window in minor currency units, rounded half up.
    pub fn price(&self, price_per_hour: i64) -> i64 {
        (price_per_hour * self.minutes() + 30) / 60
    }
}

#[derive(Debug, Clone)]
pub struct SeatBooking {
    pub booking_id: BookingId,
    pub library_id: LibraryId,
    pub library_name: String,
    pub user: BookingUser,
    pub seat: BookingSeat,
    pub window: BookingWindow,
    pub status: BookingStatus,
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub payment: Option<Payment>,
}

impl SeatBooking {
    pub fn ensure_confirmed(&self) -> AppResult<()> {
        if self.status != BookingStatus::Confirmed {
            return Err(AppError::BadRequest(format!(
                "booking ({}) is already {}",
                self.booking_id, self.status
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BookingUser {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct BookingSeat {
    pub seat_id: SeatId,
    pub seat_number: String,
    pub seat_type_name: String,
}

#[derive(Debug, Clone)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub amount: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct BookingListOptions {
    pub user_id: Option<UserId>,
    pub library_id: Option<LibraryId>,
    pub status: Option<BookingStatus>,
    pub date: Option<NaiveDate>,
    pub list: ListOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 5, d).unwrap()
    }

    fn window(d: u32, start: NaiveTime, end: NaiveTime) -> BookingWindow {
        BookingWindow::new(day(d), start, end).unwrap()
    }

    #[test]
    fn empty_or_inverted_window_is_rejected() {
        assert!(BookingWindow::new(day(1), t(10, 0), t(10, 0)).is_err());
        assert!(BookingWindow::new(day(1), t(11, 0), t(10, 0)).is_err());
    }

    #[rstest]
    #[case(window(1, t(9, 0), t(11, 0)), window(1, t(10, 0), t(12, 0)), true)]
    #[case(window(1, t(9, 0), t(11, 0)), window(1, t(11, 0), t(12, 0)), false)]
    #[case(window(1, t(9, 0), t(12, 0)), window(1, t(10, 0), t(11, 0)), true)]
    #[case(window(1, t(9, 0), t(11, 0)), window(2, t(9, 0), t(11, 0)), false)]
    fn overlap_detection(
        #[case] a: BookingWindow,
        #[case] b: BookingWindow,
        #[case] expected: bool,
    ) {
        assert_eq!(a.overlaps(&b), expected);
        assert_eq!(b.overlaps(&a), expected);
    }

    #[rstest]
    #[case(t(9, 0), t(11, 0), 5000, 10000)]
    #[case(t(9, 0), t(9, 30), 5000, 2500)]
    #[case(t(9, 0), t(9, 20), 100, 33)]
    #[case(t(9, 0), t(9, 45), 2, 2)]
    fn price_is_prorated(
        #[case] start: NaiveTime,
        #[case] end: NaiveTime,
        #[case] per_hour: i64,
        #[case] expected: i64,
    ) {
        assert_eq!(window(1, start, end).price(per_hour), expected);
    }

    #[test]
    fn past_date_is_rejected() {
        let w = window(1, t(9, 0), t(10, 0));
        assert!(w.ensure_not_past(day(2)).is_err());
        assert!(w.ensure_not_past(day(1)).is_ok());
    }
}
