use crate::model::{
    booking::BookingWindow,
    id::{LibraryId, UserId},
    list::ListOptions,
};
use chrono::{DateTime, Datelike, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use strum::{AsRefStr, Display, EnumString};

pub mod event;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LibraryStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone)]
pub struct Library {
    pub library_id: LibraryId,
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
    pub owner: LibraryOwner,
    pub opening_hours: Vec<OpeningHours>,
}

#[derive(Debug, Clone)]
pub struct LibraryOwner {
    pub owner_id: UserId,
    pub owner_name: String,
    pub owner_email: String,
}

// day_of_week は 0 = 日曜日 ... 6 = 土曜日
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningHours {
    pub day_of_week: i16,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub is_closed: bool,
}

impl OpeningHours {
    pub fn validate(&self) -> AppResult<()> {
        if !(0..=6).contains(&self.day_of_week) {
            return Err(AppError::BadRequest(format!(
                "dayOfWeek must be between 0 and 6 (got {})",
                self.day_of_week
            )));
        }
        if !self.is_closed && self.open_time >= self.close_time {
            return Err(AppError::BadRequest(format!(
                "openTime must be before closeTime on day {}",
                self.day_of_week
            )));
        }
        Ok(())
    }
}

/// Rejects an opening-hours list that is malformed or names a weekday twice.
pub fn validate_opening_hours(hours: &[OpeningHours]) -> AppResult<()> {
    let mut seen = [false; 7];
    for h in hours {
        h.validate()?;
        let day = h.day_of_week as usize;
        if seen[day] {
            return Err(AppError::BadRequest(format!(
                "dayOfWeek {} is listed more than once",
                h.day_of_week
            )));
        }
        seen[day] = true;
    }
    Ok(())
}

impl Library {
    pub fn is_open_for_business(&self) -> bool {
        self.status == LibraryStatus::Approved && self.is_active
    }

    /// Checks a booking window against the opening hours of its weekday.
    /// Libraries without any configured hours accept every window.
    pub fn accepts(&self, window: &BookingWindow) -> AppResult<()> {
        if self.opening_hours.is_empty() {
            return Ok(());
        }
        let weekday = window.date.weekday().num_days_from_sunday() as i16;
        let Some(hours) = self
            .opening_hours
            .iter()
            .find(|h| h.day_of_week == weekday)
        else {
            return Err(AppError::BadRequest(format!(
                "library has no opening hours on {}",
                window.date
            )));
        };
        if hours.is_closed {
            return Err(AppError::BadRequest(format!(
                "library is closed on {}",
                window.date
            )));
        }
        if window.start_time < hours.open_time || window.end_time > hours.close_time {
            return Err(AppError::BadRequest(format!(
                "booking must be within opening hours ({} - {})",
                hours.open_time.format("%H:%M"),
                hours.close_time.format("%H:%M")
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LibraryListOptions {
    pub status: Option<LibraryStatus>,
    // true の場合は承認済みかつ有効な図書館のみに絞る
    pub public_only: bool,
    pub city: Option<String>,
    pub search: Option<String>,
    pub list: ListOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn library(hours: Vec<OpeningHours>) -> Library {
        Library {
            library_id: LibraryId::new(),
            name: "Central".into(),
            description: String::new(),
            address: "1 Main St".into(),
            city: "Springfield".into(),
            phone: "000".into(),
            email: "central@example.com".into(),
            status: LibraryStatus::Approved,
            is_active: true,
            rejection_reason: None,
            approved_at: None,
            created_at: Utc::now(),
            owner: LibraryOwner {
                owner_id: UserId::new(),
                owner_name: "Owner".into(),
                owner_email: "owner@example.com".into(),
            },
            opening_hours: hours,
        }
    }

    // 2030-01-07 は月曜日 (day_of_week = 1)
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
    }

    #[rstest]
    #[case(t(9, 0), t(11, 0), true)]
    #[case(t(8, 0), t(10, 0), false)]
    #[case(t(20, 0), t(22, 30), false)]
    fn accepts_only_within_hours(
        #[case] start: NaiveTime,
        #[case] end: NaiveTime,
        #[case] ok: bool,
    ) {
        let lib = library(vec![OpeningHours {
            day_of_week: 1,
            open_time: t(9, 0),
            close_time: t(22, 0),
            is_closed: false,
        }]);
        let window = BookingWindow::new(monday(), start, end).unwrap();
        assert_eq!(lib.accepts(&window).is_ok(), ok);
    }

    #[test]
    fn closed_day_rejects_booking() {
        let lib = library(vec![OpeningHours {
            day_of_week: 1,
            open_time: t(9, 0),
            close_time: t(22, 0),
            is_closed: true,
        }]);
        let window = BookingWindow::new(monday(), t(10, 0), t(11, 0)).unwrap();
        assert!(lib.accepts(&window).is_err());
    }

    #[test]
    fn no_hours_accepts_everything() {
        let lib = library(vec![]);
        let window = BookingWindow::new(monday(), t(1, 0), t(2, 0)).unwrap();
        assert!(lib.accepts(&window).is_ok());
    }

    #[test]
    fn duplicate_weekday_is_rejected() {
        let h = OpeningHours {
            day_of_week: 3,
            open_time: t(9, 0),
            close_time: t(17, 0),
            is_closed: false,
        };
        assert!(validate_opening_hours(&[h.clone(), h]).is_err());
    }

    #[test]
    fn out_of_range_weekday_is_rejected() {
        let h = OpeningHours {
            day_of_week: 7,
            open_time: t(9, 0),
            close_time: t(17, 0),
            is_closed: false,
        };
        assert!(h.validate().is_err());
    }
}
