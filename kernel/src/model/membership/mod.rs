use crate::model::id::{LibraryId, MembershipId, MembershipPlanId, UserId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use strum::{AsRefStr, Display, EnumString};

pub mod event;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    #[default]
    Active,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct MembershipPlan {
    pub plan_id: MembershipPlanId,
    pub library_id: LibraryId,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub duration_days: i32,
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl MembershipPlan {
    /// Start and end of a membership bought from this plan at `start`.
    pub fn period_from(&self, start: DateTime<Utc>) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
        if self.duration_days <= 0 {
            return Err(AppError::UnprocessableEntity(format!(
                "plan ({}) has a non-positive duration",
                self.plan_id
            )));
        }
        Ok((start, start + Duration::days(self.duration_days as i64)))
    }
}

#[derive(Debug, Clone)]
pub struct Membership {
    pub membership_id: MembershipId,
    pub user: MembershipUser,
    pub plan: MembershipPlanSummary,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    // 有効期限を過ぎた ACTIVE な会員は EXPIRED として扱う
    pub fn effective_status(&self, now: DateTime<Utc>) -> MembershipStatus {
        match self.status {
            MembershipStatus::Active if self.end_date <= now => MembershipStatus::Expired,
            s => s,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MembershipUser {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct MembershipPlanSummary {
    pub plan_id: MembershipPlanId,
    pub name: String,
    pub library_id: LibraryId,
    pub library_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(duration_days: i32) -> MembershipPlan {
        MembershipPlan {
            plan_id: MembershipPlanId::new(),
            library_id: LibraryId::new(),
            name: "Monthly".into(),
            description: String::new(),
            price: 150000,
            duration_days,
            features: vec![],
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn period_adds_duration_days() {
        let start = Utc::now();
        let (s, e) = plan(30).period_from(start).unwrap();
        assert_eq!(s, start);
        assert_eq!(e - s, Duration::days(30));
    }

    #[test]
    fn zero_duration_plan_is_rejected() {
        assert!(plan(0).period_from(Utc::now()).is_err());
    }

    #[test]
    fn lapsed_active_membership_reads_as_expired() {
        let now = Utc::now();
        let m = Membership {
            membership_id: MembershipId::new(),
            user: MembershipUser {
                user_id: UserId::new(),
                name: "u".into(),
                email: "u@example.com".into(),
            },
            plan: MembershipPlanSummary {
                plan_id: MembershipPlanId::new(),
                name: "Monthly".into(),
                library_id: LibraryId::new(),
                library_name: "Central".into(),
            },
            start_date: now - Duration::days(31),
            end_date: now - Duration::days(1),
            status: MembershipStatus::Active,
            created_at: now,
        };
        assert_eq!(m.effective_status(now), MembershipStatus::Expired);

        let cancelled = Membership {
            status: MembershipStatus::Cancelled,
            ..m
        };
        assert_eq!(cancelled.effective_status(now), MembershipStatus::Cancelled);
    }
}
