use super::parse_enum;
use chrono::{DateTime, Utc};
use kernel::model::{
    id::{LibraryId, MembershipId, MembershipPlanId, UserId},
    membership::{Membership, MembershipPlan, MembershipPlanSummary, MembershipUser},
};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct MembershipPlanRow {
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

impl From<MembershipPlanRow> for MembershipPlan {
    fn from(value: MembershipPlanRow) -> Self {
        let MembershipPlanRow {
            plan_id,
            library_id,
            name,
            description,
            price,
            duration_days,
            features,
            is_active,
            created_at,
        } = value;
        MembershipPlan {
            plan_id,
            library_id,
            name,
            description,
            price,
            duration_days,
            features,
            is_active,
            created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct MembershipRow {
    pub membership_id: MembershipId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub plan_id: MembershipPlanId,
    pub plan_name: String,
    pub library_id: LibraryId,
    pub library_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = AppError;

    fn try_from(value: MembershipRow) -> Result<Self, Self::Error> {
        let MembershipRow {
            membership_id,
            user_id,
            user_name,
            user_email,
            plan_id,
            plan_name,
            library_id,
            library_name,
            start_date,
            end_date,
            status,
            created_at,
        } = value;
        Ok(Membership {
            membership_id,
            user: MembershipUser {
                user_id,
                name: user_name,
                email: user_email,
            },
            plan: MembershipPlanSummary {
                plan_id,
                name: plan_name,
                library_id,
                library_name,
            },
            start_date,
            end_date,
            status: parse_enum("membership status", &status)?,
            created_at,
        })
    }
}
