use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    booking::PaymentMethod,
    id::{LibraryId, MembershipId, MembershipPlanId, UserId},
    membership::{
        event::{CreateMembershipPlan, UpdateMembershipPlan},
        Membership, MembershipPlan, MembershipStatus,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMembershipPlanRequest {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(skip)]
    #[serde(default)]
    pub description: String,
    #[garde(range(min = 0))]
    pub price: i64,
    #[garde(range(min = 1))]
    pub duration_days: i32,
    #[garde(skip)]
    #[serde(default)]
    pub features: Vec<String>,
}

impl CreateMembershipPlanRequest {
    pub fn into_event(self, library_id: LibraryId) -> CreateMembershipPlan {
        let CreateMembershipPlanRequest {
            name,
            description,
            price,
            duration_days,
            features,
        } = self;
        CreateMembershipPlan::new(library_id, name, description, price, duration_days, features)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMembershipPlanRequest {
    #[garde(inner(length(min = 1, max = 255)))]
    pub name: Option<String>,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(inner(range(min = 0)))]
    pub price: Option<i64>,
    #[garde(inner(range(min = 1)))]
    pub duration_days: Option<i32>,
    #[garde(skip)]
    pub features: Option<Vec<String>>,
}

impl UpdateMembershipPlanRequest {
    pub fn into_event(
        self,
        library_id: LibraryId,
        plan_id: MembershipPlanId,
    ) -> UpdateMembershipPlan {
        let UpdateMembershipPlanRequest {
            name,
            description,
            price,
            duration_days,
            features,
        } = self;
        UpdateMembershipPlan {
            library_id,
            plan_id,
            name,
            description,
            price,
            duration_days,
            features,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseMembershipRequest {
    #[garde(skip)]
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlanResponse {
    pub id: MembershipPlanId,
    pub library_id: LibraryId,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub duration_days: i32,
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MembershipPlan> for MembershipPlanResponse {
    fn from(value: MembershipPlan) -> Self {
        let MembershipPlan {
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
        Self {
            id: plan_id,
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipUserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlanSummaryResponse {
    pub id: MembershipPlanId,
    pub name: String,
    pub library_id: LibraryId,
    pub library_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub id: MembershipId,
    pub user: MembershipUserResponse,
    pub plan: MembershipPlanSummaryResponse,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Membership> for MembershipResponse {
    fn from(value: Membership) -> Self {
        let status = value.effective_status(Utc::now());
        let Membership {
            membership_id,
            user,
            plan,
            start_date,
            end_date,
            status: _,
            created_at,
        } = value;
        Self {
            id: membership_id,
            user: MembershipUserResponse {
                id: user.user_id,
                name: user.name,
                email: user.email,
            },
            plan: MembershipPlanSummaryResponse {
                id: plan.plan_id,
                name: plan.name,
                library_id: plan.library_id,
                library_name: plan.library_name,
            },
            start_date,
            end_date,
            status,
            created_at,
        }
    }
}
