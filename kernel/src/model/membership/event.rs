use crate::model::{
    booking::PaymentMethod,
    id::{LibraryId, MembershipId, MembershipPlanId, UserId},
};
use chrono::{DateTime, Utc};
use derive_new::new;

#[derive(Debug, new)]
pub struct CreateMembershipPlan {
    pub library_id: LibraryId,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub duration_days: i32,
    pub features: Vec<String>,
}

#[derive(Debug)]
pub struct UpdateMembershipPlan {
    pub library_id: LibraryId,
    pub plan_id: MembershipPlanId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub duration_days: Option<i32>,
    pub features: Option<Vec<String>>,
}

#[derive(Debug, new)]
pub struct DeactivateMembershipPlan {
    pub library_id: LibraryId,
    pub plan_id: MembershipPlanId,
}

#[derive(Debug, new)]
pub struct PurchaseMembership {
    pub plan_id: MembershipPlanId,
    pub user_id: UserId,
    pub payment_method: PaymentMethod,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, new)]
pub struct CancelMembership {
    pub membership_id: MembershipId,
}
