use crate::model::{
    id::{LibraryId, MembershipId, MembershipPlanId, UserId},
    list::{ListOptions, PaginatedList},
    membership::{
        event::{
            CancelMembership, CreateMembershipPlan, DeactivateMembershipPlan, PurchaseMembership,
            UpdateMembershipPlan,
        },
        Membership, MembershipPlan,
    },
};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "test-util", mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn create_plan(&self, event: CreateMembershipPlan) -> AppResult<MembershipPlanId>;
    async fn find_plans(
        &self,
        library_id: LibraryId,
        include_inactive: bool,
    ) -> AppResult<Vec<MembershipPlan>>;
    async fn find_plan_by_id(&self, plan_id: MembershipPlanId)
        -> AppResult<Option<MembershipPlan>>;
    async fn update_plan(&self, event: UpdateMembershipPlan) -> AppResult<()>;
    async fn deactivate_plan(&self, event: DeactivateMembershipPlan) -> AppResult<()>;

    async fn purchase(&self, event: PurchaseMembership) -> AppResult<MembershipId>;
    async fn find_by_id(&self, membership_id: MembershipId) -> AppResult<Option<Membership>>;
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Membership>>;
    async fn find_by_library(
        &self,
        library_id: LibraryId,
        options: ListOptions,
    ) -> AppResult<PaginatedList<Membership>>;
    async fn cancel(&self, event: CancelMembership) -> AppResult<()>;
}
