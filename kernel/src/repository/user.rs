use crate::model::{
    id::UserId,
    list::PaginatedList,
    user::{
        event::{CreateUser, UpdateProfile, UpdateUserRole},
        User, UserListOptions,
    },
};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "test-util", mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<User>>;
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;
    // 外部 ID に紐づくユーザーがいなければ MEMBER として作成する
    async fn create_if_missing(&self, event: CreateUser) -> AppResult<User>;
    async fn update_profile(&self, event: UpdateProfile) -> AppResult<User>;
    async fn update_role(&self, event: UpdateUserRole) -> AppResult<()>;
    async fn find_all(&self, options: UserListOptions) -> AppResult<PaginatedList<User>>;
}
