use crate::model::{
    id::{LibraryId, UserId},
    library::{
        event::{RegisterLibrary, RejectLibrary, ReplaceOpeningHours, UpdateLibrary},
        Library, LibraryListOptions,
    },
    list::PaginatedList,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "test-util", mockall::automock)]
#[async_trait]
pub trait LibraryRepository: Send + Sync {
    // ユーザー作成・図書館作成・開館時間作成を 1 トランザクションで行う
    async fn register(&self, event: RegisterLibrary) -> AppResult<Library>;
    async fn find_all(&self, options: LibraryListOptions) -> AppResult<PaginatedList<Library>>;
    async fn find_by_id(&self, library_id: LibraryId) -> AppResult<Option<Library>>;
    async fn find_by_owner(&self, owner_id: UserId) -> AppResult<Option<Library>>;
    async fn update(&self, event: UpdateLibrary) -> AppResult<()>;
    async fn replace_opening_hours(&self, event: ReplaceOpeningHours) -> AppResult<()>;
    // PENDING の図書館を承認し、所有者を ADMIN に昇格する
    async fn approve(&self, library_id: LibraryId) -> AppResult<Library>;
    async fn reject(&self, event: RejectLibrary) -> AppResult<Library>;
}
