use crate::model::{
    forum::{
        event::{CreateComment, CreatePost, ToggleCommentLike, TogglePostLike, UpdatePost},
        ForumComment, ForumPost, LikeState, PostListOptions,
    },
    id::{CommentId, PostId, UserId},
    list::PaginatedList,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "test-util", mockall::automock)]
#[async_trait]
pub trait ForumRepository: Send + Sync {
    async fn create_post(&self, event: CreatePost) -> AppResult<PostId>;
    async fn find_posts(&self, options: PostListOptions) -> AppResult<PaginatedList<ForumPost>>;
    async fn find_post_by_id(
        &self,
        post_id: PostId,
        viewer: Option<UserId>,
    ) -> AppResult<Option<ForumPost>>;
    async fn update_post(&self, event: UpdatePost) -> AppResult<()>;
    async fn delete_post(&self, post_id: PostId) -> AppResult<()>;

    async fn create_comment(&self, event: CreateComment) -> AppResult<CommentId>;
    async fn find_comments(
        &self,
        post_id: PostId,
        viewer: Option<UserId>,
    ) -> AppResult<Vec<ForumComment>>;
    async fn find_comment_by_id(&self, comment_id: CommentId) -> AppResult<Option<ForumComment>>;
    async fn delete_comment(&self, comment_id: CommentId) -> AppResult<()>;

    // いいねの行の追加/削除と like_count の増減を 1 トランザクションで行う
    async fn toggle_post_like(&self, event: TogglePostLike) -> AppResult<LikeState>;
    async fn toggle_comment_like(&self, event: ToggleCommentLike) -> AppResult<LikeState>;
}
