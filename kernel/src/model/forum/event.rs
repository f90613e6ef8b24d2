use crate::model::id::{CommentId, LibraryId, PostId, UserId};
use derive_new::new;

#[derive(Debug, new)]
pub struct CreatePost {
    pub author_id: UserId,
    pub library_id: Option<LibraryId>,
    pub title: String,
    pub content: String,
    pub category: String,
}

#[derive(Debug)]
pub struct UpdatePost {
    pub post_id: PostId,
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, new)]
pub struct CreateComment {
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: String,
}

#[derive(Debug, new)]
pub struct TogglePostLike {
    pub post_id: PostId,
    pub user_id: UserId,
}

#[derive(Debug, new)]
pub struct ToggleCommentLike {
    pub comment_id: CommentId,
    pub user_id: UserId,
}
