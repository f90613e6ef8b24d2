use chrono::{DateTime, Utc};
use kernel::model::{
    forum::{ForumComment, ForumPost, PostAuthor},
    id::{CommentId, LibraryId, PostId, UserId},
};

#[derive(sqlx::FromRow)]
pub struct ForumPostRow {
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_name: String,
    pub library_id: Option<LibraryId>,
    pub title: String,
    pub content: String,
    pub category: String,
    pub like_count: i32,
    pub comment_count: i32,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ForumPostRow> for ForumPost {
    fn from(value: ForumPostRow) -> Self {
        let ForumPostRow {
            post_id,
            author_id,
            author_name,
            library_id,
            title,
            content,
            category,
            like_count,
            comment_count,
            is_liked,
            created_at,
            updated_at,
        } = value;
        ForumPost {
            post_id,
            author: PostAuthor {
                user_id: author_id,
                name: author_name,
            },
            library_id,
            title,
            content,
            category,
            like_count,
            comment_count,
            is_liked,
            created_at,
            updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct ForumCommentRow {
    pub comment_id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_name: String,
    pub content: String,
    pub like_count: i32,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ForumCommentRow> for ForumComment {
    fn from(value: ForumCommentRow) -> Self {
        let ForumCommentRow {
            comment_id,
            post_id,
            author_id,
            author_name,
            content,
            like_count,
            is_liked,
            created_at,
        } = value;
        ForumComment {
            comment_id,
            post_id,
            author: PostAuthor {
                user_id: author_id,
                name: author_name,
            },
            content,
            like_count,
            is_liked,
            created_at,
        }
    }
}
