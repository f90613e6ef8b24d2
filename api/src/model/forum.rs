use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    forum::{
        event::{CreateComment, CreatePost, UpdatePost},
        ForumComment, ForumPost, LikeState, PostAuthor,
    },
    id::{CommentId, LibraryId, PostId, UserId},
};
use serde::{Deserialize, Serialize};

fn default_category() -> String {
    "general".into()
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[garde(length(min = 1, max = 255))]
    pub title: String,
    #[garde(length(min = 1, max = 10000))]
    pub content: String,
    #[garde(length(min = 1, max = 64))]
    #[serde(default = "default_category")]
    pub category: String,
    #[garde(skip)]
    pub library_id: Option<LibraryId>,
}

impl CreatePostRequest {
    pub fn into_event(self, author_id: UserId) -> CreatePost {
        let CreatePostRequest {
            title,
            content,
            category,
            library_id,
        } = self;
        CreatePost::new(author_id, library_id, title, content, category)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[garde(inner(length(min = 1, max = 255)))]
    pub title: Option<String>,
    #[garde(inner(length(min = 1, max = 10000)))]
    pub content: Option<String>,
    #[garde(inner(length(min = 1, max = 64)))]
    pub category: Option<String>,
}

impl UpdatePostRequest {
    pub fn into_event(self, post_id: PostId) -> UpdatePost {
        let UpdatePostRequest {
            title,
            content,
            category,
        } = self;
        UpdatePost {
            post_id,
            title,
            content,
            category,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[garde(length(min = 1, max = 5000))]
    pub content: String,
}

impl CreateCommentRequest {
    pub fn into_event(self, post_id: PostId, author_id: UserId) -> CreateComment {
        CreateComment::new(post_id, author_id, self.content)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListQuery {
    pub library_id: Option<LibraryId>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: UserId,
    pub name: String,
}

impl From<PostAuthor> for AuthorResponse {
    fn from(value: PostAuthor) -> Self {
        Self {
            id: value.user_id,
            name: value.name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: PostId,
    pub author: AuthorResponse,
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

impl From<ForumPost> for PostResponse {
    fn from(value: ForumPost) -> Self {
        let ForumPost {
            post_id,
            author,
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
        Self {
            id: post_id,
            author: author.into(),
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: CommentId,
    pub post_id: PostId,
    pub author: AuthorResponse,
    pub content: String,
    pub like_count: i32,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ForumComment> for CommentResponse {
    fn from(value: ForumComment) -> Self {
        let ForumComment {
            comment_id,
            post_id,
            author,
            content,
            like_count,
            is_liked,
            created_at,
        } = value;
        Self {
            id: comment_id,
            post_id,
            author: author.into(),
            content,
            like_count,
            is_liked,
            created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub is_liked: bool,
    pub like_count: i32,
}

impl From<LikeState> for LikeResponse {
    fn from(value: LikeState) -> Self {
        let LikeState {
            is_liked,
            like_count,
        } = value;
        Self {
            is_liked,
            like_count,
        }
    }
}
