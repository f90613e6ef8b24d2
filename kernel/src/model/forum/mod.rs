use crate::model::{
    id::{CommentId, LibraryId, PostId, UserId},
    list::ListOptions,
};
use chrono::{DateTime, Utc};

pub mod event;

#[derive(Debug, Clone)]
pub struct ForumPost {
    pub post_id: PostId,
    pub author: PostAuthor,
    pub library_id: Option<LibraryId>,
    pub title: String,
    pub content: String,
    pub category: String,
    pub like_count: i32,
    pub comment_count: i32,
    // 閲覧者がいいね済みかどうか（未ログインなら false）
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ForumComment {
    pub comment_id: CommentId,
    pub post_id: PostId,
    pub author: PostAuthor,
    pub content: String,
    pub like_count: i32,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PostAuthor {
    pub user_id: UserId,
    pub name: String,
}

/// Like state of a post or comment as seen by one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub is_liked: bool,
    pub like_count: i32,
}

impl LikeState {
    /// State after the user toggles their like.
    pub fn toggled(self) -> Self {
        if self.is_liked {
            Self {
                is_liked: false,
                like_count: (self.like_count - 1).max(0),
            }
        } else {
            Self {
                is_liked: true,
                like_count: self.like_count + 1,
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct PostListOptions {
    pub library_id: Option<LibraryId>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub viewer: Option<UserId>,
    pub list: ListOptions,
}

#[cfg(test)]
mod tests {
    use super::LikeState;

    #[test]
    fn toggling_twice_restores_original_state() {
        let original = LikeState {
            is_liked: false,
            like_count: 4,
        };
        let once = original.toggled();
        assert_eq!(
            once,
            LikeState {
                is_liked: true,
                like_count: 5
            }
        );
        assert_eq!(once.toggled(), original);
    }

    #[test]
    fn unlike_never_goes_negative() {
        let s = LikeState {
            is_liked: true,
            like_count: 0,
        };
        assert_eq!(s.toggled().like_count, 0);
    }
}
