use crate::database::{
    like_pattern,
    model::forum::{ForumCommentRow, ForumPostRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        forum::{
            event::{CreateComment, CreatePost, ToggleCommentLike, TogglePostLike, UpdatePost},
            ForumComment, ForumPost, LikeState, PostListOptions,
        },
        id::{CommentId, PostId, UserId},
        list::PaginatedList,
    },
    repository::forum::ForumRepository,
};
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct ForumRepositoryImpl {
    db: ConnectionPool,
}

// viewer にはいいね判定に使う閲覧者 ID のバインド位置を指定する
fn post_select(viewer: &str) -> String {
    format!(
        r#"
            SELECT
                p.post_id,
                u.user_id AS author_id,
                u.name AS author_name,
                p.library_id,
                p.title,
                p.content,
                p.category,
                p.like_count,
                p.comment_count,
                EXISTS (
                    SELECT 1 FROM post_likes AS pl
                    WHERE pl.post_id = p.post_id AND pl.user_id = {viewer}
                ) AS is_liked,
                p.created_at,
                p.updated_at
            FROM forum_posts AS p
            INNER JOIN users AS u ON p.author_id = u.user_id
        "#
    )
}

fn comment_select(viewer: &str) -> String {
    format!(
        r#"
            SELECT
                c.comment_id,
                c.post_id,
                u.user_id AS author_id,
                u.name AS author_name,
                c.content,
                c.like_count,
                EXISTS (
                    SELECT 1 FROM comment_likes AS cl
                    WHERE cl.comment_id = c.comment_id AND cl.user_id = {viewer}
                ) AS is_liked,
                c.created_at
            FROM forum_comments AS c
            INNER JOIN users AS u ON c.author_id = u.user_id
        "#
    )
}

const POST_FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR p.library_id = $1)
      AND ($2::text IS NULL OR p.category = $2)
      AND ($3::text IS NULL OR p.title ILIKE $3 OR p.content ILIKE $3)
"#;

#[async_trait]
impl ForumRepository for ForumRepositoryImpl {
    async fn create_post(&self, event: CreatePost) -> AppResult<PostId> {
        let post_id = PostId::new();
        sqlx::query(
            r#"
                INSERT INTO forum_posts (post_id, author_id, library_id, title, content, category)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(post_id)
        .bind(event.author_id)
        .bind(event.library_id)
        .bind(&event.title)
        .bind(&event.content)
        .bind(&event.category)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(post_id)
    }

    async fn find_posts(&self, options: PostListOptions) -> AppResult<PaginatedList<ForumPost>> {
        let PostListOptions {
            library_id,
            category,
            search,
            viewer,
            list,
        } = options;
        let category = category.filter(|c| !c.trim().is_empty());
        let pattern = like_pattern(&search);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM forum_posts AS p {POST_FILTER}"
        ))
        .bind(library_id)
        .bind(&category)
        .bind(&pattern)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let rows = sqlx::query_as::<_, ForumPostRow>(&format!(
            "{} {POST_FILTER} ORDER BY p.created_at DESC LIMIT $5 OFFSET $6",
            post_select("$4")
        ))
        .bind(library_id)
        .bind(&category)
        .bind(&pattern)
        .bind(viewer)
        .bind(list.limit)
        .bind(list.offset)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(PaginatedList {
            total,
            limit: list.limit,
            offset: list.offset,
            items: rows.into_iter().map(ForumPost::from).collect(),
        })
    }

    async fn find_post_by_id(
        &self,
        post_id: PostId,
        viewer: Option<UserId>,
    ) -> AppResult<Option<ForumPost>> {
        let row = sqlx::query_as::<_, ForumPostRow>(&format!(
            "{} WHERE p.post_id = $1",
            post_select("$2")
        ))
        .bind(post_id)
        .bind(viewer)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(ForumPost::from))
    }

    async fn update_post(&self, event: UpdatePost) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE forum_posts
                SET
                    title = COALESCE($2, title),
                    content = COALESCE($3, content),
                    category = COALESCE($4, category)
                WHERE post_id = $1
            "#,
        )
        .bind(event.post_id)
        .bind(event.title)
        .bind(event.content)
        .bind(event.category)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified post not found".into()));
        }
        Ok(())
    }

    async fn delete_post(&self, post_id: PostId) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM forum_posts WHERE post_id = $1")
            .bind(post_id)
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified post not found".into()));
        }
        Ok(())
    }

    async fn create_comment(&self, event: CreateComment) -> AppResult<CommentId> {
        let mut tx = self.db.begin().await?;

        let res = sqlx::query(
            "UPDATE forum_posts SET comment_count = comment_count + 1 WHERE post_id = $1",
        )
        .bind(event.post_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "post ({}) not found",
                event.post_id
            )));
        }

        let comment_id = CommentId::new();
        sqlx::query(
            r#"
                INSERT INTO forum_comments (comment_id, post_id, author_id, content)
                VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(comment_id)
        .bind(event.post_id)
        .bind(event.author_id)
        .bind(&event.content)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(comment_id)
    }

    async fn find_comments(
        &self,
        post_id: PostId,
        viewer: Option<UserId>,
    ) -> AppResult<Vec<ForumComment>> {
        let rows = sqlx::query_as::<_, ForumCommentRow>(&format!(
            "{} WHERE c.post_id = $1 ORDER BY c.created_at ASC",
            comment_select("$2")
        ))
        .bind(post_id)
        .bind(viewer)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(ForumComment::from).collect())
    }

    async fn find_comment_by_id(&self, comment_id: CommentId) -> AppResult<Option<ForumComment>> {
        let row = sqlx::query_as::<_, ForumCommentRow>(&format!(
            "{} WHERE c.comment_id = $1",
            comment_select("NULL")
        ))
        .bind(comment_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(ForumComment::from))
    }

    async fn delete_comment(&self, comment_id: CommentId) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let post_id: Option<PostId> =
            sqlx::query_scalar("DELETE FROM forum_comments WHERE comment_id = $1 RETURNING post_id")
                .bind(comment_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;

        let Some(post_id) = post_id else {
            return Err(AppError::EntityNotFound("specified comment not found".into()));
        };

        sqlx::query(
            r#"
                UPDATE forum_posts
                SET comment_count = GREATEST(comment_count - 1, 0)
                WHERE post_id = $1
            "#,
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }

    async fn toggle_post_like(&self, event: TogglePostLike) -> AppResult<LikeState> {
        let mut tx = self.db.begin().await?;

        let current: Option<(i32, bool)> = sqlx::query_as(
            r#"
                SELECT
                    p.like_count,
                    EXISTS (
                        SELECT 1 FROM post_likes
                        WHERE post_id = p.post_id AND user_id = $2
                    )
                FROM forum_posts AS p
                WHERE p.post_id = $1
                FOR UPDATE
            "#,
        )
        .bind(event.post_id)
        .bind(event.user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some((like_count, is_liked)) = current else {
            return Err(AppError::EntityNotFound(format!(
                "post ({}) not found",
                event.post_id
            )));
        };
        let next = LikeState {
            is_liked,
            like_count,
        }
        .toggled();

        let statement = if next.is_liked {
            "INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2)"
        } else {
            "DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2"
        };
        sqlx::query(statement)
            .bind(event.post_id)
            .bind(event.user_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        sqlx::query("UPDATE forum_posts SET like_count = $2 WHERE post_id = $1")
            .bind(event.post_id)
            .bind(next.like_count)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(next)
    }

    async fn toggle_comment_like(&self, event: ToggleCommentLike) -> AppResult<LikeState> {
        let mut tx = self.db.begin().await?;

        let current: Option<(i32, bool)> = sqlx::query_as(
            r#"
                SELECT
                    c.like_count,
                    EXISTS (
                        SELECT 1 FROM comment_likes
                        WHERE comment_id = c.comment_id AND user_id = $2
                    )
                FROM forum_comments AS c
                WHERE c.comment_id = $1
                FOR UPDATE
            "#,
        )
        .bind(event.comment_id)
        .bind(event.user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some((like_count, is_liked)) = current else {
            return Err(AppError::EntityNotFound(format!(
                "comment ({}) not found",
                event.comment_id
            )));
        };
        let next = LikeState {
            is_liked,
            like_count,
        }
        .toggled();

        let statement = if next.is_liked {
            "INSERT INTO comment_likes (comment_id, user_id) VALUES ($1, $2)"
        } else {
            "DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2"
        };
        sqlx::query(statement)
            .bind(event.comment_id)
            .bind(event.user_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        sqlx::query("UPDATE forum_comments SET like_count = $2 WHERE comment_id = $1")
            .bind(event.comment_id)
            .bind(next.like_count)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::booking::tests::seed;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn liking_twice_restores_the_count(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let f = seed(&pool).await?;
        let repo = ForumRepositoryImpl::new(ConnectionPool::new(pool));

        let post_id = repo
            .create_post(CreatePost::new(
                f.user_id,
                Some(f.library_id),
                "Quiet hours".into(),
                "Is the reading room quiet after 8pm?".into(),
                "general".into(),
            ))
            .await?;

        let liked = repo
            .toggle_post_like(TogglePostLike::new(post_id, f.user_id))
            .await?;
        assert!(liked.is_liked);
        assert_eq!(liked.like_count, 1);

        let post = repo.find_post_by_id(post_id, Some(f.user_id)).await?.unwrap();
        assert!(post.is_liked);
        let anonymous = repo.find_post_by_id(post_id, None).await?.unwrap();
        assert!(!anonymous.is_liked);

        let unliked = repo
            .toggle_post_like(TogglePostLike::new(post_id, f.user_id))
            .await?;
        assert_eq!(
            unliked,
            LikeState {
                is_liked: false,
                like_count: 0
            }
        );
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn liking_a_comment_twice_restores_the_count(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let f = seed(&pool).await?;
        let repo = ForumRepositoryImpl::new(ConnectionPool::new(pool));

        let post_id = repo
            .create_post(CreatePost::new(
                f.user_id,
                Some(f.library_id),
                "Lost and found".into(),
                "Someone left an umbrella at seat A-1.".into(),
                "general".into(),
            ))
            .await?;
        let comment_id = repo
            .create_comment(CreateComment::new(post_id, f.user_id, "It's mine!".into()))
            .await?;
        let before = repo.find_comment_by_id(comment_id).await?.unwrap().like_count;

        let liked = repo
            .toggle_comment_like(ToggleCommentLike::new(comment_id, f.user_id))
            .await?;
        assert_eq!(
            liked,
            LikeState {
                is_liked: true,
                like_count: before + 1
            }
        );
        let comments = repo.find_comments(post_id, Some(f.user_id)).await?;
        assert!(comments.iter().any(|c| c.comment_id == comment_id && c.is_liked));

        let unliked = repo
            .toggle_comment_like(ToggleCommentLike::new(comment_id, f.user_id))
            .await?;
        assert_eq!(
            unliked,
            LikeState {
                is_liked: false,
                like_count: before
            }
        );
        let comment = repo.find_comment_by_id(comment_id).await?.unwrap();
        assert_eq!(comment.like_count, before);
        assert!(!comment.is_liked);
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn comments_keep_comment_count(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let f = seed(&pool).await?;
        let repo = ForumRepositoryImpl::new(ConnectionPool::new(pool));

        let post_id = repo
            .create_post(CreatePost::new(
                f.user_id,
                None,
                "Hello".into(),
                "First post".into(),
                "general".into(),
            ))
            .await?;
        let comment_id = repo
            .create_comment(CreateComment::new(post_id, f.user_id, "Welcome!".into()))
            .await?;
        assert_eq!(
            repo.find_post_by_id(post_id, None).await?.unwrap().comment_count,
            1
        );

        repo.delete_comment(comment_id).await?;
        assert_eq!(
            repo.find_post_by_id(post_id, None).await?.unwrap().comment_count,
            0
        );
        assert!(repo.find_comments(post_id, None).await?.is_empty());
        Ok(())
    }
}
