use crate::database::{like_pattern, model::user::UserRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        id::UserId,
        list::PaginatedList,
        user::{
            event::{CreateUser, UpdateProfile, UpdateUserRole},
            User, UserListOptions,
        },
    },
    repository::user::UserRepository,
};
use shared::error::{AppError, AppResult};
use sqlx::PgConnection;

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

const USER_COLUMNS: &str = r#"
    user_id, external_id, name, email, phone, role, library_id, created_at
"#;

// 外部 ID に紐づくユーザーがいなければ作成し、いずれにせよ該当ユーザーを返す
// 図書館登録のトランザクションからも利用する
pub(crate) async fn upsert_user(conn: &mut PgConnection, event: &CreateUser) -> AppResult<UserRow> {
    sqlx::query(
        r#"
            INSERT INTO users (external_id, name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (external_id) DO NOTHING
        "#,
    )
    .bind(&event.external_id)
    .bind(&event.name)
    .bind(&event.email)
    .execute(&mut *conn)
    .await
    .map_err(AppError::SpecificOperationError)?;

    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1"
    ))
    .bind(&event.external_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(AppError::SpecificOperationError)
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(User::try_from)
        .transpose()
    }

    async fn create_if_missing(&self, event: CreateUser) -> AppResult<User> {
        let mut conn = self
            .db
            .inner_ref()
            .acquire()
            .await
            .map_err(AppError::SpecificOperationError)?;
        upsert_user(&mut *conn, &event).await?.try_into()
    }

    async fn update_profile(&self, event: UpdateProfile) -> AppResult<User> {
        sqlx::query_as::<_, UserRow>(&format!(
            r#"
                UPDATE users
                SET
                    name = COALESCE($2, name),
                    phone = COALESCE($3, phone)
                WHERE user_id = $1
                RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(event.user_id)
        .bind(event.name)
        .bind(event.phone)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .ok_or_else(|| AppError::EntityNotFound("specified user not found".into()))?
        .try_into()
    }

    async fn update_role(&self, event: UpdateUserRole) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE users
                SET role = $2
                WHERE user_id = $1
            "#,
        )
        .bind(event.user_id)
        .bind(event.role.as_ref())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified user not found".into()));
        }

        Ok(())
    }

    async fn find_all(&self, options: UserListOptions) -> AppResult<PaginatedList<User>> {
        let UserListOptions { role, search, list } = options;
        let role = role.map(|r| r.as_ref().to_string());
        let pattern = like_pattern(&search);

        let total: i64 = sqlx::query_scalar(
            r#"
                SELECT COUNT(*) FROM users
                WHERE ($1::text IS NULL OR role = $1)
                  AND ($2::text IS NULL OR name ILIKE $2 OR email ILIKE $2)
            "#,
        )
        .bind(&role)
        .bind(&pattern)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let items = sqlx::query_as::<_, UserRow>(&format!(
            r#"
                SELECT {USER_COLUMNS} FROM users
                WHERE ($1::text IS NULL OR role = $1)
                  AND ($2::text IS NULL OR name ILIKE $2 OR email ILIKE $2)
                ORDER BY created_at DESC
                LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&role)
        .bind(&pattern)
        .bind(list.limit)
        .bind(list.offset)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .into_iter()
        .map(User::try_from)
        .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedList {
            total,
            limit: list.limit,
            offset: list.offset,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::role::Role;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn create_if_missing_is_idempotent(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));
        let event = CreateUser::new("auth0|1".into(), "Alice".into(), "alice@example.com".into());

        let first = repo.create_if_missing(event.clone()).await?;
        let second = repo.create_if_missing(event).await?;
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(first.role, Role::Member);

        repo.update_role(UpdateUserRole::new(first.user_id, Role::SuperAdmin))
            .await?;
        let found = repo.find_by_external_id("auth0|1").await?.unwrap();
        assert_eq!(found.role, Role::SuperAdmin);

        let page = repo
            .find_all(UserListOptions {
                search: Some("alice".into()),
                ..Default::default()
            })
            .await?;
        assert_eq!(page.total, 1);
        Ok(())
    }
}
