use crate::{
    database::{
        like_pattern, map_write_error,
        model::{
            parse_enum,
            library::{LibraryRow, OpeningHoursRow},
        },
        set_transaction_serializable, ConnectionPool,
    },
    repository::user::upsert_user,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        id::{LibraryId, UserId},
        library::{
            event::{RegisterLibrary, RejectLibrary, ReplaceOpeningHours, UpdateLibrary},
            Library, LibraryListOptions, LibraryStatus, OpeningHours,
        },
        list::PaginatedList,
        user::event::CreateUser,
    },
    repository::library::LibraryRepository,
};
use shared::error::{AppError, AppResult};
use sqlx::PgConnection;
use std::collections::HashMap;

#[derive(new)]
pub struct LibraryRepositoryImpl {
    db: ConnectionPool,
}

const LIBRARY_SELECT: &str = r#"
    SELECT
        l.library_id,
        l.name,
        l.description,
        l.address,
        l.city,
        l.phone,
        l.email,
        l.status,
        l.is_active,
        l.rejection_reason,
        l.approved_at,
        l.created_at,
        u.user_id AS owner_id,
        u.name AS owner_name,
        u.email AS owner_email
    FROM libraries AS l
    INNER JOIN users AS u ON l.owner_id = u.user_id
"#;

const LIBRARY_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR l.status = $1)
      AND ($2 = FALSE OR (l.status = 'APPROVED' AND l.is_active))
      AND ($3::text IS NULL OR LOWER(l.city) = LOWER($3))
      AND ($4::text IS NULL OR l.name ILIKE $4 OR l.address ILIKE $4)
"#;

async fn insert_opening_hours(
    conn: &mut PgConnection,
    library_id: LibraryId,
    hours: &[OpeningHours],
) -> AppResult<()> {
    for h in hours {
        sqlx::query(
            r#"
                INSERT INTO opening_hours
                (library_id, day_of_week, open_time, close_time, is_closed)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(library_id)
        .bind(h.day_of_week)
        .bind(h.open_time)
        .bind(h.close_time)
        .bind(h.is_closed)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, "dayOfWeek is listed more than once"))?;
    }
    Ok(())
}

impl LibraryRepositoryImpl {
    // 複数の図書館の開館時間をまとめて取得し、図書館ごとに振り分ける
    async fn load_opening_hours(
        &self,
        library_ids: &[LibraryId],
    ) -> AppResult<HashMap<LibraryId, Vec<OpeningHours>>> {
        let ids: Vec<uuid::Uuid> = library_ids.iter().map(|id| id.raw()).collect();
        let rows = sqlx::query_as::<_, OpeningHoursRow>(
            r#"
                SELECT library_id, day_of_week, open_time, close_time, is_closed
                FROM opening_hours
                WHERE library_id = ANY($1)
                ORDER BY day_of_week ASC
            "#,
        )
        .bind(ids)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let mut map: HashMap<LibraryId, Vec<OpeningHours>> = HashMap::new();
        for row in rows {
            map.entry(row.library_id).or_default().push(row.into());
        }
        Ok(map)
    }

    async fn into_libraries(&self, rows: Vec<LibraryRow>) -> AppResult<Vec<Library>> {
        let ids: Vec<LibraryId> = rows.iter().map(|r| r.library_id).collect();
        let mut hours = self.load_opening_hours(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let h = hours.remove(&row.library_id).unwrap_or_default();
                row.into_library(h)
            })
            .collect()
    }

    async fn find_one(&self, condition: &str, id: uuid::Uuid) -> AppResult<Option<Library>> {
        let row = sqlx::query_as::<_, LibraryRow>(&format!("{LIBRARY_SELECT} WHERE {condition}"))
            .bind(id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        match row {
            None => Ok(None),
            Some(row) => Ok(self.into_libraries(vec![row]).await?.pop()),
        }
    }

    async fn fetch_existing(&self, library_id: LibraryId) -> AppResult<Library> {
        self.find_by_id(library_id).await?.ok_or_else(|| {
            AppError::EntityNotFound(format!("library ({library_id}) not found"))
        })
    }

    // 承認・却下の前に対象が PENDING であることを行ロック付きで確認する
    async fn lock_pending(
        conn: &mut PgConnection,
        library_id: LibraryId,
    ) -> AppResult<UserId> {
        let row: Option<(String, UserId)> = sqlx::query_as(
            r#"
                SELECT status, owner_id
                FROM libraries
                WHERE library_id = $1
                FOR UPDATE
            "#,
        )
        .bind(library_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some((status, owner_id)) = row else {
            return Err(AppError::EntityNotFound(format!(
                "library ({library_id}) not found"
            )));
        };
        let status: LibraryStatus = parse_enum("library status", &status)?;
        if status != LibraryStatus::Pending {
            return Err(AppError::BadRequest(format!(
                "library ({library_id}) is already {status}"
            )));
        }
        Ok(owner_id)
    }
}

#[async_trait]
impl LibraryRepository for LibraryRepositoryImpl {
    async fn register(&self, event: RegisterLibrary) -> AppResult<Library> {
        let mut tx = self.db.begin().await?;
        set_transaction_serializable(&mut tx).await?;

        // ① ユーザーがいなければ作成する
        let owner = upsert_user(&mut tx, &CreateUser::from(event.identity.clone())).await?;

        // ② 1 ユーザーにつき 1 図書館、名前とメールアドレスの重複は不可
        {
            let owned: Option<LibraryId> =
                sqlx::query_scalar("SELECT library_id FROM libraries WHERE owner_id = $1")
                    .bind(owner.user_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(AppError::SpecificOperationError)?;
            if owned.is_some() {
                return Err(AppError::BadRequest(
                    "this account has already registered a library".into(),
                ));
            }

            let duplicate: Option<LibraryId> = sqlx::query_scalar(
                r#"
                    SELECT library_id FROM libraries
                    WHERE LOWER(name) = LOWER($1) OR LOWER(email) = LOWER($2)
                    LIMIT 1
                "#,
            )
            .bind(&event.name)
            .bind(&event.email)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
            if duplicate.is_some() {
                return Err(AppError::DuplicateEntity(
                    "a library with the same name or email already exists".into(),
                ));
            }
        }

        // ③ 図書館を PENDING で作成する
        let library_id = LibraryId::new();
        sqlx::query(
            r#"
                INSERT INTO libraries
                (library_id, owner_id, name, description, address, city, phone, email,
                 status, is_active)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'PENDING', FALSE)
            "#,
        )
        .bind(library_id)
        .bind(owner.user_id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.address)
        .bind(&event.city)
        .bind(&event.phone)
        .bind(&event.email)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_write_error(e, "a library with the same name or email already exists")
        })?;

        // ④ 開館時間を作成する
        insert_opening_hours(&mut tx, library_id, &event.opening_hours).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.fetch_existing(library_id).await
    }

    async fn find_all(&self, options: LibraryListOptions) -> AppResult<PaginatedList<Library>> {
        let LibraryListOptions {
            status,
            public_only,
            city,
            search,
            list,
        } = options;
        let status = status.map(|s| s.as_ref().to_string());
        let city = city.filter(|c| !c.trim().is_empty());
        let pattern = like_pattern(&search);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM libraries AS l {LIBRARY_FILTER}"
        ))
        .bind(&status)
        .bind(public_only)
        .bind(&city)
        .bind(&pattern)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let rows = sqlx::query_as::<_, LibraryRow>(&format!(
            "{LIBRARY_SELECT} {LIBRARY_FILTER} ORDER BY l.created_at DESC LIMIT $5 OFFSET $6"
        ))
        .bind(&status)
        .bind(public_only)
        .bind(&city)
        .bind(&pattern)
        .bind(list.limit)
        .bind(list.offset)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(PaginatedList {
            total,
            limit: list.limit,
            offset: list.offset,
            items: self.into_libraries(rows).await?,
        })
    }

    async fn find_by_id(&self, library_id: LibraryId) -> AppResult<Option<Library>> {
        self.find_one("l.library_id = $1", library_id.raw()).await
    }

    async fn find_by_owner(&self, owner_id: UserId) -> AppResult<Option<Library>> {
        self.find_one("l.owner_id = $1", owner_id.raw()).await
    }

    async fn update(&self, event: UpdateLibrary) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE libraries
                SET
                    name = COALESCE($2, name),
                    description = COALESCE($3, description),
                    address = COALESCE($4, address),
                    city = COALESCE($5, city),
                    phone = COALESCE($6, phone),
                    email = COALESCE($7, email)
                WHERE library_id = $1
            "#,
        )
        .bind(event.library_id)
        .bind(event.name)
        .bind(event.description)
        .bind(event.address)
        .bind(event.city)
        .bind(event.phone)
        .bind(event.email)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_write_error(e, "a library with the same name or email already exists"))?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified library not found".into()));
        }

        Ok(())
    }

    async fn replace_opening_hours(&self, event: ReplaceOpeningHours) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM opening_hours WHERE library_id = $1")
            .bind(event.library_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        insert_opening_hours(&mut tx, event.library_id, &event.opening_hours).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn approve(&self, library_id: LibraryId) -> AppResult<Library> {
        let mut tx = self.db.begin().await?;
        set_transaction_serializable(&mut tx).await?;

        let owner_id = Self::lock_pending(&mut tx, library_id).await?;

        sqlx::query(
            r#"
                UPDATE libraries
                SET status = 'APPROVED', is_active = TRUE, approved_at = NOW(),
                    rejection_reason = NULL
                WHERE library_id = $1
            "#,
        )
        .bind(library_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        // 所有者を ADMIN に昇格する（SUPER_ADMIN はそのまま）
        let res = sqlx::query(
            r#"
                UPDATE users
                SET
                    role = CASE WHEN role = 'SUPER_ADMIN' THEN role ELSE 'ADMIN' END,
                    library_id = $2
                WHERE user_id = $1
            "#,
        )
        .bind(owner_id)
        .bind(library_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "library owner could not be promoted".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.fetch_existing(library_id).await
    }

    async fn reject(&self, event: RejectLibrary) -> AppResult<Library> {
        let mut tx = self.db.begin().await?;

        Self::lock_pending(&mut tx, event.library_id).await?;

        sqlx::query(
            r#"
                UPDATE libraries
                SET status = 'REJECTED', is_active = FALSE, rejection_reason = $2
                WHERE library_id = $1
            "#,
        )
        .bind(event.library_id)
        .bind(&event.reason)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.fetch_existing(event.library_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::user::UserRepositoryImpl;
    use chrono::NaiveTime;
    use kernel::{
        model::{auth::ExternalIdentity, role::Role},
        repository::user::UserRepository,
    };

    fn register_event(subject: &str, name: &str, email: &str) -> RegisterLibrary {
        RegisterLibrary::new(
            ExternalIdentity {
                subject: subject.into(),
                email: format!("{subject}@example.com"),
                name: "Owner".into(),
            },
            name.into(),
            "Quiet study space".into(),
            "1 Main St".into(),
            "Springfield".into(),
            "555-0100".into(),
            email.into(),
            vec![OpeningHours {
                day_of_week: 1,
                open_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                close_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
                is_closed: false,
            }],
        )
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn duplicate_registration_creates_no_rows(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = LibraryRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        repo.register(register_event("owner-a", "Central", "central@example.com"))
            .await?;

        let res = repo
            .register(register_event("owner-b", "central", "other@example.com"))
            .await;
        assert!(matches!(res, Err(AppError::DuplicateEntity(_))));

        // 失敗した登録ではユーザーも作られない
        let users = UserRepositoryImpl::new(ConnectionPool::new(pool));
        assert!(users.find_by_external_id("owner-b").await?.is_none());
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn approve_promotes_owner(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = LibraryRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let library = repo
            .register(register_event("owner-c", "Eastside", "east@example.com"))
            .await?;
        assert_eq!(library.status, LibraryStatus::Pending);
        assert_eq!(library.opening_hours.len(), 1);

        let approved = repo.approve(library.library_id).await?;
        assert_eq!(approved.status, LibraryStatus::Approved);
        assert!(approved.is_active);

        let users = UserRepositoryImpl::new(ConnectionPool::new(pool));
        let owner = users.find_by_external_id("owner-c").await?.unwrap();
        assert_eq!(owner.role, Role::Admin);
        assert_eq!(owner.library_id, Some(library.library_id));

        // 承認済みの図書館は再承認できない
        assert!(matches!(
            repo.approve(library.library_id).await,
            Err(AppError::BadRequest(_))
        ));
        Ok(())
    }
}
