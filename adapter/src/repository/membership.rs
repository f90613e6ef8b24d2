use crate::database::{
    model::{
        membership::{MembershipPlanRow, MembershipRow},
        parse_enum,
    },
    set_transaction_serializable, ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        id::{LibraryId, MembershipId, MembershipPlanId, PaymentId, UserId},
        list::{ListOptions, PaginatedList},
        membership::{
            event::{
                CancelMembership, CreateMembershipPlan, DeactivateMembershipPlan,
                PurchaseMembership, UpdateMembershipPlan,
            },
            Membership, MembershipPlan, MembershipStatus,
        },
    },
    repository::membership::MembershipRepository,
};
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct MembershipRepositoryImpl {
    db: ConnectionPool,
}

const PLAN_SELECT: &str = r#"
    SELECT plan_id, library_id, name, description, price, duration_days, features, is_active,
           created_at
    FROM membership_plans
"#;

const MEMBERSHIP_SELECT: &str = r#"
    SELECT
        m.membership_id,
        u.user_id,
        u.name AS user_name,
        u.email AS user_email,
        p.plan_id,
        p.name AS plan_name,
        l.library_id,
        l.name AS library_name,
        m.start_date,
        m.end_date,
        m.status,
        m.created_at
    FROM memberships AS m
    INNER JOIN users AS u ON m.user_id = u.user_id
    INNER JOIN membership_plans AS p ON m.plan_id = p.plan_id
    INNER JOIN libraries AS l ON m.library_id = l.library_id
"#;

fn into_memberships(rows: Vec<MembershipRow>) -> AppResult<Vec<Membership>> {
    rows.into_iter().map(Membership::try_from).collect()
}

#[async_trait]
impl MembershipRepository for MembershipRepositoryImpl {
    async fn create_plan(&self, event: CreateMembershipPlan) -> AppResult<MembershipPlanId> {
        let plan_id = MembershipPlanId::new();
        sqlx::query(
            r#"
                INSERT INTO membership_plans
                (plan_id, library_id, name, description, price, duration_days, features)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(plan_id)
        .bind(event.library_id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.price)
        .bind(event.duration_days)
        .bind(&event.features)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(plan_id)
    }

    async fn find_plans(
        &self,
        library_id: LibraryId,
        include_inactive: bool,
    ) -> AppResult<Vec<MembershipPlan>> {
        let rows = sqlx::query_as::<_, MembershipPlanRow>(&format!(
            r#"{PLAN_SELECT}
                WHERE library_id = $1 AND ($2 OR is_active)
                ORDER BY price ASC, created_at ASC
            "#
        ))
        .bind(library_id)
        .bind(include_inactive)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(MembershipPlan::from).collect())
    }

    async fn find_plan_by_id(
        &self,
        plan_id: MembershipPlanId,
    ) -> AppResult<Option<MembershipPlan>> {
        let row = sqlx::query_as::<_, MembershipPlanRow>(&format!("{PLAN_SELECT} WHERE plan_id = $1"))
            .bind(plan_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(MembershipPlan::from))
    }

    async fn update_plan(&self, event: UpdateMembershipPlan) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE membership_plans
                SET
                    name = COALESCE($3, name),
                    description = COALESCE($4, description),
                    price = COALESCE($5, price),
                    duration_days = COALESCE($6, duration_days),
                    features = COALESCE($7, features)
                WHERE plan_id = $1 AND library_id = $2
            "#,
        )
        .bind(event.plan_id)
        .bind(event.library_id)
        .bind(event.name)
        .bind(event.description)
        .bind(event.price)
        .bind(event.duration_days)
        .bind(event.features)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(
                "specified membership plan not found".into(),
            ));
        }
        Ok(())
    }

    // 購入済みの会員を残すため、プランは削除せず無効化する
    async fn deactivate_plan(&self, event: DeactivateMembershipPlan) -> AppResult<()> {
        let res = sqlx::query(
            "UPDATE membership_plans SET is_active = FALSE WHERE plan_id = $1 AND library_id = $2",
        )
        .bind(event.plan_id)
        .bind(event.library_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(
                "specified membership plan not found".into(),
            ));
        }
        Ok(())
    }

    async fn purchase(&self, event: PurchaseMembership) -> AppResult<MembershipId> {
        let mut tx = self.db.begin().await?;
        set_transaction_serializable(&mut tx).await?;

        // ① プランが有効であることを確認する
        let plan: MembershipPlan = sqlx::query_as::<_, MembershipPlanRow>(&format!(
            "{PLAN_SELECT} WHERE plan_id = $1"
        ))
        .bind(event.plan_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(MembershipPlan::from)
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("membership plan ({}) not found", event.plan_id))
        })?;

        if !plan.is_active {
            return Err(AppError::BadRequest(format!(
                "membership plan ({}) is no longer offered",
                plan.plan_id
            )));
        }

        // ② 同じ図書館で有効な会員資格を既に持っていないことを確認する
        let holding: bool = sqlx::query_scalar(
            r#"
                SELECT EXISTS (
                    SELECT 1 FROM memberships
                    WHERE user_id = $1
                      AND library_id = $2
                      AND status = 'ACTIVE'
                      AND end_date > $3
                )
            "#,
        )
        .bind(event.user_id)
        .bind(plan.library_id)
        .bind(event.purchased_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if holding {
            return Err(AppError::BadRequest(
                "you already have an active membership at this library".into(),
            ));
        }

        // ③ 会員資格と支払いを記録する
        let (start_date, end_date) = plan.period_from(event.purchased_at)?;
        let membership_id = MembershipId::new();
        sqlx::query(
            r#"
                INSERT INTO memberships
                (membership_id, user_id, plan_id, library_id, start_date, end_date, status)
                VALUES ($1, $2, $3, $4, $5, $6, 'ACTIVE')
            "#,
        )
        .bind(membership_id)
        .bind(event.user_id)
        .bind(plan.plan_id)
        .bind(plan.library_id)
        .bind(start_date)
        .bind(end_date)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        sqlx::query(
            r#"
                INSERT INTO payments
                (payment_id, user_id, library_id, membership_id, amount, method, status, paid_at)
                VALUES ($1, $2, $3, $4, $5, $6, 'COMPLETED', $7)
            "#,
        )
        .bind(PaymentId::new())
        .bind(event.user_id)
        .bind(plan.library_id)
        .bind(membership_id)
        .bind(plan.price)
        .bind(event.payment_method.as_ref())
        .bind(event.purchased_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(membership_id)
    }

    async fn find_by_id(&self, membership_id: MembershipId) -> AppResult<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(&format!(
            "{MEMBERSHIP_SELECT} WHERE m.membership_id = $1"
        ))
        .bind(membership_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.map(Membership::try_from).transpose()
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Membership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(&format!(
            "{MEMBERSHIP_SELECT} WHERE m.user_id = $1 ORDER BY m.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        into_memberships(rows)
    }

    async fn find_by_library(
        &self,
        library_id: LibraryId,
        options: ListOptions,
    ) -> AppResult<PaginatedList<Membership>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM memberships WHERE library_id = $1")
                .bind(library_id)
                .fetch_one(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;

        let rows = sqlx::query_as::<_, MembershipRow>(&format!(
            r#"{MEMBERSHIP_SELECT}
                WHERE m.library_id = $1
                ORDER BY m.created_at DESC
                LIMIT $2 OFFSET $3
            "#
        ))
        .bind(library_id)
        .bind(options.limit)
        .bind(options.offset)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(PaginatedList {
            total,
            limit: options.limit,
            offset: options.offset,
            items: into_memberships(rows)?,
        })
    }

    async fn cancel(&self, event: CancelMembership) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let status: Option<String> = sqlx::query_scalar(
            "SELECT status FROM memberships WHERE membership_id = $1 FOR UPDATE",
        )
        .bind(event.membership_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(status) = status else {
            return Err(AppError::EntityNotFound(format!(
                "membership ({}) not found",
                event.membership_id
            )));
        };
        let status: MembershipStatus = parse_enum("membership status", &status)?;
        if status != MembershipStatus::Active {
            return Err(AppError::BadRequest(format!(
                "membership ({}) is already {status}",
                event.membership_id
            )));
        }

        sqlx::query("UPDATE memberships SET status = 'CANCELLED' WHERE membership_id = $1")
            .bind(event.membership_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::booking::tests::seed;
    use chrono::Utc;
    use kernel::model::booking::PaymentMethod;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn second_active_membership_is_rejected(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let f = seed(&pool).await?;
        let repo = MembershipRepositoryImpl::new(ConnectionPool::new(pool));

        let plan_id = repo
            .create_plan(CreateMembershipPlan::new(
                f.library_id,
                "Monthly".into(),
                String::new(),
                150000,
                30,
                vec!["24/7 access".into()],
            ))
            .await?;

        let membership_id = repo
            .purchase(PurchaseMembership::new(
                plan_id,
                f.user_id,
                PaymentMethod::Upi,
                Utc::now(),
            ))
            .await?;
        let res = repo
            .purchase(PurchaseMembership::new(
                plan_id,
                f.user_id,
                PaymentMethod::Upi,
                Utc::now(),
            ))
            .await;
        assert!(matches!(res, Err(AppError::BadRequest(_))));

        // キャンセル後は再購入できる
        repo.cancel(CancelMembership::new(membership_id)).await?;
        repo.purchase(PurchaseMembership::new(
            plan_id,
            f.user_id,
            PaymentMethod::Upi,
            Utc::now(),
        ))
        .await?;

        let members = repo
            .find_by_library(f.library_id, ListOptions::default())
            .await?;
        assert_eq!(members.total, 2);
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn deactivated_plan_cannot_be_purchased(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let f = seed(&pool).await?;
        let repo = MembershipRepositoryImpl::new(ConnectionPool::new(pool));

        let plan_id = repo
            .create_plan(CreateMembershipPlan::new(
                f.library_id,
                "Weekly".into(),
                String::new(),
                50000,
                7,
                vec![],
            ))
            .await?;
        repo.deactivate_plan(DeactivateMembershipPlan::new(f.library_id, plan_id))
            .await?;

        assert!(repo.find_plans(f.library_id, false).await?.is_empty());
        assert_eq!(repo.find_plans(f.library_id, true).await?.len(), 1);
        assert!(matches!(
            repo.purchase(PurchaseMembership::new(
                plan_id,
                f.user_id,
                PaymentMethod::Cash,
                Utc::now(),
            ))
            .await,
            Err(AppError::BadRequest(_))
        ));
        Ok(())
    }
}
