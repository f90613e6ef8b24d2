use crate::database::{
    model::analytics::{LibraryBookingCountRow, StatusCountRow},
    ConnectionPool,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use derive_new::new;
use kernel::{
    model::{
        analytics::{LibraryDashboard, PlatformAnalytics, StatusCount},
        id::LibraryId,
    },
    repository::{analytics::AnalyticsRepository, seat::SeatRepository},
};
use shared::error::{AppError, AppResult};

use super::seat::SeatRepositoryImpl;

#[derive(new)]
pub struct AnalyticsRepositoryImpl {
    db: ConnectionPool,
}

const TOP_LIBRARY_LIMIT: i64 = 5;

impl AnalyticsRepositoryImpl {
    async fn group_count(&self, sql: &str) -> AppResult<Vec<StatusCount>> {
        let rows = sqlx::query_as::<_, StatusCountRow>(sql)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(rows.into_iter().map(StatusCount::from).collect())
    }
}

#[async_trait]
impl AnalyticsRepository for AnalyticsRepositoryImpl {
    async fn platform_summary(&self) -> AppResult<PlatformAnalytics> {
        let libraries_by_status = self
            .group_count(
                "SELECT status, COUNT(*) AS count FROM libraries GROUP BY status ORDER BY status",
            )
            .await?;
        let users_by_role = self
            .group_count("SELECT role AS status, COUNT(*) AS count FROM users GROUP BY role ORDER BY role")
            .await?;
        let bookings_by_status = self
            .group_count(
                "SELECT status, COUNT(*) AS count FROM seat_bookings GROUP BY status ORDER BY status",
            )
            .await?;

        // SUM(BIGINT) は NUMERIC になるため BIGINT に戻す
        let total_revenue: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM payments WHERE status = 'COMPLETED'",
        )
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let active_memberships: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM memberships WHERE status = 'ACTIVE' AND end_date > NOW()",
        )
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let top_libraries = sqlx::query_as::<_, LibraryBookingCountRow>(
            r#"
                SELECT l.library_id, l.name AS library_name, COUNT(b.booking_id) AS booking_count
                FROM libraries AS l
                INNER JOIN seat_bookings AS b ON b.library_id = l.library_id
                GROUP BY l.library_id, l.name
                ORDER BY booking_count DESC, l.name ASC
                LIMIT $1
            "#,
        )
        .bind(TOP_LIBRARY_LIMIT)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .into_iter()
        .map(Into::into)
        .collect();

        Ok(PlatformAnalytics {
            libraries_by_status,
            users_by_role,
            bookings_by_status,
            total_revenue,
            active_memberships,
            top_libraries,
        })
    }

    async fn library_dashboard(
        &self,
        library_id: LibraryId,
        today: NaiveDate,
    ) -> AppResult<LibraryDashboard> {
        let seats = SeatRepositoryImpl::new(self.db.clone())
            .count_seats(library_id)
            .await?;

        let todays_bookings: i64 = sqlx::query_scalar(
            r#"
                SELECT COUNT(*) FROM seat_bookings
                WHERE library_id = $1 AND booking_date = $2 AND status <> 'CANCELLED'
            "#,
        )
        .bind(library_id)
        .bind(today)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let active_members: i64 = sqlx::query_scalar(
            r#"
                SELECT COUNT(*) FROM memberships
                WHERE library_id = $1 AND status = 'ACTIVE' AND end_date > NOW()
            "#,
        )
        .bind(library_id)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let total_revenue: i64 = sqlx::query_scalar(
            r#"
                SELECT COALESCE(SUM(amount), 0)::BIGINT FROM payments
                WHERE library_id = $1 AND status = 'COMPLETED'
            "#,
        )
        .bind(library_id)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(LibraryDashboard {
            total_seats: seats.total,
            available_seats: seats.available,
            todays_bookings,
            active_members,
            total_revenue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::booking::tests::seed;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn dashboard_counts_seats(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let f = seed(&pool).await?;
        let repo = AnalyticsRepositoryImpl::new(ConnectionPool::new(pool));

        let today = chrono::Utc::now().date_naive();
        let dashboard = repo.library_dashboard(f.library_id, today).await?;
        assert_eq!(dashboard.total_seats, 1);
        assert_eq!(dashboard.available_seats, 1);
        assert_eq!(dashboard.todays_bookings, 0);
        assert_eq!(dashboard.total_revenue, 0);

        let summary = repo.platform_summary().await?;
        assert_eq!(summary.libraries_by_status.len(), 1);
        assert_eq!(summary.libraries_by_status[0].status, "APPROVED");
        Ok(())
    }
}
