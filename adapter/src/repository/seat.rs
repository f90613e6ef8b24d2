use crate::database::{
    map_write_error,
    model::seat::{SeatAvailabilityRow, SeatCountRow, SeatRow, SeatTypeRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        booking::BookingWindow,
        id::{LibraryId, SeatId, SeatTypeId},
        seat::{
            event::{
                CreateSeat, CreateSeatType, DeleteSeat, DeleteSeatType, UpdateSeat, UpdateSeatType,
            },
            Seat, SeatAvailability, SeatCount, SeatListOptions, SeatType,
        },
    },
    repository::seat::SeatRepository,
};
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct SeatRepositoryImpl {
    db: ConnectionPool,
}

const SEAT_TYPE_SELECT: &str = r#"
    SELECT seat_type_id, library_id, name, description, price_per_hour, amenities, color, created_at
    FROM seat_types
"#;

const SEAT_SELECT: &str = r#"
    SELECT
        s.seat_id,
        s.library_id,
        s.seat_number,
        s.is_available,
        s.is_active,
        st.seat_type_id,
        st.name AS seat_type_name,
        st.price_per_hour,
        st.color
    FROM seats AS s
    INNER JOIN seat_types AS st ON s.seat_type_id = st.seat_type_id
"#;

const DUPLICATE_SEAT_NUMBER: &str = "seat number is already used in this library";

impl SeatRepositoryImpl {
    // 座席種別が指定の図書館に属していることを確認する
    async fn ensure_seat_type_in_library(
        &self,
        library_id: LibraryId,
        seat_type_id: SeatTypeId,
    ) -> AppResult<()> {
        let found: Option<SeatTypeId> = sqlx::query_scalar(
            "SELECT seat_type_id FROM seat_types WHERE seat_type_id = $1 AND library_id = $2",
        )
        .bind(seat_type_id)
        .bind(library_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if found.is_none() {
            return Err(AppError::EntityNotFound(format!(
                "seat type ({seat_type_id}) not found in this library"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SeatRepository for SeatRepositoryImpl {
    async fn create_seat_type(&self, event: CreateSeatType) -> AppResult<SeatTypeId> {
        let seat_type_id = SeatTypeId::new();
        sqlx::query(
            r#"
                INSERT INTO seat_types
                (seat_type_id, library_id, name, description, price_per_hour, amenities, color)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(seat_type_id)
        .bind(event.library_id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.price_per_hour)
        .bind(&event.amenities)
        .bind(&event.color)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(seat_type_id)
    }

    async fn find_seat_types(&self, library_id: LibraryId) -> AppResult<Vec<SeatType>> {
        let rows = sqlx::query_as::<_, SeatTypeRow>(&format!(
            "{SEAT_TYPE_SELECT} WHERE library_id = $1 ORDER BY created_at ASC"
        ))
        .bind(library_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(SeatType::from).collect())
    }

    async fn find_seat_type_by_id(&self, seat_type_id: SeatTypeId) -> AppResult<Option<SeatType>> {
        let row = sqlx::query_as::<_, SeatTypeRow>(&format!(
            "{SEAT_TYPE_SELECT} WHERE seat_type_id = $1"
        ))
        .bind(seat_type_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(SeatType::from))
    }

    async fn update_seat_type(&self, event: UpdateSeatType) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE seat_types
                SET
                    name = COALESCE($3, name),
                    description = COALESCE($4, description),
                    price_per_hour = COALESCE($5, price_per_hour),
                    amenities = COALESCE($6, amenities),
                    color = COALESCE($7, color)
                WHERE seat_type_id = $1 AND library_id = $2
            "#,
        )
        .bind(event.seat_type_id)
        .bind(event.library_id)
        .bind(event.name)
        .bind(event.description)
        .bind(event.price_per_hour)
        .bind(event.amenities)
        .bind(event.color)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified seat type not found".into()));
        }
        Ok(())
    }

    async fn delete_seat_type(&self, event: DeleteSeatType) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let seats: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seats WHERE seat_type_id = $1")
            .bind(event.seat_type_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        if seats > 0 {
            return Err(AppError::BadRequest(format!(
                "seat type still has {seats} seat(s) assigned"
            )));
        }

        let res = sqlx::query("DELETE FROM seat_types WHERE seat_type_id = $1 AND library_id = $2")
            .bind(event.seat_type_id)
            .bind(event.library_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified seat type not found".into()));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }

    async fn create_seat(&self, event: CreateSeat) -> AppResult<SeatId> {
        self.ensure_seat_type_in_library(event.library_id, event.seat_type_id)
            .await?;

        let seat_id = SeatId::new();
        sqlx::query(
            r#"
                INSERT INTO seats (seat_id, library_id, seat_type_id, seat_number)
                VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(seat_id)
        .bind(event.library_id)
        .bind(event.seat_type_id)
        .bind(&event.seat_number)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_SEAT_NUMBER))?;

        Ok(seat_id)
    }

    async fn find_seats(&self, options: SeatListOptions) -> AppResult<Vec<Seat>> {
        let rows = sqlx::query_as::<_, SeatRow>(&format!(
            r#"{SEAT_SELECT}
                WHERE s.library_id = $1
                  AND ($2::uuid IS NULL OR s.seat_type_id = $2)
                  AND ($3::boolean IS NULL OR (s.is_available = $3 AND s.is_active))
                ORDER BY s.seat_number ASC
            "#
        ))
        .bind(options.library_id)
        .bind(options.seat_type_id)
        .bind(options.available)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Seat::from).collect())
    }

    async fn find_seat_by_id(&self, seat_id: SeatId) -> AppResult<Option<Seat>> {
        let row = sqlx::query_as::<_, SeatRow>(&format!("{SEAT_SELECT} WHERE s.seat_id = $1"))
            .bind(seat_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Seat::from))
    }

    async fn update_seat(&self, event: UpdateSeat) -> AppResult<()> {
        if let Some(seat_type_id) = event.seat_type_id {
            self.ensure_seat_type_in_library(event.library_id, seat_type_id)
                .await?;
        }

        let res = sqlx::query(
            r#"
                UPDATE seats
                SET
                    seat_type_id = COALESCE($3, seat_type_id),
                    seat_number = COALESCE($4, seat_number),
                    is_active = COALESCE($5, is_active)
                WHERE seat_id = $1 AND library_id = $2
            "#,
        )
        .bind(event.seat_id)
        .bind(event.library_id)
        .bind(event.seat_type_id)
        .bind(event.seat_number)
        .bind(event.is_active)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_SEAT_NUMBER))?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified seat not found".into()));
        }
        Ok(())
    }

    async fn delete_seat(&self, event: DeleteSeat) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // 確定済みの予約が残っている座席は削除できない
        let confirmed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM seat_bookings WHERE seat_id = $1 AND status = 'CONFIRMED'",
        )
        .bind(event.seat_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if confirmed > 0 {
            return Err(AppError::BadRequest(
                "seat has confirmed bookings; deactivate it instead".into(),
            ));
        }

        let res = sqlx::query("DELETE FROM seats WHERE seat_id = $1 AND library_id = $2")
            .bind(event.seat_id)
            .bind(event.library_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified seat not found".into()));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }

    async fn count_seats(&self, library_id: LibraryId) -> AppResult<SeatCount> {
        let row = sqlx::query_as::<_, SeatCountRow>(
            r#"
                SELECT
                    COUNT(*) FILTER (WHERE is_active) AS total,
                    COUNT(*) FILTER (WHERE is_active AND is_available) AS available
                FROM seats
                WHERE library_id = $1
            "#,
        )
        .bind(library_id)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(SeatCount {
            total: row.total,
            available: row.available,
        })
    }

    async fn find_availability(
        &self,
        library_id: LibraryId,
        window: BookingWindow,
    ) -> AppResult<Vec<SeatAvailability>> {
        let rows = sqlx::query_as::<_, SeatAvailabilityRow>(&format!(
            r#"
                SELECT * FROM (
                    {SEAT_SELECT}
                ) AS s
                CROSS JOIN LATERAL (
                    SELECT NOT EXISTS (
                        SELECT 1 FROM seat_bookings AS b
                        WHERE b.seat_id = s.seat_id
                          AND b.status = 'CONFIRMED'
                          AND b.booking_date = $2
                          AND b.start_time < $4
                          AND $3 < b.end_time
                    ) AS is_free
                ) AS f
                WHERE s.library_id = $1 AND s.is_active
                ORDER BY s.seat_number ASC
            "#
        ))
        .bind(library_id)
        .bind(window.date)
        .bind(window.start_time)
        .bind(window.end_time)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(SeatAvailability::from).collect())
    }
}
