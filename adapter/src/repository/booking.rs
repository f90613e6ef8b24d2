use crate::database::{
    model::{
        booking::{BookableSeatRow, BookingRow},
        parse_enum,
    },
    set_transaction_serializable, ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        booking::{
            event::{CancelBooking, CompleteBooking, CreateBooking},
            BookingListOptions, BookingStatus, SeatBooking,
        },
        id::{BookingId, PaymentId, SeatId},
        list::PaginatedList,
    },
    repository::booking::BookingRepository,
};
use shared::error::{AppError, AppResult};
use sqlx::PgConnection;

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
}

const BOOKING_SELECT: &str = r#"
    SELECT
        b.booking_id,
        b.library_id,
        l.name AS library_name,
        u.user_id,
        u.name AS user_name,
        u.email AS user_email,
        s.seat_id,
        s.seat_number,
        st.name AS seat_type_name,
        b.booking_date,
        b.start_time,
        b.end_time,
        b.status,
        b.price,
        b.created_at,
        b.cancelled_at,
        p.payment_id,
        p.amount AS payment_amount,
        p.method AS payment_method,
        p.status AS payment_status,
        p.paid_at
    FROM seat_bookings AS b
    INNER JOIN libraries AS l ON b.library_id = l.library_id
    INNER JOIN users AS u ON b.user_id = u.user_id
    INNER JOIN seats AS s ON b.seat_id = s.seat_id
    INNER JOIN seat_types AS st ON s.seat_type_id = st.seat_type_id
    LEFT JOIN LATERAL (
        SELECT payment_id, amount, method, status, paid_at
        FROM payments
        WHERE payments.booking_id = b.booking_id
        ORDER BY paid_at DESC
        LIMIT 1
    ) AS p ON TRUE
"#;

const BOOKING_FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR b.user_id = $1)
      AND ($2::uuid IS NULL OR b.library_id = $2)
      AND ($3::text IS NULL OR b.status = $3)
      AND ($4::date IS NULL OR b.booking_date = $4)
"#;

// 予約を行ロックし、CONFIRMED であることを確認して座席 ID を返す
async fn lock_confirmed(conn: &mut PgConnection, booking_id: BookingId) -> AppResult<SeatId> {
    let row: Option<(String, SeatId)> = sqlx::query_as(
        "SELECT status, seat_id FROM seat_bookings WHERE booking_id = $1 FOR UPDATE",
    )
    .bind(booking_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(AppError::SpecificOperationError)?;

    let Some((status, seat_id)) = row else {
        return Err(AppError::EntityNotFound(format!(
            "booking ({booking_id}) not found"
        )));
    };
    let status: BookingStatus = parse_enum("booking status", &status)?;
    if status != BookingStatus::Confirmed {
        return Err(AppError::BadRequest(format!(
            "booking ({booking_id}) is already {status}"
        )));
    }
    Ok(seat_id)
}

// 他に CONFIRMED の予約が無ければ座席を空きに戻す
async fn release_seat(conn: &mut PgConnection, seat_id: SeatId) -> AppResult<()> {
    sqlx::query(
        r#"
            UPDATE seats
            SET is_available = TRUE
            WHERE seat_id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM seat_bookings
                  WHERE seat_id = $1 AND status = 'CONFIRMED'
              )
        "#,
    )
    .bind(seat_id)
    .execute(&mut *conn)
    .await
    .map_err(AppError::SpecificOperationError)?;
    Ok(())
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId> {
        let mut tx = self.db.begin().await?;
        set_transaction_serializable(&mut tx).await?;

        // ① 座席がこの図書館のもので、有効であることを確認する
        let seat = sqlx::query_as::<_, BookableSeatRow>(
            r#"
                SELECT s.seat_id, s.is_active, st.price_per_hour
                FROM seats AS s
                INNER JOIN seat_types AS st ON s.seat_type_id = st.seat_type_id
                WHERE s.seat_id = $1 AND s.library_id = $2
                FOR UPDATE OF s
            "#,
        )
        .bind(event.seat_id)
        .bind(event.library_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("seat ({}) not found in this library", event.seat_id))
        })?;

        if !seat.is_active {
            return Err(AppError::BadRequest(format!(
                "seat ({}) is not available for booking",
                seat.seat_id
            )));
        }

        // ② 同じ座席・同じ日付で時間帯が重なる CONFIRMED の予約が無いことを確認する
        let window = event.window;
        let overlapped: bool = sqlx::query_scalar(
            r#"
                SELECT EXISTS (
                    SELECT 1 FROM seat_bookings
                    WHERE seat_id = $1
                      AND status = 'CONFIRMED'
                      AND booking_date = $2
                      AND start_time < $4
                      AND $3 < end_time
                )
            "#,
        )
        .bind(event.seat_id)
        .bind(window.date)
        .bind(window.start_time)
        .bind(window.end_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if overlapped {
            return Err(AppError::BadRequest(
                "seat is already booked for the selected time".into(),
            ));
        }

        // ③ 予約を作成し、座席を使用中にする
        let booking_id = BookingId::new();
        let price = window.price(seat.price_per_hour);
        sqlx::query(
            r#"
                INSERT INTO seat_bookings
                (booking_id, user_id, seat_id, library_id, booking_date, start_time, end_time,
                 status, price, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, 'CONFIRMED', $8, $9)
            "#,
        )
        .bind(booking_id)
        .bind(event.booked_by)
        .bind(event.seat_id)
        .bind(event.library_id)
        .bind(window.date)
        .bind(window.start_time)
        .bind(window.end_time)
        .bind(price)
        .bind(event.booked_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        sqlx::query("UPDATE seats SET is_available = FALSE WHERE seat_id = $1")
            .bind(event.seat_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        // ④ 支払い方法が指定されていれば支払いを記録する
        if let Some(method) = event.payment_method {
            sqlx::query(
                r#"
                    INSERT INTO payments
                    (payment_id, user_id, library_id, booking_id, amount, method, status, paid_at)
                    VALUES ($1, $2, $3, $4, $5, $6, 'COMPLETED', $7)
                "#,
            )
            .bind(PaymentId::new())
            .bind(event.booked_by)
            .bind(event.library_id)
            .bind(booking_id)
            .bind(price)
            .bind(method.as_ref())
            .bind(event.booked_at)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(booking_id)
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<SeatBooking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "{BOOKING_SELECT} WHERE b.booking_id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.map(SeatBooking::try_from).transpose()
    }

    async fn find_all(
        &self,
        options: BookingListOptions,
    ) -> AppResult<PaginatedList<SeatBooking>> {
        let BookingListOptions {
            user_id,
            library_id,
            status,
            date,
            list,
        } = options;
        let status = status.map(|s| s.as_ref().to_string());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM seat_bookings AS b {BOOKING_FILTER}"
        ))
        .bind(user_id)
        .bind(library_id)
        .bind(&status)
        .bind(date)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"{BOOKING_SELECT} {BOOKING_FILTER}
                ORDER BY b.booking_date DESC, b.start_time DESC
                LIMIT $5 OFFSET $6
            "#
        ))
        .bind(user_id)
        .bind(library_id)
        .bind(&status)
        .bind(date)
        .bind(list.limit)
        .bind(list.offset)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let items = rows
            .into_iter()
            .map(SeatBooking::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedList {
            total,
            limit: list.limit,
            offset: list.offset,
            items,
        })
    }

    async fn cancel(&self, event: CancelBooking) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let seat_id = lock_confirmed(&mut tx, event.booking_id).await?;

        sqlx::query(
            r#"
                UPDATE seat_bookings
                SET status = 'CANCELLED', cancelled_at = $2
                WHERE booking_id = $1
            "#,
        )
        .bind(event.booking_id)
        .bind(event.cancelled_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        // 支払い済みであれば返金扱いにする
        sqlx::query(
            "UPDATE payments SET status = 'REFUNDED' WHERE booking_id = $1 AND status = 'COMPLETED'",
        )
        .bind(event.booking_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        release_seat(&mut tx, seat_id).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }

    async fn complete(&self, event: CompleteBooking) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let seat_id = lock_confirmed(&mut tx, event.booking_id).await?;

        sqlx::query("UPDATE seat_bookings SET status = 'COMPLETED' WHERE booking_id = $1")
            .bind(event.booking_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        release_seat(&mut tx, seat_id).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use kernel::model::{
        booking::{BookingWindow, PaymentMethod, PaymentStatus},
        id::{LibraryId, UserId},
    };

    pub(crate) struct Fixture {
        pub user_id: UserId,
        pub library_id: LibraryId,
        pub seat_id: SeatId,
    }

    // テスト用に承認済みの図書館・座席種別・座席を直接作成する
    pub(crate) async fn seed(pool: &sqlx::PgPool) -> anyhow::Result<Fixture> {
        let user_id = UserId::new();
        let library_id = LibraryId::new();
        let seat_id = SeatId::new();
        let seat_type_id = uuid::Uuid::new_v4();

        sqlx::query("INSERT INTO users (user_id, external_id, name, email) VALUES ($1, 'ext', 'Member', 'member@example.com')")
            .bind(user_id)
            .execute(pool)
            .await?;
        sqlx::query(
            r#"INSERT INTO libraries (library_id, owner_id, name, address, city, phone, email, status, is_active)
               VALUES ($1, $2, 'Central', '1 Main St', 'Springfield', '000', 'central@example.com', 'APPROVED', TRUE)"#,
        )
        .bind(library_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        sqlx::query("INSERT INTO seat_types (seat_type_id, library_id, name, price_per_hour) VALUES ($1, $2, 'Desk', 5000)")
            .bind(seat_type_id)
            .bind(library_id)
            .execute(pool)
            .await?;
        sqlx::query("INSERT INTO seats (seat_id, library_id, seat_type_id, seat_number) VALUES ($1, $2, $3, 'A-1')")
            .bind(seat_id)
            .bind(library_id)
            .bind(seat_type_id)
            .execute(pool)
            .await?;

        Ok(Fixture {
            user_id,
            library_id,
            seat_id,
        })
    }

    fn window(start: u32, end: u32) -> BookingWindow {
        BookingWindow::new(
            NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
            NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn overlapping_booking_is_rejected(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let f = seed(&pool).await?;
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        let booking_id = repo
            .create(CreateBooking::new(
                f.library_id,
                f.seat_id,
                f.user_id,
                window(9, 11),
                Some(PaymentMethod::Card),
                Utc::now(),
            ))
            .await?;

        let res = repo
            .create(CreateBooking::new(
                f.library_id,
                f.seat_id,
                f.user_id,
                window(10, 12),
                None,
                Utc::now(),
            ))
            .await;
        assert!(matches!(res, Err(AppError::BadRequest(_))));

        // 隣接する時間帯は重複しない
        repo.create(CreateBooking::new(
            f.library_id,
            f.seat_id,
            f.user_id,
            window(11, 12),
            None,
            Utc::now(),
        ))
        .await?;

        let booking = repo.find_by_id(booking_id).await?.unwrap();
        assert_eq!(booking.price, 10000);
        assert_eq!(
            booking.payment.map(|p| p.status),
            Some(PaymentStatus::Completed)
        );
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn cancel_refunds_and_frees_the_window(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let f = seed(&pool).await?;
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        let booking_id = repo
            .create(CreateBooking::new(
                f.library_id,
                f.seat_id,
                f.user_id,
                window(9, 11),
                Some(PaymentMethod::Cash),
                Utc::now(),
            ))
            .await?;
        repo.cancel(CancelBooking::new(booking_id, Utc::now())).await?;

        let booking = repo.find_by_id(booking_id).await?.unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(
            booking.payment.map(|p| p.status),
            Some(PaymentStatus::Refunded)
        );

        // キャンセル済みの予約は再度キャンセルできない
        assert!(matches!(
            repo.cancel(CancelBooking::new(booking_id, Utc::now())).await,
            Err(AppError::BadRequest(_))
        ));

        // 同じ時間帯を再度予約できる
        repo.create(CreateBooking::new(
            f.library_id,
            f.seat_id,
            f.user_id,
            window(9, 11),
            None,
            Utc::now(),
        ))
        .await?;
        Ok(())
    }
}
