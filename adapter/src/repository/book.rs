use crate::database::{
    like_pattern,
    model::book::{BookLoanRow, BookRow},
    set_transaction_serializable, ConnectionPool,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_new::new;
use kernel::{
    model::{
        book::{
            event::{BorrowBook, CreateBook, ReturnBook, UpdateBook},
            Book, BookListOptions, BookLoan,
        },
        id::{BookId, LibraryId, LoanId, UserId},
        list::PaginatedList,
    },
    repository::book::BookRepository,
};
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct BookRepositoryImpl {
    db: ConnectionPool,
}

const BOOK_SELECT: &str = r#"
    SELECT book_id, library_id, title, author, isbn, total_copies, available_copies, created_at
    FROM books
"#;

const LOAN_SELECT: &str = r#"
    SELECT
        bl.loan_id,
        bl.library_id,
        bl.user_id,
        bl.borrowed_at,
        bl.due_at,
        bl.returned_at,
        b.book_id,
        b.title,
        b.author
    FROM book_loans AS bl
    INNER JOIN books AS b ON bl.book_id = b.book_id
"#;

#[async_trait]
impl BookRepository for BookRepositoryImpl {
    async fn create(&self, event: CreateBook) -> AppResult<BookId> {
        let book_id = BookId::new();
        sqlx::query(
            r#"
                INSERT INTO books
                (book_id, library_id, title, author, isbn, total_copies, available_copies)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(book_id)
        .bind(event.library_id)
        .bind(&event.title)
        .bind(&event.author)
        .bind(&event.isbn)
        .bind(event.total_copies)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(book_id)
    }

    async fn find_all(&self, options: BookListOptions) -> AppResult<PaginatedList<Book>> {
        let BookListOptions {
            library_id,
            search,
            list,
        } = options;
        let pattern = like_pattern(&search);

        let total: i64 = sqlx::query_scalar(
            r#"
                SELECT COUNT(*) FROM books
                WHERE library_id = $1
                  AND ($2::text IS NULL OR title ILIKE $2 OR author ILIKE $2 OR isbn ILIKE $2)
            "#,
        )
        .bind(library_id)
        .bind(&pattern)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let rows = sqlx::query_as::<_, BookRow>(&format!(
            r#"{BOOK_SELECT}
                WHERE library_id = $1
                  AND ($2::text IS NULL OR title ILIKE $2 OR author ILIKE $2 OR isbn ILIKE $2)
                ORDER BY title ASC, created_at ASC
                LIMIT $3 OFFSET $4
            "#
        ))
        .bind(library_id)
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
            items: rows.into_iter().map(Book::from).collect(),
        })
    }

    async fn find_by_id(&self, book_id: BookId) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(&format!("{BOOK_SELECT} WHERE book_id = $1"))
            .bind(book_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Book::from))
    }

    async fn update(&self, event: UpdateBook) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let copies: Option<(i32, i32)> = sqlx::query_as(
            "SELECT total_copies, available_copies FROM books WHERE book_id = $1 FOR UPDATE",
        )
        .bind(event.book_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some((total, available)) = copies else {
            return Err(AppError::EntityNotFound("specified book not found".into()));
        };

        // 貸出中の冊数は蔵書数を変えても維持する
        let on_loan = total - available;
        let new_total = event.total_copies.unwrap_or(total);
        if new_total < on_loan {
            return Err(AppError::BadRequest(format!(
                "totalCopies cannot be less than the {on_loan} copies currently on loan"
            )));
        }

        sqlx::query(
            r#"
                UPDATE books
                SET
                    title = COALESCE($2, title),
                    author = COALESCE($3, author),
                    isbn = COALESCE($4, isbn),
                    total_copies = $5,
                    available_copies = $6
                WHERE book_id = $1
            "#,
        )
        .bind(event.book_id)
        .bind(event.title)
        .bind(event.author)
        .bind(event.isbn)
        .bind(new_total)
        .bind(new_total - on_loan)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }

    async fn delete(&self, book_id: BookId) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let open_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_loans WHERE book_id = $1 AND returned_at IS NULL",
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if open_loans > 0 {
            return Err(AppError::BadRequest(
                "book has copies on loan and cannot be deleted".into(),
            ));
        }

        let res = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified book not found".into()));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }

    async fn borrow(&self, event: BorrowBook) -> AppResult<LoanId> {
        let mut tx = self.db.begin().await?;
        set_transaction_serializable(&mut tx).await?;

        // ① 在庫があることを確認する
        let book: Option<(LibraryId, i32)> = sqlx::query_as(
            "SELECT library_id, available_copies FROM books WHERE book_id = $1 FOR UPDATE",
        )
        .bind(event.book_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some((library_id, available)) = book else {
            return Err(AppError::EntityNotFound(format!(
                "book ({}) not found",
                event.book_id
            )));
        };
        if available <= 0 {
            return Err(AppError::BadRequest(format!(
                "no copies of book ({}) are available",
                event.book_id
            )));
        }

        // ② 同じ本を返却せずに再度借りることはできない
        let borrowing: bool = sqlx::query_scalar(
            r#"
                SELECT EXISTS (
                    SELECT 1 FROM book_loans
                    WHERE book_id = $1 AND user_id = $2 AND returned_at IS NULL
                )
            "#,
        )
        .bind(event.book_id)
        .bind(event.borrowed_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if borrowing {
            return Err(AppError::BadRequest(
                "you have already borrowed this book".into(),
            ));
        }

        // ③ 在庫を減らして貸出を記録する
        sqlx::query("UPDATE books SET available_copies = available_copies - 1 WHERE book_id = $1")
            .bind(event.book_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        let loan_id = LoanId::new();
        sqlx::query(
            r#"
                INSERT INTO book_loans (loan_id, book_id, library_id, user_id, borrowed_at, due_at)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(loan_id)
        .bind(event.book_id)
        .bind(library_id)
        .bind(event.borrowed_by)
        .bind(event.borrowed_at)
        .bind(event.due_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(loan_id)
    }

    async fn find_loan_by_id(&self, loan_id: LoanId) -> AppResult<Option<BookLoan>> {
        let row = sqlx::query_as::<_, BookLoanRow>(&format!("{LOAN_SELECT} WHERE bl.loan_id = $1"))
            .bind(loan_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(BookLoan::from))
    }

    async fn return_loan(&self, event: ReturnBook) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let loan: Option<(BookId, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT book_id, returned_at FROM book_loans WHERE loan_id = $1 FOR UPDATE",
        )
        .bind(event.loan_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some((book_id, returned_at)) = loan else {
            return Err(AppError::EntityNotFound(format!(
                "loan ({}) not found",
                event.loan_id
            )));
        };
        if returned_at.is_some() {
            return Err(AppError::BadRequest(format!(
                "loan ({}) has already been returned",
                event.loan_id
            )));
        }

        sqlx::query("UPDATE book_loans SET returned_at = $2 WHERE loan_id = $1")
            .bind(event.loan_id)
            .bind(event.returned_at)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        sqlx::query(
            r#"
                UPDATE books
                SET available_copies = LEAST(available_copies + 1, total_copies)
                WHERE book_id = $1
            "#,
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }

    async fn find_loans_by_user(&self, user_id: UserId) -> AppResult<Vec<BookLoan>> {
        let rows = sqlx::query_as::<_, BookLoanRow>(&format!(
            r#"{LOAN_SELECT}
                WHERE bl.user_id = $1
                ORDER BY bl.returned_at IS NULL DESC, bl.borrowed_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(BookLoan::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::booking::tests::seed;
    use chrono::Duration;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn borrow_and_return_keep_copies_in_sync(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let f = seed(&pool).await?;
        let repo = BookRepositoryImpl::new(ConnectionPool::new(pool));

        let book_id = repo
            .create(CreateBook::new(
                f.library_id,
                "Zero To Production".into(),
                "Luca Palmieri".into(),
                "9798675236526".into(),
                1,
            ))
            .await?;

        let now = Utc::now();
        let loan_id = repo
            .borrow(BorrowBook::new(book_id, f.user_id, now, now + Duration::days(14)))
            .await?;
        assert_eq!(repo.find_by_id(book_id).await?.unwrap().available_copies, 0);

        // 在庫切れ
        assert!(matches!(
            repo.borrow(BorrowBook::new(book_id, f.user_id, now, now + Duration::days(14)))
                .await,
            Err(AppError::BadRequest(_))
        ));
        // 貸出中の本は削除できない
        assert!(matches!(repo.delete(book_id).await, Err(AppError::BadRequest(_))));

        repo.return_loan(ReturnBook::new(loan_id, Utc::now())).await?;
        assert_eq!(repo.find_by_id(book_id).await?.unwrap().available_copies, 1);
        assert!(matches!(
            repo.return_loan(ReturnBook::new(loan_id, Utc::now())).await,
            Err(AppError::BadRequest(_))
        ));

        let loans = repo.find_loans_by_user(f.user_id).await?;
        assert_eq!(loans.len(), 1);
        assert!(loans[0].returned_at.is_some());
        Ok(())
    }
}
