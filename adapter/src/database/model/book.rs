use chrono::{DateTime, Utc};
use kernel::model::{
    book::{Book, BookLoan, LoanBook},
    id::{BookId, LibraryId, LoanId, UserId},
};

#[derive(sqlx::FromRow)]
pub struct BookRow {
    pub book_id: BookId,
    pub library_id: LibraryId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(value: BookRow) -> Self {
        let BookRow {
            book_id,
            library_id,
            title,
            author,
            isbn,
            total_copies,
            available_copies,
            created_at,
        } = value;
        Book {
            book_id,
            library_id,
            title,
            author,
            isbn,
            total_copies,
            available_copies,
            created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct BookLoanRow {
    pub loan_id: LoanId,
    pub library_id: LibraryId,
    pub user_id: UserId,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub book_id: BookId,
    pub title: String,
    pub author: String,
}

impl From<BookLoanRow> for BookLoan {
    fn from(value: BookLoanRow) -> Self {
        let BookLoanRow {
            loan_id,
            library_id,
            user_id,
            borrowed_at,
            due_at,
            returned_at,
            book_id,
            title,
            author,
        } = value;
        BookLoan {
            loan_id,
            library_id,
            borrowed_by: user_id,
            borrowed_at,
            due_at,
            returned_at,
            book: LoanBook {
                book_id,
                title,
                author,
            },
        }
    }
}
