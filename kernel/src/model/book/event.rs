use crate::model::id::{BookId, LibraryId, LoanId, UserId};
use chrono::{DateTime, Utc};
use derive_new::new;

#[derive(Debug, new)]
pub struct CreateBook {
    pub library_id: LibraryId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub total_copies: i32,
}

#[derive(Debug)]
pub struct UpdateBook {
    pub book_id: BookId,
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub total_copies: Option<i32>,
}

#[derive(Debug, new)]
pub struct BorrowBook {
    pub book_id: BookId,
    pub borrowed_by: UserId,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

#[derive(Debug, new)]
pub struct ReturnBook {
    pub loan_id: LoanId,
    pub returned_at: DateTime<Utc>,
}
