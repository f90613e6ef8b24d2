use crate::model::{
    id::{BookId, LibraryId, LoanId, UserId},
    list::ListOptions,
};
use chrono::{DateTime, Utc};

pub mod event;

#[derive(Debug, Clone)]
pub struct Book {
    pub book_id: BookId,
    pub library_id: LibraryId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BookLoan {
    pub loan_id: LoanId,
    pub library_id: LibraryId,
    pub borrowed_by: UserId,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub book: LoanBook,
}

impl BookLoan {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.returned_at.is_none() && self.due_at < now
    }
}

#[derive(Debug, Clone)]
pub struct LoanBook {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
}

#[derive(Debug)]
pub struct BookListOptions {
    pub library_id: LibraryId,
    pub search: Option<String>,
    pub list: ListOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn overdue_only_when_open_and_past_due() {
        let now = Utc::now();
        let mut loan = BookLoan {
            loan_id: LoanId::new(),
            library_id: LibraryId::new(),
            borrowed_by: UserId::new(),
            borrowed_at: now - Duration::days(20),
            due_at: now - Duration::days(6),
            returned_at: None,
            book: LoanBook {
                book_id: BookId::new(),
                title: "Rust in Action".into(),
                author: "T. McNamara".into(),
            },
        };
        assert!(loan.is_overdue(now));

        loan.returned_at = Some(now);
        assert!(!loan.is_overdue(now));
    }
}
