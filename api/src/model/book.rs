use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    book::{
        event::{CreateBook, UpdateBook},
        Book, BookLoan,
    },
    id::{BookId, LibraryId, LoanId, UserId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    #[garde(length(min = 1, max = 512))]
    pub title: String,
    #[garde(length(min = 1, max = 255))]
    pub author: String,
    #[garde(length(min = 1, max = 32))]
    pub isbn: String,
    #[garde(range(min = 1))]
    pub total_copies: i32,
}

impl CreateBookRequest {
    pub fn into_event(self, library_id: LibraryId) -> CreateBook {
        let CreateBookRequest {
            title,
            author,
            isbn,
            total_copies,
        } = self;
        CreateBook::new(library_id, title, author, isbn, total_copies)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    #[garde(inner(length(min = 1, max = 512)))]
    pub title: Option<String>,
    #[garde(inner(length(min = 1, max = 255)))]
    pub author: Option<String>,
    #[garde(inner(length(min = 1, max = 32)))]
    pub isbn: Option<String>,
    #[garde(inner(range(min = 0)))]
    pub total_copies: Option<i32>,
}

impl UpdateBookRequest {
    pub fn into_event(self, book_id: BookId) -> UpdateBook {
        let UpdateBookRequest {
            title,
            author,
            isbn,
            total_copies,
        } = self;
        UpdateBook {
            book_id,
            title,
            author,
            isbn,
            total_copies,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BookListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: BookId,
    pub library_id: LibraryId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(value: Book) -> Self {
        let Book {
            book_id,
            library_id,
            title,
            author,
            isbn,
            total_copies,
            available_copies,
            created_at,
        } = value;
        Self {
            id: book_id,
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanBookResponse {
    pub id: BookId,
    pub title: String,
    pub author: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResponse {
    pub id: LoanId,
    pub library_id: LibraryId,
    pub borrowed_by: UserId,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub overdue: bool,
    pub book: LoanBookResponse,
}

impl From<BookLoan> for LoanResponse {
    fn from(value: BookLoan) -> Self {
        let overdue = value.is_overdue(Utc::now());
        let BookLoan {
            loan_id,
            library_id,
            borrowed_by,
            borrowed_at,
            due_at,
            returned_at,
            book,
        } = value;
        Self {
            id: loan_id,
            library_id,
            borrowed_by,
            borrowed_at,
            due_at,
            returned_at,
            overdue,
            book: LoanBookResponse {
                id: book.book_id,
                title: book.title,
                author: book.author,
            },
        }
    }
}
