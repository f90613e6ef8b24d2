use crate::model::{
    book::{
        event::{BorrowBook, CreateBook, ReturnBook, UpdateBook},
        Book, BookListOptions, BookLoan,
    },
    id::{BookId, LoanId, UserId},
    list::PaginatedList,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "test-util", mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn create(&self, event: CreateBook) -> AppResult<BookId>;
    async fn find_all(&self, options: BookListOptions) -> AppResult<PaginatedList<Book>>;
    async fn find_by_id(&self, book_id: BookId) -> AppResult<Option<Book>>;
    async fn update(&self, event: UpdateBook) -> AppResult<()>;
    async fn delete(&self, book_id: BookId) -> AppResult<()>;

    async fn borrow(&self, event: BorrowBook) -> AppResult<LoanId>;
    async fn find_loan_by_id(&self, loan_id: LoanId) -> AppResult<Option<BookLoan>>;
    async fn return_loan(&self, event: ReturnBook) -> AppResult<()>;
    async fn find_loans_by_user(&self, user_id: UserId) -> AppResult<Vec<BookLoan>>;
}
