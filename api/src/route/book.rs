use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::book::{
    borrow_book, create_book, delete_book, list_books, list_my_loans, return_loan, show_book,
    update_book,
};

pub fn build_book_routers() -> Router<AppRegistry> {
    let books_routers = Router::new()
        .route("/:book_id", get(show_book))
        .route("/:book_id", put(update_book))
        .route("/:book_id", delete(delete_book))
        .route("/:book_id/borrow", post(borrow_book));
    let loans_routers = Router::new()
        .route("/mine", get(list_my_loans))
        .route("/:loan_id/return", post(return_loan));

    Router::new()
        .route("/libraries/:library_id/books", get(list_books))
        .route("/libraries/:library_id/books", post(create_book))
        .nest("/books", books_routers)
        .nest("/loans", loans_routers)
}
