use crate::{
    extractor::{AppJson, AppPath, AppQuery, AuthorizedUser},
    model::{
        book::{BookListQuery, BookResponse, CreateBookRequest, LoanResponse, UpdateBookRequest},
        pagination::{PaginatedResponse, PaginationQuery},
        response::ApiResponse,
    },
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use garde::Validate;
use kernel::model::{
    book::{
        event::{BorrowBook, ReturnBook},
        Book, BookListOptions, BookLoan,
    },
    id::{BookId, LibraryId, LoanId},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

async fn fetch_book(registry: &AppRegistry, book_id: BookId) -> AppResult<Book> {
    registry
        .book_repository()
        .find_by_id(book_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("book ({book_id}) not found")))
}

async fn fetch_loan(registry: &AppRegistry, loan_id: LoanId) -> AppResult<BookLoan> {
    registry
        .book_repository()
        .find_loan_by_id(loan_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("loan ({loan_id}) not found")))
}

pub async fn list_books(
    AppPath(library_id): AppPath<LibraryId>,
    AppQuery(page): AppQuery<PaginationQuery>,
    AppQuery(query): AppQuery<BookListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<BookResponse>>>> {
    page.validate(&())?;

    let options = BookListOptions {
        library_id,
        search: query.search,
        list: page.into(),
    };
    registry
        .book_repository()
        .find_all(options)
        .await
        .map(PaginatedResponse::from_list)
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn create_book(
    user: AuthorizedUser,
    AppPath(library_id): AppPath<LibraryId>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<CreateBookRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BookResponse>>)> {
    user.ensure_can_manage(library_id)?;
    req.validate(&())?;

    let book_id = registry
        .book_repository()
        .create(req.into_event(library_id))
        .await?;
    let book = fetch_book(&registry, book_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(book.into()))))
}

pub async fn show_book(
    AppPath(book_id): AppPath<BookId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<BookResponse>>> {
    fetch_book(&registry, book_id)
        .await
        .map(BookResponse::from)
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn update_book(
    user: AuthorizedUser,
    AppPath(book_id): AppPath<BookId>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<UpdateBookRequest>,
) -> AppResult<Json<ApiResponse<BookResponse>>> {
    let book = fetch_book(&registry, book_id).await?;
    user.ensure_can_manage(book.library_id)?;
    req.validate(&())?;

    registry
        .book_repository()
        .update(req.into_event(book_id))
        .await?;
    let book = fetch_book(&registry, book_id).await?;
    Ok(Json(ApiResponse::ok(book.into())))
}

pub async fn delete_book(
    user: AuthorizedUser,
    AppPath(book_id): AppPath<BookId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<()>>> {
    let book = fetch_book(&registry, book_id).await?;
    user.ensure_can_manage(book.library_id)?;

    registry.book_repository().delete(book_id).await?;
    Ok(Json(ApiResponse::ok(()).with_message("book deleted")))
}

pub async fn borrow_book(
    user: AuthorizedUser,
    AppPath(book_id): AppPath<BookId>,
    State(registry): State<AppRegistry>,
) -> AppResult<(StatusCode, Json<ApiResponse<LoanResponse>>)> {
    let now = Utc::now();
    let due_at = now + Duration::days(registry.loan_period_days());

    let loan_id = registry
        .book_repository()
        .borrow(BorrowBook::new(book_id, user.id(), now, due_at))
        .await?;
    let loan = fetch_loan(&registry, loan_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(loan.into()))))
}

pub async fn return_loan(
    user: AuthorizedUser,
    AppPath(loan_id): AppPath<LoanId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<LoanResponse>>> {
    let loan = fetch_loan(&registry, loan_id).await?;
    if loan.borrowed_by != user.id() {
        user.ensure_can_manage(loan.library_id)?;
    }

    registry
        .book_repository()
        .return_loan(ReturnBook::new(loan_id, Utc::now()))
        .await?;
    let loan = fetch_loan(&registry, loan_id).await?;
    Ok(Json(ApiResponse::ok(loan.into()).with_message("book returned")))
}

pub async fn list_my_loans(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<Vec<LoanResponse>>>> {
    registry
        .book_repository()
        .find_loans_by_user(user.id())
        .await
        .map(|loans| loans.into_iter().map(LoanResponse::from).collect())
        .map(ApiResponse::ok)
        .map(Json)
}
