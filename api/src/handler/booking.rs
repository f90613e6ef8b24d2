use crate::{
    extractor::{AppJson, AppPath, AppQuery, AuthorizedUser},
    handler::library::fetch_library,
    model::{
        booking::{BookingListQuery, BookingResponse, CreateBookingRequest},
        pagination::{PaginatedResponse, PaginationQuery},
        response::ApiResponse,
    },
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use garde::Validate;
use kernel::model::{
    booking::{
        event::{CancelBooking, CompleteBooking, CreateBooking},
        BookingListOptions, SeatBooking,
    },
    id::{BookingId, LibraryId},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

async fn fetch_booking(registry: &AppRegistry, booking_id: BookingId) -> AppResult<SeatBooking> {
    registry
        .booking_repository()
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("booking ({booking_id}) not found")))
}

pub async fn create_booking(
    user: AuthorizedUser,
    AppPath(library_id): AppPath<LibraryId>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BookingResponse>>)> {
    req.validate(&())?;
    let now = Utc::now();
    let window = req.window()?;
    window.ensure_not_past(now.date_naive())?;

    // 承認済みで、開館時間内の予約であること
    let library = fetch_library(&registry, library_id).await?;
    if !library.is_open_for_business() {
        return Err(AppError::BadRequest(format!(
            "library ({library_id}) is not accepting bookings"
        )));
    }
    library.accepts(&window)?;

    let booking_id = registry
        .booking_repository()
        .create(CreateBooking::new(
            library_id,
            req.seat_id,
            user.id(),
            window,
            req.payment_method,
            now,
        ))
        .await?;
    tracing::info!(booking_id = %booking_id, library_id = %library_id, "booking created");
    let booking = fetch_booking(&registry, booking_id).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(booking.into()))))
}

pub async fn list_my_bookings(
    user: AuthorizedUser,
    AppQuery(page): AppQuery<PaginationQuery>,
    AppQuery(query): AppQuery<BookingListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<BookingResponse>>>> {
    page.validate(&())?;

    let options = BookingListOptions {
        user_id: Some(user.id()),
        library_id: None,
        status: query.status,
        date: query.date,
        list: page.into(),
    };
    registry
        .booking_repository()
        .find_all(options)
        .await
        .map(PaginatedResponse::from_list)
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn list_library_bookings(
    user: AuthorizedUser,
    AppPath(library_id): AppPath<LibraryId>,
    AppQuery(page): AppQuery<PaginationQuery>,
    AppQuery(query): AppQuery<BookingListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<BookingResponse>>>> {
    user.ensure_can_manage(library_id)?;
    page.validate(&())?;

    let options = BookingListOptions {
        user_id: None,
        library_id: Some(library_id),
        status: query.status,
        date: query.date,
        list: page.into(),
    };
    registry
        .booking_repository()
        .find_all(options)
        .await
        .map(PaginatedResponse::from_list)
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn cancel_booking(
    user: AuthorizedUser,
    AppPath(booking_id): AppPath<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<BookingResponse>>> {
    let booking = fetch_booking(&registry, booking_id).await?;
    if booking.user.user_id != user.id() {
        user.ensure_can_manage(booking.library_id)?;
    }
    booking.ensure_confirmed()?;

    registry
        .booking_repository()
        .cancel(CancelBooking::new(booking_id, Utc::now()))
        .await?;
    tracing::info!(booking_id = %booking_id, "booking cancelled");
    let booking = fetch_booking(&registry, booking_id).await?;
    Ok(Json(
        ApiResponse::ok(booking.into()).with_message("booking cancelled"),
    ))
}

pub async fn complete_booking(
    user: AuthorizedUser,
    AppPath(booking_id): AppPath<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<BookingResponse>>> {
    let booking = fetch_booking(&registry, booking_id).await?;
    user.ensure_can_manage(booking.library_id)?;
    booking.ensure_confirmed()?;

    registry
        .booking_repository()
        .complete(CompleteBooking::new(booking_id))
        .await?;
    let booking = fetch_booking(&registry, booking_id).await?;
    Ok(Json(
        ApiResponse::ok(booking.into()).with_message("booking completed"),
    ))
}
