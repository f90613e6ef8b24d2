use crate::{
    extractor::{AppJson, AppPath, AppQuery, AuthorizedUser},
    handler::library::fetch_library,
    model::{
        response::ApiResponse,
        seat::{
            AvailabilityQuery, CreateSeatRequest, CreateSeatTypeRequest, SeatListQuery,
            SeatResponse, SeatTypeResponse, UpdateSeatRequest, UpdateSeatTypeRequest,
        },
    },
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    booking::BookingWindow,
    id::{LibraryId, SeatId, SeatTypeId},
    seat::{
        event::{DeleteSeat, DeleteSeatType},
        Seat, SeatListOptions, SeatType,
    },
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

async fn fetch_seat_type(registry: &AppRegistry, seat_type_id: SeatTypeId) -> AppResult<SeatType> {
    registry
        .seat_repository()
        .find_seat_type_by_id(seat_type_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("seat type ({seat_type_id}) not found")))
}

async fn fetch_seat(registry: &AppRegistry, seat_id: SeatId) -> AppResult<Seat> {
    registry
        .seat_repository()
        .find_seat_by_id(seat_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("seat ({seat_id}) not found")))
}

pub async fn list_seat_types(
    AppPath(library_id): AppPath<LibraryId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<Vec<SeatTypeResponse>>>> {
    registry
        .seat_repository()
        .find_seat_types(library_id)
        .await
        .map(|types| types.into_iter().map(SeatTypeResponse::from).collect())
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn create_seat_type(
    user: AuthorizedUser,
    AppPath(library_id): AppPath<LibraryId>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<CreateSeatTypeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SeatTypeResponse>>)> {
    user.ensure_can_manage(library_id)?;
    req.validate(&())?;

    let seat_type_id = registry
        .seat_repository()
        .create_seat_type(req.into_event(library_id))
        .await?;
    let seat_type = fetch_seat_type(&registry, seat_type_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(seat_type.into()))))
}

pub async fn update_seat_type(
    user: AuthorizedUser,
    AppPath((library_id, seat_type_id)): AppPath<(LibraryId, SeatTypeId)>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<UpdateSeatTypeRequest>,
) -> AppResult<Json<ApiResponse<SeatTypeResponse>>> {
    user.ensure_can_manage(library_id)?;
    req.validate(&())?;

    registry
        .seat_repository()
        .update_seat_type(req.into_event(library_id, seat_type_id))
        .await?;
    let seat_type = fetch_seat_type(&registry, seat_type_id).await?;
    Ok(Json(ApiResponse::ok(seat_type.into())))
}

pub async fn delete_seat_type(
    user: AuthorizedUser,
    AppPath((library_id, seat_type_id)): AppPath<(LibraryId, SeatTypeId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.ensure_can_manage(library_id)?;

    registry
        .seat_repository()
        .delete_seat_type(DeleteSeatType::new(library_id, seat_type_id))
        .await?;
    Ok(Json(ApiResponse::ok(()).with_message("seat type deleted")))
}

pub async fn list_seats(
    AppPath(library_id): AppPath<LibraryId>,
    AppQuery(query): AppQuery<SeatListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<Vec<SeatResponse>>>> {
    let options = SeatListOptions {
        library_id,
        seat_type_id: query.seat_type_id,
        available: query.available,
    };
    registry
        .seat_repository()
        .find_seats(options)
        .await
        .map(|seats| seats.into_iter().map(SeatResponse::from).collect())
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn create_seat(
    user: AuthorizedUser,
    AppPath(library_id): AppPath<LibraryId>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<CreateSeatRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SeatResponse>>)> {
    user.ensure_can_manage(library_id)?;
    req.validate(&())?;

    let seat_id = registry
        .seat_repository()
        .create_seat(req.into_event(library_id))
        .await?;
    let seat = fetch_seat(&registry, seat_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(seat.into()))))
}

pub async fn update_seat(
    user: AuthorizedUser,
    AppPath((library_id, seat_id)): AppPath<(LibraryId, SeatId)>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<UpdateSeatRequest>,
) -> AppResult<Json<ApiResponse<SeatResponse>>> {
    user.ensure_can_manage(library_id)?;
    req.validate(&())?;

    registry
        .seat_repository()
        .update_seat(req.into_event(library_id, seat_id))
        .await?;
    let seat = fetch_seat(&registry, seat_id).await?;
    Ok(Json(ApiResponse::ok(seat.into())))
}

pub async fn delete_seat(
    user: AuthorizedUser,
    AppPath((library_id, seat_id)): AppPath<(LibraryId, SeatId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.ensure_can_manage(library_id)?;

    registry
        .seat_repository()
        .delete_seat(DeleteSeat::new(library_id, seat_id))
        .await?;
    Ok(Json(ApiResponse::ok(()).with_message("seat deleted")))
}

pub async fn show_availability(
    AppPath(library_id): AppPath<LibraryId>,
    AppQuery(query): AppQuery<AvailabilityQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<Vec<SeatResponse>>>> {
    let window = BookingWindow::new(query.date, query.start_time, query.end_time)?;
    // 公開されていない図書館は存在しないものとして扱う
    let library = fetch_library(&registry, library_id).await?;
    if !library.is_open_for_business() {
        return Err(AppError::EntityNotFound(format!(
            "library ({library_id}) not found"
        )));
    }

    registry
        .seat_repository()
        .find_availability(library_id, window)
        .await
        .map(|seats| seats.into_iter().map(SeatResponse::from).collect())
        .map(ApiResponse::ok)
        .map(Json)
}
