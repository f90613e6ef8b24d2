use crate::{
    extractor::{AppJson, AppPath, AppQuery, AuthenticatedIdentity, AuthorizedUser, OptionalUser},
    handler::notification::send_in_background,
    model::{
        admin::LibraryDashboardResponse,
        library::{
            LibraryListQuery, LibraryResponse, RegisterLibraryRequest, ReplaceOpeningHoursRequest,
            UpdateLibraryRequest,
        },
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
    id::LibraryId,
    library::{
        event::ReplaceOpeningHours, validate_opening_hours, Library, LibraryListOptions,
        OpeningHours,
    },
    mail::MailMessage,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub(crate) async fn fetch_library(registry: &AppRegistry, library_id: LibraryId) -> AppResult<Library> {
    registry
        .library_repository()
        .find_by_id(library_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("library ({library_id}) not found")))
}

pub async fn register_library(
    identity: AuthenticatedIdentity,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<RegisterLibraryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<LibraryResponse>>)> {
    req.validate(&())?;
    let event = req.into_event(identity.identity);
    validate_opening_hours(&event.opening_hours)?;

    let library = registry.library_repository().register(event).await?;
    tracing::info!(library_id = %library.library_id, "library registered");
    send_in_background(&registry, MailMessage::registration_received(&library));

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::ok(library.into())
                .with_message("registration received; awaiting approval"),
        ),
    ))
}

pub async fn list_libraries(
    AppQuery(page): AppQuery<PaginationQuery>,
    AppQuery(query): AppQuery<LibraryListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<LibraryResponse>>>> {
    page.validate(&())?;

    let options = LibraryListOptions {
        status: None,
        public_only: true,
        city: query.city,
        search: query.search,
        list: page.into(),
    };
    registry
        .library_repository()
        .find_all(options)
        .await
        .map(PaginatedResponse::from_list)
        .map(ApiResponse::ok)
        .map(Json)
}

// 承認前の図書館は所有者と管理者にだけ見せる
pub async fn show_library(
    viewer: OptionalUser,
    AppPath(library_id): AppPath<LibraryId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<LibraryResponse>>> {
    let library = fetch_library(&registry, library_id).await?;
    let visible = library.is_open_for_business()
        || viewer.0.as_ref().is_some_and(|u| {
            u.user_id == library.owner.owner_id || u.can_manage(library.library_id)
        });
    if !visible {
        return Err(AppError::EntityNotFound(format!(
            "library ({library_id}) not found"
        )));
    }
    Ok(Json(ApiResponse::ok(library.into())))
}

pub async fn show_my_library(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<LibraryResponse>>> {
    registry
        .library_repository()
        .find_by_owner(user.id())
        .await?
        .map(|library| Json(ApiResponse::ok(library.into())))
        .ok_or_else(|| AppError::EntityNotFound("you have not registered a library".into()))
}

pub async fn update_library(
    user: AuthorizedUser,
    AppPath(library_id): AppPath<LibraryId>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<UpdateLibraryRequest>,
) -> AppResult<Json<ApiResponse<LibraryResponse>>> {
    user.ensure_can_manage(library_id)?;
    req.validate(&())?;

    registry
        .library_repository()
        .update(req.into_event(library_id))
        .await?;
    let library = fetch_library(&registry, library_id).await?;
    Ok(Json(ApiResponse::ok(library.into())))
}

pub async fn replace_opening_hours(
    user: AuthorizedUser,
    AppPath(library_id): AppPath<LibraryId>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<ReplaceOpeningHoursRequest>,
) -> AppResult<Json<ApiResponse<LibraryResponse>>> {
    user.ensure_can_manage(library_id)?;
    req.validate(&())?;

    let opening_hours: Vec<OpeningHours> =
        req.opening_hours.into_iter().map(OpeningHours::from).collect();
    validate_opening_hours(&opening_hours)?;

    registry
        .library_repository()
        .replace_opening_hours(ReplaceOpeningHours::new(library_id, opening_hours))
        .await?;
    let library = fetch_library(&registry, library_id).await?;
    Ok(Json(ApiResponse::ok(library.into())))
}

pub async fn show_dashboard(
    user: AuthorizedUser,
    AppPath(library_id): AppPath<LibraryId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<LibraryDashboardResponse>>> {
    user.ensure_can_manage(library_id)?;

    registry
        .analytics_repository()
        .library_dashboard(library_id, Utc::now().date_naive())
        .await
        .map(LibraryDashboardResponse::from)
        .map(ApiResponse::ok)
        .map(Json)
}
