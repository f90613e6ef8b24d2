use crate::{
    extractor::{AppPath, AppQuery, AuthorizedUser, OptionalJson},
    handler::notification::send_in_background,
    model::{
        admin::{AdminLibraryListQuery, PlatformAnalyticsResponse, RejectLibraryRequest},
        library::LibraryResponse,
        pagination::{PaginatedResponse, PaginationQuery},
        response::ApiResponse,
    },
};
use axum::{
    extract::State,
    Json,
};
use garde::Validate;
use kernel::model::{
    id::LibraryId,
    library::{event::RejectLibrary, LibraryListOptions},
    mail::MailMessage,
};
use registry::AppRegistry;
use shared::error::AppResult;

pub async fn list_libraries(
    user: AuthorizedUser,
    AppQuery(page): AppQuery<PaginationQuery>,
    AppQuery(query): AppQuery<AdminLibraryListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<LibraryResponse>>>> {
    user.ensure_super_admin()?;
    page.validate(&())?;

    let options = LibraryListOptions {
        status: query.status,
        public_only: false,
        city: None,
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

pub async fn approve_library(
    user: AuthorizedUser,
    AppPath(library_id): AppPath<LibraryId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<LibraryResponse>>> {
    user.ensure_super_admin()?;

    let library = registry.library_repository().approve(library_id).await?;
    tracing::info!(library_id = %library_id, "library approved");
    send_in_background(&registry, MailMessage::library_approved(&library));

    Ok(Json(
        ApiResponse::ok(library.into()).with_message("library approved"),
    ))
}

pub async fn reject_library(
    user: AuthorizedUser,
    AppPath(library_id): AppPath<LibraryId>,
    State(registry): State<AppRegistry>,
    OptionalJson(req): OptionalJson<RejectLibraryRequest>,
) -> AppResult<Json<ApiResponse<LibraryResponse>>> {
    user.ensure_super_admin()?;
    req.validate(&())?;

    let library = registry
        .library_repository()
        .reject(RejectLibrary::new(library_id, req.reason))
        .await?;
    tracing::info!(library_id = %library_id, "library rejected");
    send_in_background(&registry, MailMessage::library_rejected(&library));

    Ok(Json(
        ApiResponse::ok(library.into()).with_message("library rejected"),
    ))
}

pub async fn show_analytics(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<PlatformAnalyticsResponse>>> {
    user.ensure_super_admin()?;

    registry
        .analytics_repository()
        .platform_summary()
        .await
        .map(PlatformAnalyticsResponse::from)
        .map(ApiResponse::ok)
        .map(Json)
}
