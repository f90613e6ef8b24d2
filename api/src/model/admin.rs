use garde::Validate;
use kernel::model::{
    analytics::{LibraryBookingCount, LibraryDashboard, PlatformAnalytics, StatusCount},
    id::LibraryId,
    library::LibraryStatus,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLibraryListQuery {
    pub status: Option<LibraryStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RejectLibraryRequest {
    #[garde(inner(length(max = 1000)))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountResponse {
    pub status: String,
    pub count: i64,
}

impl From<StatusCount> for StatusCountResponse {
    fn from(value: StatusCount) -> Self {
        let StatusCount { status, count } = value;
        Self { status, count }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLibraryResponse {
    pub library_id: LibraryId,
    pub library_name: String,
    pub booking_count: i64,
}

impl From<LibraryBookingCount> for TopLibraryResponse {
    fn from(value: LibraryBookingCount) -> Self {
        let LibraryBookingCount {
            library_id,
            library_name,
            booking_count,
        } = value;
        Self {
            library_id,
            library_name,
            booking_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAnalyticsResponse {
    pub libraries_by_status: Vec<StatusCountResponse>,
    pub users_by_role: Vec<StatusCountResponse>,
    pub bookings_by_status: Vec<StatusCountResponse>,
    pub total_revenue: i64,
    pub active_memberships: i64,
    pub top_libraries: Vec<TopLibraryResponse>,
}

fn counts(values: Vec<StatusCount>) -> Vec<StatusCountResponse> {
    values.into_iter().map(Into::into).collect()
}

impl From<PlatformAnalytics> for PlatformAnalyticsResponse {
    fn from(value: PlatformAnalytics) -> Self {
        let PlatformAnalytics {
            libraries_by_status,
            users_by_role,
            bookings_by_status,
            total_revenue,
            active_memberships,
            top_libraries,
        } = value;
        Self {
            libraries_by_status: counts(libraries_by_status),
            users_by_role: counts(users_by_role),
            bookings_by_status: counts(bookings_by_status),
            total_revenue,
            active_memberships,
            top_libraries: top_libraries.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDashboardResponse {
    pub total_seats: i64,
    pub available_seats: i64,
    pub todays_bookings: i64,
    pub active_members: i64,
    pub total_revenue: i64,
}

impl From<LibraryDashboard> for LibraryDashboardResponse {
    fn from(value: LibraryDashboard) -> Self {
        let LibraryDashboard {
            total_seats,
            available_seats,
            todays_bookings,
            active_members,
            total_revenue,
        } = value;
        Self {
            total_seats,
            available_seats,
            todays_bookings,
            active_members,
            total_revenue,
        }
    }
}
