use crate::model::id::LibraryId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryBookingCount {
    pub library_id: LibraryId,
    pub library_name: String,
    pub booking_count: i64,
}

/// Cross-tenant figures for the super-admin dashboard.
#[derive(Debug, Clone, Default)]
pub struct PlatformAnalytics {
    pub libraries_by_status: Vec<StatusCount>,
    pub users_by_role: Vec<StatusCount>,
    pub bookings_by_status: Vec<StatusCount>,
    pub total_revenue: i64,
    pub active_memberships: i64,
    pub top_libraries: Vec<LibraryBookingCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryDashboard {
    pub total_seats: i64,
    pub available_seats: i64,
    pub todays_bookings: i64,
    pub active_members: i64,
    pub total_revenue: i64,
}
