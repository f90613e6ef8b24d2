use crate::model::{
    analytics::{LibraryDashboard, PlatformAnalytics},
    id::LibraryId,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::AppResult;

#[cfg_attr(feature = "test-util", mockall::automock)]
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn platform_summary(&self) -> AppResult<PlatformAnalytics>;
    async fn library_dashboard(
        &self,
        library_id: LibraryId,
        today: NaiveDate,
    ) -> AppResult<LibraryDashboard>;
}
