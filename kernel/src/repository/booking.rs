use crate::model::{
    booking::{
        event::{CancelBooking, CompleteBooking, CreateBooking},
        BookingListOptions, SeatBooking,
    },
    id::BookingId,
    list::PaginatedList,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "test-util", mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    // 重複チェック・予約作成・座席更新・支払い記録を行う
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId>;
    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<SeatBooking>>;
    async fn find_all(&self, options: BookingListOptions)
        -> AppResult<PaginatedList<SeatBooking>>;
    async fn cancel(&self, event: CancelBooking) -> AppResult<()>;
    async fn complete(&self, event: CompleteBooking) -> AppResult<()>;
}
