use crate::model::{
    booking::BookingWindow,
    id::{LibraryId, SeatId, SeatTypeId},
    seat::{
        event::{CreateSeat, CreateSeatType, DeleteSeat, DeleteSeatType, UpdateSeat, UpdateSeatType},
        Seat, SeatAvailability, SeatCount, SeatListOptions, SeatType,
    },
};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "test-util", mockall::automock)]
#[async_trait]
pub trait SeatRepository: Send + Sync {
    async fn create_seat_type(&self, event: CreateSeatType) -> AppResult<SeatTypeId>;
    async fn find_seat_types(&self, library_id: LibraryId) -> AppResult<Vec<SeatType>>;
    async fn find_seat_type_by_id(&self, seat_type_id: SeatTypeId) -> AppResult<Option<SeatType>>;
    async fn update_seat_type(&self, event: UpdateSeatType) -> AppResult<()>;
    // 座席が残っている座席種別は削除できない
    async fn delete_seat_type(&self, event: DeleteSeatType) -> AppResult<()>;

    async fn create_seat(&self, event: CreateSeat) -> AppResult<SeatId>;
    async fn find_seats(&self, options: SeatListOptions) -> AppResult<Vec<Seat>>;
    async fn find_seat_by_id(&self, seat_id: SeatId) -> AppResult<Option<Seat>>;
    async fn update_seat(&self, event: UpdateSeat) -> AppResult<()>;
    async fn delete_seat(&self, event: DeleteSeat) -> AppResult<()>;

    async fn count_seats(&self, library_id: LibraryId) -> AppResult<SeatCount>;
    // 指定時間帯の CONFIRMED 予約と重複しない座席を空きとして返す
    async fn find_availability(
        &self,
        library_id: LibraryId,
        window: BookingWindow,
    ) -> AppResult<Vec<SeatAvailability>>;
}
