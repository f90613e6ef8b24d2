pub mod admin;
pub mod book;
pub mod booking;
pub mod forum;
pub mod library;
pub mod membership;
pub mod pagination;
pub mod response;
pub mod seat;
pub mod time;
pub mod user;
