pub mod analytics;
pub mod auth;
pub mod book;
pub mod booking;
pub mod forum;
pub mod id;
pub mod library;
pub mod list;
pub mod mail;
pub mod membership;
pub mod role;
pub mod seat;
pub mod user;
