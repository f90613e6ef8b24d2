pub mod analytics;
pub mod auth;
pub mod book;
pub mod booking;
pub mod forum;
pub mod health;
pub mod library;
pub mod membership;
pub mod seat;
pub mod user;
