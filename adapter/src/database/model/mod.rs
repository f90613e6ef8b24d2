pub mod analytics;
pub mod auth;
pub mod book;
pub mod booking;
pub mod forum;
pub mod library;
pub mod membership;
pub mod seat;
pub mod user;

use shared::error::AppError;
use std::str::FromStr;

// DB に文字列で保存している列挙値を復元する
pub(crate) fn parse_enum<T: FromStr>(column: &str, value: &str) -> Result<T, AppError> {
    T::from_str(value).map_err(|_| {
        AppError::ConversionEntityError(format!("unexpected {column} value: {value}"))
    })
}
