use shared::error::{AppError, AppResult};

pub trait RedisKey {
    type Value: RedisValue + TryFrom<String, Error = AppError>;

    fn inner(&self) -> String;
}

pub trait RedisValue {
    fn inner(&self) -> String;
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(value: &str) -> AppResult<T> {
    serde_json::from_str(value).map_err(|e| AppError::ConversionEntityError(e.to_string()))
}
