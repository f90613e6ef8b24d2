use axum::{
    extract::rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    DuplicateEntity(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("トランザクションを実行できませんでした。")]
    TransactionError(#[source] sqlx::Error),
    #[error("データベース処理実行中にエラーが発生しました。")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("No rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("{0}")]
    KeyValueStoreError(#[from] redis::RedisError),
    #[error("{0}")]
    ConversionEntityError(String),
    #[error("ログインが必要です。")]
    UnauthenticatedError,
    #[error("認証情報が誤っています。")]
    UnauthorizedError,
    #[error("許可されていない操作です。")]
    ForbiddenOperation,
    #[error("{0}")]
    ExternalServiceError(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_)
            | AppError::DuplicateEntity(_)
            | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::UnauthenticatedError | AppError::UnauthorizedError => {
                StatusCode::UNAUTHORIZED
            }
            AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::KeyValueStoreError(_)
            | AppError::ConversionEntityError(_)
            | AppError::ExternalServiceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::UnprocessableEntity(_) => "UnprocessableEntity",
            AppError::EntityNotFound(_) => "NotFound",
            AppError::BadRequest(_) => "BadRequest",
            AppError::DuplicateEntity(_) => "Duplicate",
            AppError::ValidationError(_) => "ValidationError",
            AppError::UnauthenticatedError | AppError::UnauthorizedError => "Unauthorized",
            AppError::ForbiddenOperation => "Forbidden",
            _ => "InternalServerError",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let message = if status_code.is_server_error() {
            tracing::error!(
                error.cause_chain = ?self,
                error.message = %self,
                "Unexpected error happened"
            );
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "success": false,
            "error": self.kind(),
            "message": message,
        }));

        (status_code, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

// リクエストの抽出に失敗した場合も共通のエラー形式で返す
macro_rules! bad_request_from_rejection {
    ($($rejection:ty),*) => {
        $(
            impl From<$rejection> for AppError {
                fn from(rejection: $rejection) -> Self {
                    AppError::BadRequest(rejection.body_text())
                }
            }
        )*
    };
}

bad_request_from_rejection!(JsonRejection, PathRejection, QueryRejection, BytesRejection);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::EntityNotFound("x".into()), StatusCode::NOT_FOUND)]
    #[case(AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST)]
    #[case(AppError::DuplicateEntity("x".into()), StatusCode::BAD_REQUEST)]
    #[case(AppError::UnauthenticatedError, StatusCode::UNAUTHORIZED)]
    #[case(AppError::ForbiddenOperation, StatusCode::FORBIDDEN)]
    #[case(AppError::NoRowsAffectedError("x".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(AppError::ExternalServiceError("x".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_mapping(#[case] err: AppError, #[case] expected: StatusCode) {
        assert_eq!(err.into_response().status(), expected);
    }

    #[tokio::test]
    async fn error_body_is_enveloped() {
        let res = AppError::DuplicateEntity("library name already exists".into()).into_response();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Duplicate");
        assert_eq!(body["message"], "library name already exists");
    }

    #[tokio::test]
    async fn internal_error_message_is_hidden() {
        let res = AppError::ExternalServiceError("smtp password rejected".into()).into_response();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Internal server error");
    }
}
