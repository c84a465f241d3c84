use axum::extract::FromRequest;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::authentication::TokenError;
use crate::repositories::RepositoryError;
use crate::routes::constants::{
    ERROR_ADMIN_REQUIRED, ERROR_ALREADY_SUBSCRIBED, ERROR_AUTHENTICATION_REQUIRED,
    ERROR_INVALID_CREDENTIALS, ERROR_SOMETHING_WENT_WRONG,
};
use crate::telemetry::error_chain_fmt;

/// Every failure a handler can report. The `Display` text is what the
/// client sees, except for `UnexpectedError` which stays opaque.
#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("{}", ERROR_AUTHENTICATION_REQUIRED)]
    Unauthenticated,
    #[error("{}", ERROR_INVALID_CREDENTIALS)]
    InvalidCredentials,
    #[error("{}", ERROR_ADMIN_REQUIRED)]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    /// Unique key violation reported as a bad request.
    #[error("{0}")]
    Duplicate(String),
    #[error("{}", ERROR_ALREADY_SUBSCRIBED)]
    AlreadySubscribed,
    /// The image host failed; carries its message.
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidToken
            | ApiError::TokenExpired
            | ApiError::Duplicate(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadySubscribed => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::UnexpectedError(_) => {
                tracing::error!(error.cause_chain = ?self, "Internal server error");
                json!({ "success": false, "error": ERROR_SOMETHING_WENT_WRONG })
            }
            ApiError::AlreadySubscribed => json!({
                "success": false,
                "alreadySubscribed": true,
                "error": self.to_string(),
            }),
            _ => {
                if status.is_server_error() {
                    tracing::error!(error = %self, "Upstream request failed");
                } else {
                    tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
                }
                json!({ "success": false, "error": self.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::Invalid(_) => ApiError::InvalidToken,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Duplicate(field) => ApiError::Duplicate(format!("{} already exists", field)),
            RepositoryError::UnexpectedError(e) => ApiError::UnexpectedError(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(rejection.body_text()),
            _ => ApiError::Validation(rejection.body_text()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        match e.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(e.body_text()),
            _ => ApiError::Validation(e.body_text()),
        }
    }
}

/// `Json` whose rejections use the API error body and a 400 status.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
