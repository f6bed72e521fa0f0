use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::ExchangeError;

/// API-level error: status code plus a `{ error, code }` JSON body.
/// 401 responses additionally carry `WWW-Authenticate: ApiKey`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn not_found(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    pub fn conflict(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, code, message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "internal server error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
        };
        let mut response = (self.status, Json(body)).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("ApiKey"));
        }
        response
    }
}

impl From<ExchangeError> for ApiError {
    fn from(err: ExchangeError) -> Self {
        let message = err.to_string();
        match err {
            ExchangeError::UnknownTicker(_) => Self::not_found("TICKER_NOT_FOUND", message),
            ExchangeError::UnknownOrder(_) => Self::not_found("ORDER_NOT_FOUND", message),
            ExchangeError::UnknownAccount(_) => Self::not_found("ACCOUNT_NOT_FOUND", message),
            ExchangeError::InvalidQuantity => Self::bad_request("INVALID_QUANTITY", message),
            ExchangeError::InvalidPrice => Self::bad_request("INVALID_PRICE", message),
            ExchangeError::InvalidCash => Self::bad_request("INVALID_CASH", message),
            ExchangeError::InvalidShares => Self::bad_request("INVALID_SHARES", message),
            ExchangeError::InsufficientShares { .. } => {
                Self::bad_request("INSUFFICIENT_SHARES", message)
            }
            ExchangeError::InsufficientFunds { .. } => {
                Self::bad_request("INSUFFICIENT_FUNDS", message)
            }
            ExchangeError::NotCancellable(_) => {
                Self::bad_request("ORDER_NOT_CANCELLABLE", message)
            }
            ExchangeError::DuplicateTicker(_) => Self::conflict("DUPLICATE_TICKER", message),
            ExchangeError::DuplicateAccount(_) => Self::conflict("DUPLICATE_ACCOUNT", message),
            ExchangeError::Database(err) => {
                tracing::error!("storage failure: {err}");
                Self::internal()
            }
        }
    }
}
