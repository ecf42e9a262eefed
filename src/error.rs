use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use tracing::error;

use crate::store::StoreError;

/// Request-level failure taxonomy. Everything except `Database` is a
/// recoverable, caller-visible validation failure; `Database` is the one
/// system-level class and surfaces as a 500.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    InvalidRequest(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    /// Lookup miss, expiry miss and already-consumed are deliberately
    /// indistinguishable to the caller.
    #[display(fmt = "Invalid or expired OTP")]
    InvalidOrExpiredCode,
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "Invalid credentials")]
    Unauthorized,
    #[display(fmt = "Insufficient permissions")]
    Forbidden,
    #[display(fmt = "Something went wrong, Contact with system admin")]
    Database(sqlx::Error),
}

impl ApiError {
    /// Stable machine-readable code carried in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InvalidOrExpiredCode => "INVALID_OR_EXPIRED_CODE",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::Database(_) => "INTERNAL",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::InvalidOrExpiredCode => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Database(e) = self {
            error!(error = %e, "database error");
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Database(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => ApiError::Conflict("Email already registered".into()),
            StoreError::Unavailable(e) => ApiError::Database(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::InvalidRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::InvalidOrExpiredCode.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn code_is_stable() {
        assert_eq!(ApiError::InvalidOrExpiredCode.code(), "INVALID_OR_EXPIRED_CODE");
        assert_eq!(ApiError::Unauthorized.code(), "UNAUTHORIZED");
    }

    #[test]
    fn duplicate_store_error_becomes_conflict() {
        let err: ApiError = StoreError::Duplicate.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn unauthorized_message_does_not_leak_cause() {
        // one message for "no such email" and "wrong password"
        assert_eq!(ApiError::Unauthorized.to_string(), "Invalid credentials");
    }
}
