//! Request error taxonomy and its HTTP rendering.
//!
//! Expected conditions (not found, forbidden, bad input) render with their
//! own messages. Store failures are logged with diagnostic context and
//! rendered as a generic 500 — the body never leaks query or connection
//! detail.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use colmena_db::DbError;
use colmena_influx::InfluxError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("hive '{0}' not found")]
    HiveNotFound(String),
    #[error("not authorized, token missing or invalid")]
    Unauthorized,
    #[error("you do not have access to this hive")]
    Forbidden,
    #[error("hive '{0}' exists but has no active sensors configured")]
    NoActiveSensors(String),
    #[error("unknown time range '{0}'")]
    InvalidRange(String),
    #[error("hive code '{0}' is already registered")]
    DuplicateHiveCode(String),
    #[error("email is already registered")]
    EmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("failed to query sensor data")]
    TimeSeries(#[from] InfluxError),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::DuplicateHiveCode(code) => ApiError::DuplicateHiveCode(code),
            DbError::HiveNotFound(code) => ApiError::HiveNotFound(code),
            DbError::EmailTaken(_) => ApiError::EmailTaken,
            DbError::UserNotFound(_) => ApiError::UserNotFound,
            other => ApiError::Internal(other.into()),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::HiveNotFound(_) | ApiError::NoActiveSensors(_) | ApiError::UserNotFound => {
                StatusCode::NOT_FOUND
            }
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::InvalidRange(_)
            | ApiError::DuplicateHiveCode(_)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::EmailTaken => StatusCode::CONFLICT,
            ApiError::TimeSeries(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::TimeSeries(e) => error!(error = %e, "time-series query failed"),
            ApiError::Internal(e) => error!(error = ?e, "internal error"),
            _ => {}
        }
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_conditions_map_to_client_statuses() {
        assert_eq!(ApiError::HiveNotFound("H1".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::NoActiveSensors("H1".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::InvalidRange("9d".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmailTaken.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn store_failures_are_internal() {
        let err = ApiError::TimeSeries(InfluxError::Malformed("x".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn db_errors_translate() {
        let err: ApiError = DbError::DuplicateHiveCode("H1".into()).into();
        assert!(matches!(err, ApiError::DuplicateHiveCode(code) if code == "H1"));
        let err: ApiError = DbError::LockPoisoned.into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
