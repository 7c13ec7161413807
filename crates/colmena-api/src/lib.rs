pub mod admin;
pub mod auth;
pub mod authz;
pub mod data;
pub mod error;
pub mod hives;
pub mod middleware;
pub mod resolver;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use crate::error::ApiError;

/// Run blocking registry work off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("spawn_blocking join error: {}", e)))?
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Parse as naive UTC and convert; fall back to RFC 3339 first in case a
/// row was written with an explicit offset.
pub(crate) fn parse_db_time(s: &str) -> DateTime<Utc> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", s, e);
            DateTime::default()
        })
}
