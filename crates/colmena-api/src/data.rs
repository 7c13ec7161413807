//! The sensor-data endpoint: the one place the relational registry and the
//! time-series store meet.
//!
//! Per request: authorize → resolve channels → query latest + history →
//! shape → respond. Both time-series reads must succeed; a failure of either
//! fails the whole request rather than returning a payload with one side
//! silently empty.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use colmena_influx::FluxRow;
use colmena_influx::flux::{self, HistoryRange};
use colmena_influx::shape;
use colmena_types::api::{Claims, HiveDataResponse};

use crate::auth::AppState;
use crate::authz::{self, Caller};
use crate::error::ApiError;
use crate::resolver::{self, ChannelScope, ResolvedDevice};
use crate::run_blocking;

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    pub range: Option<String>,
}

pub async fn hive_data(
    State(state): State<AppState>,
    Path(hive_code): Path<String>,
    Query(query): Query<DataQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<HiveDataResponse>, ApiError> {
    let range = match query.range {
        Some(token) => {
            HistoryRange::parse(&token).ok_or_else(|| ApiError::InvalidRange(token))?
        }
        None => HistoryRange::default(),
    };

    let scope = resolve_authorized(&state, &hive_code, Caller::from(&claims)).await?;

    // Decided before any store query: a hive with nothing configured is a
    // distinct condition, not a reason to run Flux.
    ensure_active_channels(&hive_code, &scope)?;

    let latest_flux = flux::latest_query(&state.influx.bucket, &scope.channels, &scope.identity);
    let history_flux =
        flux::history_query(&state.influx.bucket, &scope.channels, range, &scope.identity);

    // Atomic-or-nothing: either sub-query failing fails the combined read.
    let latest_rows = state.influx.query(&latest_flux).await?;
    let history_rows = state.influx.query(&history_flux).await?;

    Ok(Json(assemble_payload(hive_code, scope, &latest_rows, history_rows)))
}

/// Channel scope for a caller. The prototype sentinel has no registry row
/// and no owner, so any authenticated caller may read it; registered hives
/// go through the ownership check.
async fn resolve_authorized(
    state: &AppState,
    hive_code: &str,
    caller: Caller,
) -> Result<ChannelScope, ApiError> {
    let state = state.clone();
    let code = hive_code.to_string();
    run_blocking(move || match resolver::resolve(&state.db, &code)? {
        ResolvedDevice::Prototype(scope) => Ok(scope),
        ResolvedDevice::Registered { hive, scope } => {
            if !authz::can_read(&caller, &hive) {
                return Err(ApiError::Forbidden);
            }
            Ok(scope)
        }
    })
    .await
}

/// The "found but nothing configured" gate.
fn ensure_active_channels(hive_code: &str, scope: &ChannelScope) -> Result<(), ApiError> {
    if scope.channels.is_empty() {
        return Err(ApiError::NoActiveSensors(hive_code.to_string()));
    }
    Ok(())
}

/// Pure payload assembly. Zero rows is a success: empty latest map, empty
/// history list, with the active sensor set still reported.
fn assemble_payload(
    hive_code: String,
    scope: ChannelScope,
    latest_rows: &[FluxRow],
    history_rows: Vec<FluxRow>,
) -> HiveDataResponse {
    HiveDataResponse {
        hive_code,
        active_sensors: scope.channels,
        latest: shape::shape_latest(latest_rows),
        history: shape::shape_history(history_rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use colmena_types::device::DeviceIdentity;

    fn scope(channels: &[&str]) -> ChannelScope {
        ChannelScope {
            channels: channels.iter().map(|s| s.to_string()).collect(),
            identity: DeviceIdentity::ScopedToHive("H1".to_string()),
        }
    }

    #[test]
    fn zero_rows_assemble_into_an_empty_success_payload() {
        let payload = assemble_payload(
            "H1".to_string(),
            scope(&["temperatura_BMP280", "humidity"]),
            &[],
            vec![],
        );

        assert_eq!(payload.hive_code, "H1");
        assert_eq!(payload.active_sensors, vec!["temperatura_BMP280", "humidity"]);
        assert!(payload.latest.is_empty());
        assert!(payload.history.is_empty());
    }

    #[test]
    fn rows_populate_latest_and_history() {
        let time = Utc.with_ymd_and_hms(2024, 5, 30, 12, 0, 0).unwrap();
        let rows = vec![FluxRow {
            measurement: "peso".to_string(),
            value: 33.5,
            time,
        }];

        let payload = assemble_payload("H1".to_string(), scope(&["peso"]), &rows, rows.clone());

        assert_eq!(payload.latest["peso"].value, 33.5);
        assert_eq!(payload.history.len(), 1);
        assert_eq!(payload.history[0].channel, "peso");
        assert_eq!(payload.history[0].time, time);
    }

    #[test]
    fn empty_channel_set_is_no_active_sensors() {
        let err = ensure_active_channels("H1", &scope(&[])).unwrap_err();
        assert!(matches!(err, ApiError::NoActiveSensors(code) if code == "H1"));

        assert!(ensure_active_channels("H1", &scope(&["peso"])).is_ok());
    }
}
