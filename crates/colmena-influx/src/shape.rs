//! Shapes raw Flux rows into the two payload forms the UI consumes.
//!
//! Pure transformations over already-authorized, already-scoped rows. No
//! authorization or channel logic belongs here.

use std::collections::HashMap;

use colmena_types::api::{HistoryPoint, LatestPoint};

use crate::client::FluxRow;

/// Latest value per channel. Channels with no rows are absent from the map,
/// never null-valued. If a channel somehow yields several rows, the last one
/// in store order wins.
pub fn shape_latest(rows: &[FluxRow]) -> HashMap<String, LatestPoint> {
    let mut latest = HashMap::new();
    for row in rows {
        latest.insert(
            row.measurement.clone(),
            LatestPoint {
                value: row.value,
                time: row.time,
            },
        );
    }
    latest
}

/// History points in store order. No re-sorting, no gap filling — consumers
/// must tolerate irregular timestamps across channels.
pub fn shape_history(rows: Vec<FluxRow>) -> Vec<HistoryPoint> {
    rows.into_iter()
        .map(|row| HistoryPoint {
            channel: row.measurement,
            value: row.value,
            time: row.time,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row(measurement: &str, value: f64, minute: u32) -> FluxRow {
        FluxRow {
            measurement: measurement.to_string(),
            value,
            time: Utc.with_ymd_and_hms(2024, 5, 30, 12, minute, 0).unwrap(),
        }
    }

    #[test]
    fn latest_keeps_one_entry_per_channel() {
        let rows = vec![row("peso", 33.5, 0), row("humidity", 64.2, 5), row("peso", 33.9, 10)];
        let latest = shape_latest(&rows);

        assert_eq!(latest.len(), 2);
        assert_eq!(latest["peso"].value, 33.9);
        assert_eq!(latest["humidity"].value, 64.2);
    }

    #[test]
    fn latest_of_empty_is_empty() {
        assert!(shape_latest(&[]).is_empty());
    }

    #[test]
    fn reshaping_latest_output_changes_nothing() {
        let rows = vec![row("peso", 33.5, 0), row("humidity", 64.2, 5)];
        let once = shape_latest(&rows);

        // Feed the shaped map back through as rows; the result is identical.
        let as_rows: Vec<FluxRow> = once
            .iter()
            .map(|(channel, p)| FluxRow {
                measurement: channel.clone(),
                value: p.value,
                time: p.time,
            })
            .collect();
        let twice = shape_latest(&as_rows);
        assert_eq!(once, twice);
    }

    #[test]
    fn history_preserves_store_order() {
        let rows = vec![row("peso", 33.5, 0), row("humidity", 64.2, 5), row("peso", 33.9, 10)];
        let history = shape_history(rows);

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].channel, "peso");
        assert_eq!(history[1].channel, "humidity");
        assert_eq!(history[2].value, 33.9);
    }
}
