//! InfluxDB v2 query client.
//!
//! Talks to `/api/v2/query` over HTTP, submitting Flux and reading the CSV
//! response back into [`FluxRow`]s. The store is an opaque collaborator:
//! this client never retries, and every failure surfaces as [`InfluxError`]
//! for the caller to map.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum InfluxError {
    #[error("influxdb request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("influxdb returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("unexpected influxdb response: {0}")]
    Malformed(String),
}

/// One data row out of a Flux query. Only the columns the shaper needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FluxRow {
    pub measurement: String,
    pub value: f64,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

pub struct InfluxClient {
    http: reqwest::Client,
    url: String,
    token: String,
    org: String,
    pub bucket: String,
}

impl InfluxClient {
    pub fn new(config: InfluxConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: config.url.trim_end_matches('/').to_string(),
            token: config.token,
            org: config.org,
            bucket: config.bucket,
        }
    }

    /// Runs a Flux query and returns its data rows. The caller's timeout or
    /// cancellation propagates through the awaited request.
    pub async fn query(&self, flux: &str) -> Result<Vec<FluxRow>, InfluxError> {
        debug!(flux, "running influx query");

        let response = self
            .http
            .post(format!("{}/api/v2/query", self.url))
            .query(&[("org", self.org.as_str())])
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/csv")
            .json(&serde_json::json!({
                "query": flux,
                "type": "flux",
                "dialect": { "header": true, "annotations": [] },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InfluxError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_query_csv(&body)
    }

    /// Connectivity probe, run once at startup.
    pub async fn ping(&self) -> Result<(), InfluxError> {
        let response = self
            .http
            .get(format!("{}/health", self.url))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InfluxError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Parses the CSV a Flux query returns (header dialect, no annotations).
/// Each yielded table starts with its own header line; blank lines separate
/// tables. Rows missing the needed columns are malformed, not skipped —
/// silently dropping data would be indistinguishable from an empty result.
fn parse_query_csv(body: &str) -> Result<Vec<FluxRow>, InfluxError> {
    let mut rows = Vec::new();
    let mut columns: Option<Columns> = None;

    for line in body.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            // table boundary; next non-empty line is a header
            columns = None;
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        match &columns {
            None => columns = Some(Columns::from_header(&fields)?),
            Some(cols) => rows.push(cols.parse_row(&fields)?),
        }
    }

    Ok(rows)
}

struct Columns {
    measurement: usize,
    value: usize,
    time: usize,
}

impl Columns {
    fn from_header(fields: &[&str]) -> Result<Columns, InfluxError> {
        let index = |name: &str| {
            fields
                .iter()
                .position(|f| *f == name)
                .ok_or_else(|| InfluxError::Malformed(format!("missing column '{}'", name)))
        };
        Ok(Columns {
            measurement: index("_measurement")?,
            value: index("_value")?,
            time: index("_time")?,
        })
    }

    fn parse_row(&self, fields: &[&str]) -> Result<FluxRow, InfluxError> {
        let field = |i: usize| {
            fields
                .get(i)
                .copied()
                .ok_or_else(|| InfluxError::Malformed(format!("row too short: {:?}", fields)))
        };

        let value = field(self.value)?
            .parse::<f64>()
            .map_err(|e| InfluxError::Malformed(format!("bad _value: {}", e)))?;
        let time = field(self.time)?
            .parse::<DateTime<Utc>>()
            .map_err(|e| InfluxError::Malformed(format!("bad _time: {}", e)))?;

        Ok(FluxRow {
            measurement: field(self.measurement)?.to_string(),
            value,
            time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_table() {
        let csv = "\
,result,table,_start,_stop,_time,_value,_field,_measurement,hive_code\r
,latest_data,0,2024-05-01T00:00:00Z,2024-05-31T00:00:00Z,2024-05-30T12:00:00Z,33.5,value,peso,H1\r
,latest_data,1,2024-05-01T00:00:00Z,2024-05-31T00:00:00Z,2024-05-30T12:05:00Z,64.2,value,humidity,H1\r
";
        let rows = parse_query_csv(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].measurement, "peso");
        assert_eq!(rows[0].value, 33.5);
        assert_eq!(rows[1].measurement, "humidity");
        assert_eq!(rows[1].time, "2024-05-30T12:05:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn parses_multiple_tables_with_repeated_headers() {
        let csv = "\
,result,table,_time,_value,_measurement
,history_data,0,2024-05-30T12:00:00Z,33.5,peso

,result,table,_time,_value,_measurement
,history_data,1,2024-05-30T13:00:00Z,34.1,peso
";
        let rows = parse_query_csv(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].value, 34.1);
    }

    #[test]
    fn empty_body_yields_no_rows() {
        assert!(parse_query_csv("").unwrap().is_empty());
        assert!(parse_query_csv("\r\n\r\n").unwrap().is_empty());
    }

    #[test]
    fn missing_columns_are_an_error() {
        let csv = ",result,table,_time,_value\n,x,0,2024-05-30T12:00:00Z,1.0\n";
        assert!(matches!(
            parse_query_csv(csv),
            Err(InfluxError::Malformed(_))
        ));
    }

    #[test]
    fn bad_value_is_an_error() {
        let csv = "\
,result,table,_time,_value,_measurement
,x,0,2024-05-30T12:00:00Z,not-a-number,peso
";
        assert!(matches!(
            parse_query_csv(csv),
            Err(InfluxError::Malformed(_))
        ));
    }
}
