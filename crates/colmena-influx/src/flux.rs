//! Flux query construction.
//!
//! Pure string building — execution and its failures live in the client.
//! Every value interpolated into a query is either whitelisted
//! (`HistoryRange`) or escaped (`flux_string`), so no caller-supplied text
//! reaches the query language raw.

use colmena_types::device::DeviceIdentity;

/// Tag registered devices write their hive code under.
const HIVE_CODE_TAG: &str = "hive_code";

/// Lookback for "latest value per channel". Fixed on purpose: the most
/// recent reading must not move with the history chart's range selector.
const LATEST_LOOKBACK: &str = "-30d";

/// Whitelisted history window. Parsing rejects anything else, which keeps
/// arbitrary request strings out of the Flux source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryRange {
    H6,
    D1,
    #[default]
    D7,
    D30,
    D60,
}

impl HistoryRange {
    pub fn parse(token: &str) -> Option<HistoryRange> {
        match token {
            "6h" => Some(HistoryRange::H6),
            "1d" => Some(HistoryRange::D1),
            "7d" => Some(HistoryRange::D7),
            "30d" => Some(HistoryRange::D30),
            "60d" => Some(HistoryRange::D60),
            _ => None,
        }
    }

    fn flux_start(self) -> &'static str {
        match self {
            HistoryRange::H6 => "-6h",
            HistoryRange::D1 => "-1d",
            HistoryRange::D7 => "-7d",
            HistoryRange::D30 => "-30d",
            HistoryRange::D60 => "-60d",
        }
    }
}

/// Most recent point per channel.
pub fn latest_query(bucket: &str, channels: &[String], identity: &DeviceIdentity) -> String {
    format!(
        "from(bucket: \"{bucket}\")\n\
         \x20 |> range(start: {start})\n\
         {device}\
         \x20 |> filter(fn: (r) => {channels})\n\
         \x20 |> filter(fn: (r) => r._field == \"value\")\n\
         \x20 |> last()\n\
         \x20 |> yield(name: \"latest_data\")",
        bucket = flux_string(bucket),
        start = LATEST_LOOKBACK,
        device = device_filter(identity),
        channels = measurement_filter(channels),
    )
}

/// Hourly-mean history over the requested window. Empty buckets are dropped,
/// not zero-filled.
pub fn history_query(
    bucket: &str,
    channels: &[String],
    range: HistoryRange,
    identity: &DeviceIdentity,
) -> String {
    format!(
        "from(bucket: \"{bucket}\")\n\
         \x20 |> range(start: {start})\n\
         {device}\
         \x20 |> filter(fn: (r) => {channels})\n\
         \x20 |> filter(fn: (r) => r._field == \"value\")\n\
         \x20 |> aggregateWindow(every: 1h, fn: mean, createEmpty: false)\n\
         \x20 |> yield(name: \"history_data\")",
        bucket = flux_string(bucket),
        start = range.flux_start(),
        device = device_filter(identity),
        channels = measurement_filter(channels),
    )
}

/// OR-filter over measurement names. An empty channel set yields the literal
/// `false` so the query matches nothing — never the whole bucket.
fn measurement_filter(channels: &[String]) -> String {
    if channels.is_empty() {
        return "false".to_string();
    }
    channels
        .iter()
        .map(|c| format!("r._measurement == \"{}\"", flux_string(c)))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Tag filter line for a scoped device; nothing for the untagged prototype.
fn device_filter(identity: &DeviceIdentity) -> String {
    match identity {
        DeviceIdentity::ScopedToHive(code) => format!(
            "\x20 |> filter(fn: (r) => r.{HIVE_CODE_TAG} == \"{}\")\n",
            flux_string(code)
        ),
        DeviceIdentity::Untagged => String::new(),
    }
}

fn flux_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn range_tokens_are_whitelisted() {
        assert_eq!(HistoryRange::parse("6h"), Some(HistoryRange::H6));
        assert_eq!(HistoryRange::parse("7d"), Some(HistoryRange::D7));
        assert_eq!(HistoryRange::parse("60d"), Some(HistoryRange::D60));
        assert_eq!(HistoryRange::parse("-7d"), None);
        assert_eq!(HistoryRange::parse("365d"), None);
        assert_eq!(HistoryRange::parse("7d) |> drop()"), None);
        assert_eq!(HistoryRange::default(), HistoryRange::D7);
    }

    #[test]
    fn scoped_query_filters_by_hive_tag() {
        let q = latest_query(
            "sensores",
            &channels(&["peso"]),
            &DeviceIdentity::ScopedToHive("H1".into()),
        );
        assert!(q.contains("from(bucket: \"sensores\")"));
        assert!(q.contains("r.hive_code == \"H1\""));
        assert!(q.contains("r._measurement == \"peso\""));
        assert!(q.contains("range(start: -30d)"));
        assert!(q.contains("|> last()"));
    }

    #[test]
    fn untagged_query_has_no_device_filter() {
        let q = latest_query("sensores", &channels(&["peso"]), &DeviceIdentity::Untagged);
        assert!(!q.contains("hive_code"));
    }

    #[test]
    fn empty_channels_match_nothing() {
        let latest = latest_query("sensores", &[], &DeviceIdentity::Untagged);
        assert!(latest.contains("filter(fn: (r) => false)"));
        assert!(!latest.contains("_measurement =="));

        let history = history_query(
            "sensores",
            &[],
            HistoryRange::D7,
            &DeviceIdentity::ScopedToHive("H1".into()),
        );
        assert!(history.contains("filter(fn: (r) => false)"));
    }

    #[test]
    fn history_query_downsamples_hourly() {
        let q = history_query(
            "sensores",
            &channels(&["humidity", "peso"]),
            HistoryRange::D30,
            &DeviceIdentity::ScopedToHive("H1".into()),
        );
        assert!(q.contains("range(start: -30d)"));
        assert!(q.contains("r._measurement == \"humidity\" or r._measurement == \"peso\""));
        assert!(q.contains("aggregateWindow(every: 1h, fn: mean, createEmpty: false)"));
    }

    #[test]
    fn quotes_in_interpolated_values_are_escaped() {
        let q = latest_query(
            "sensores",
            &channels(&["peso"]),
            &DeviceIdentity::ScopedToHive("H1\" or true".into()),
        );
        assert!(q.contains("r.hive_code == \"H1\\\" or true\""));
    }
}
