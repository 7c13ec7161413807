//! Device identity policy for time-series queries.
//!
//! Registered hives write their readings tagged with their hive code, so
//! queries filter on that tag. One legacy prototype device was deployed
//! before per-device tagging existed; its readings carry no tag and can only
//! be selected by measurement name. That device is identified by an exact
//! match on a reserved hive code — never by auto-detecting a missing tag.

/// Reserved hive code of the untagged legacy device.
pub const PROTOTYPE_HIVE_CODE: &str = "PROTOTIPO_001";

/// Channels the prototype hardware emits. Fixed list, independent of the
/// registry; the lowercase gyro keys predate the catalog's casing.
pub const PROTOTYPE_CHANNELS: &[&str] =
    &["temperatura_BMP280", "humidity", "peso", "gx", "gy", "gz"];

/// How a data query identifies the device it reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceIdentity {
    /// Filter rows by the `hive_code` tag.
    ScopedToHive(String),
    /// No tag filter. Only valid for the legacy prototype; rows from other
    /// devices sharing the bucket may match.
    Untagged,
}

impl DeviceIdentity {
    pub fn is_untagged(&self) -> bool {
        matches!(self, DeviceIdentity::Untagged)
    }
}
