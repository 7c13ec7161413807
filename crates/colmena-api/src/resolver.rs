//! Channel resolution: from a hive code to the set of sensor channels a data
//! query may touch, plus the device identity the query builder must use.
//!
//! The legacy prototype sentinel is checked here and only here, before any
//! registry lookup, so a registry row that happens to share its code can
//! never shadow (or widen) the fixed fallback behavior.

use colmena_db::models::HiveRow;
use colmena_db::{Database, DbError};
use colmena_types::device::{DeviceIdentity, PROTOTYPE_CHANNELS, PROTOTYPE_HIVE_CODE};

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct ChannelScope {
    pub channels: Vec<String>,
    pub identity: DeviceIdentity,
}

/// Outcome of resolving a hive code. Registered devices carry their registry
/// row so the caller can run its ownership check; the prototype has no row
/// and no owner.
#[derive(Debug)]
pub enum ResolvedDevice {
    Prototype(ChannelScope),
    Registered { hive: HiveRow, scope: ChannelScope },
}

impl ResolvedDevice {
    pub fn scope(&self) -> &ChannelScope {
        match self {
            ResolvedDevice::Prototype(scope) => scope,
            ResolvedDevice::Registered { scope, .. } => scope,
        }
    }

    pub fn into_scope(self) -> ChannelScope {
        match self {
            ResolvedDevice::Prototype(scope) => scope,
            ResolvedDevice::Registered { scope, .. } => scope,
        }
    }
}

/// Fixed scope for the untagged legacy device.
pub fn prototype_scope() -> ChannelScope {
    ChannelScope {
        channels: PROTOTYPE_CHANNELS.iter().map(|s| s.to_string()).collect(),
        identity: DeviceIdentity::Untagged,
    }
}

/// Scope for a registered hive already fetched from the registry. The
/// channel set may be empty; deciding whether that is an error belongs to
/// the caller.
pub fn scope_for_hive(db: &Database, hive: &HiveRow) -> Result<ChannelScope, DbError> {
    Ok(ChannelScope {
        channels: db.assigned_sensor_keys(hive.id)?,
        identity: DeviceIdentity::ScopedToHive(hive.hive_code.clone()),
    })
}

/// Full resolution from a raw hive code.
pub fn resolve(db: &Database, hive_code: &str) -> Result<ResolvedDevice, ApiError> {
    if hive_code == PROTOTYPE_HIVE_CODE {
        return Ok(ResolvedDevice::Prototype(prototype_scope()));
    }

    let hive = db
        .find_hive_by_code(hive_code)?
        .ok_or_else(|| ApiError::HiveNotFound(hive_code.to_string()))?;
    let scope = scope_for_hive(db, &hive)?;
    Ok(ResolvedDevice::Registered { hive, scope })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn registered_hive_resolves_to_its_assignments() {
        let db = Database::open_in_memory().unwrap();
        let uid = db.create_user("Ana", "ana@example.com", "hash", "member").unwrap();
        db.create_hive("H1", None, &keys(&["temperatura_BMP280", "humidity"]), uid)
            .unwrap();

        let device = resolve(&db, "H1").unwrap();
        assert_eq!(device.scope().channels, keys(&["temperatura_BMP280", "humidity"]));
        assert_eq!(
            device.scope().identity,
            DeviceIdentity::ScopedToHive("H1".to_string())
        );
        match device {
            ResolvedDevice::Registered { hive, .. } => assert_eq!(hive.user_id, uid),
            ResolvedDevice::Prototype(_) => panic!("registered hive resolved as prototype"),
        }
    }

    #[test]
    fn unknown_code_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = resolve(&db, "NOPE").unwrap_err();
        assert!(matches!(err, ApiError::HiveNotFound(code) if code == "NOPE"));
    }

    #[test]
    fn sentinel_resolves_to_fixed_fallback() {
        let db = Database::open_in_memory().unwrap();
        let device = resolve(&db, PROTOTYPE_HIVE_CODE).unwrap();
        assert!(matches!(device, ResolvedDevice::Prototype(_)));
        let scope = device.into_scope();
        assert_eq!(
            scope.channels,
            keys(&["temperatura_BMP280", "humidity", "peso", "gx", "gy", "gz"])
        );
        assert!(scope.identity.is_untagged());
    }

    #[test]
    fn sentinel_ignores_registry_rows_with_the_same_code() {
        let db = Database::open_in_memory().unwrap();
        let uid = db.create_user("Ana", "ana@example.com", "hash", "member").unwrap();
        db.create_hive(PROTOTYPE_HIVE_CODE, None, &keys(&["microfono"]), uid)
            .unwrap();

        let device = resolve(&db, PROTOTYPE_HIVE_CODE).unwrap();
        assert!(matches!(device, ResolvedDevice::Prototype(_)));
        assert_eq!(device.scope().channels, prototype_scope().channels);
    }

    #[test]
    fn empty_assignment_set_resolves_without_error() {
        let db = Database::open_in_memory().unwrap();
        let uid = db.create_user("Ana", "ana@example.com", "hash", "member").unwrap();
        db.create_hive("H1", None, &[], uid).unwrap();

        let device = resolve(&db, "H1").unwrap();
        assert!(device.scope().channels.is_empty());
        assert!(!device.scope().identity.is_untagged());
    }
}
