//! Master list of sensor channels a hive monitor can report.
//!
//! Loaded nowhere and mutated never — this is static configuration. The
//! registry validates assignment writes against it, and the UI uses it to
//! decorate raw channel keys with display names and units.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SensorDef {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
}

pub const SENSOR_CATALOG: &[SensorDef] = &[
    SensorDef { key: "temperatura_BMP280", name: "Temperatura Ambiente (BMP280)", unit: "°C" },
    SensorDef { key: "humidity", name: "Humedad del Ambiente", unit: "%" },
    SensorDef { key: "peso", name: "Peso de la Colmena", unit: "kg" },
    SensorDef { key: "pressure", name: "Presión Atmosférica (BMP280)", unit: "hPa" },
    SensorDef { key: "aX", name: "Aceleración Eje X", unit: "m/s²" },
    SensorDef { key: "aY", name: "Aceleración Eje Y", unit: "m/s²" },
    SensorDef { key: "aZ", name: "Aceleración Eje Z", unit: "m/s²" },
    SensorDef { key: "aSqrt", name: "Aceleración Total", unit: "m/s²" },
    SensorDef { key: "gY", name: "Giroscopio Eje Y", unit: "rad/s" },
    SensorDef { key: "gZ", name: "Giroscopio Eje Z", unit: "rad/s" },
    SensorDef { key: "gX", name: "Giroscopio Eje X", unit: "rad/s" },
    SensorDef { key: "microfono", name: "Análisis de Sonido", unit: "dB" },
    SensorDef { key: "con_varroa", name: "Detección de Varroa (Muestra A)", unit: "%" },
    SensorDef { key: "sin_varroa", name: "Detección de Varroa (Muestra B)", unit: "%" },
];

pub fn all() -> &'static [SensorDef] {
    SENSOR_CATALOG
}

pub fn find(key: &str) -> Option<&'static SensorDef> {
    SENSOR_CATALOG.iter().find(|s| s.key == key)
}

pub fn is_valid(key: &str) -> bool {
    find(key).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<&str> = SENSOR_CATALOG.iter().map(|s| s.key).collect();
        assert_eq!(keys.len(), SENSOR_CATALOG.len());
    }

    #[test]
    fn known_keys_validate() {
        assert!(is_valid("temperatura_BMP280"));
        assert!(is_valid("peso"));
        assert!(is_valid("sin_varroa"));
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(!is_valid(""));
        assert!(!is_valid("temperatura"));
        // catalog keys are case sensitive
        assert!(!is_valid("gx"));
    }

    #[test]
    fn find_returns_metadata() {
        let def = find("peso").unwrap();
        assert_eq!(def.name, "Peso de la Colmena");
        assert_eq!(def.unit, "kg");
    }
}
