//! # Unit Types
//!
//! Type-safe wrappers for the units the sizing calculators mix. They are
//! plain f64 newtypes that serialize as bare numbers.
//!
//! The calculators keep SI inputs (kW, °C, m) but several rules of thumb are
//! imperial (BTU/h, CFM, GPM), so the conversions live here in one place.
//!
//! ## Example
//!
//! ```rust
//! use rackline_core::units::{BtuPerHour, Celsius, Fahrenheit, Kilowatts};
//!
//! let heat: BtuPerHour = Kilowatts(1.0).into();
//! assert!((heat.0 - 3412.142).abs() < 1e-9);
//!
//! let supply: Fahrenheit = Celsius(20.0).into();
//! assert!((supply.0 - 68.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

/// BTU/h per kW
pub const BTU_PER_HOUR_PER_KW: f64 = 3412.142;

/// m³/h per CFM
pub const M3H_PER_CFM: f64 = 1.699_011;

/// L/s per US GPM
pub const LPS_PER_GPM: f64 = 0.063_090_2;

// ============================================================================
// Power / Heat
// ============================================================================

/// Power in kilowatts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilowatts(pub f64);

/// Heat flow in BTU per hour
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BtuPerHour(pub f64);

impl From<Kilowatts> for BtuPerHour {
    fn from(kw: Kilowatts) -> Self {
        BtuPerHour(kw.0 * BTU_PER_HOUR_PER_KW)
    }
}

impl From<BtuPerHour> for Kilowatts {
    fn from(btu: BtuPerHour) -> Self {
        Kilowatts(btu.0 / BTU_PER_HOUR_PER_KW)
    }
}

/// Refrigeration tons (12,000 BTU/h)
pub fn kw_to_tons(kw: f64) -> f64 {
    kw * BTU_PER_HOUR_PER_KW / 12_000.0
}

/// Energy in kWh drawn by a constant load over `hours`
pub fn energy_kwh(load: Kilowatts, hours: f64) -> f64 {
    load.0 * hours
}

// ============================================================================
// Temperature
// ============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Celsius(pub f64);

/// Temperature in degrees Fahrenheit
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fahrenheit(pub f64);

impl From<Celsius> for Fahrenheit {
    fn from(c: Celsius) -> Self {
        Fahrenheit(c.0 * 9.0 / 5.0 + 32.0)
    }
}

impl From<Fahrenheit> for Celsius {
    fn from(f: Fahrenheit) -> Self {
        Celsius((f.0 - 32.0) * 5.0 / 9.0)
    }
}

/// Celsius to Kelvin
pub fn celsius_to_kelvin(c: f64) -> f64 {
    c + 273.15
}

// ============================================================================
// Flow
// ============================================================================

/// Air volume flow in cubic feet per minute
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cfm(pub f64);

/// Air volume flow in cubic meters per hour
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicMetersPerHour(pub f64);

impl From<Cfm> for CubicMetersPerHour {
    fn from(cfm: Cfm) -> Self {
        CubicMetersPerHour(cfm.0 * M3H_PER_CFM)
    }
}

impl From<CubicMetersPerHour> for Cfm {
    fn from(m3h: CubicMetersPerHour) -> Self {
        Cfm(m3h.0 / M3H_PER_CFM)
    }
}

/// Water flow in US gallons per minute
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gpm(pub f64);

/// Water flow in liters per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LitersPerSecond(pub f64);

impl From<Gpm> for LitersPerSecond {
    fn from(gpm: Gpm) -> Self {
        LitersPerSecond(gpm.0 * LPS_PER_GPM)
    }
}

impl From<LitersPerSecond> for Gpm {
    fn from(lps: LitersPerSecond) -> Self {
        Gpm(lps.0 / LPS_PER_GPM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kw_btu_conversion() {
        let btu: BtuPerHour = Kilowatts(10.0).into();
        assert!((btu.0 - 34121.42).abs() < 1e-6);

        let kw: Kilowatts = btu.into();
        assert!((kw.0 - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_temperature_conversion() {
        let f: Fahrenheit = Celsius(100.0).into();
        assert!((f.0 - 212.0).abs() < 1e-9);

        let c: Celsius = Fahrenheit(32.0).into();
        assert!(c.0.abs() < 1e-9);
        assert!((celsius_to_kelvin(0.0) - 273.15).abs() < 1e-12);
    }

    #[test]
    fn test_tons_of_refrigeration() {
        // 3.517 kW is one ton
        assert!((kw_to_tons(3.516_85) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_flow_conversions() {
        let m3h: CubicMetersPerHour = Cfm(1000.0).into();
        assert!((m3h.0 - 1699.011).abs() < 1e-6);

        let lps: LitersPerSecond = Gpm(100.0).into();
        assert!((lps.0 - 6.30902).abs() < 1e-6);
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Kilowatts(12.5)).unwrap();
        assert_eq!(json, "12.5");
    }
}
