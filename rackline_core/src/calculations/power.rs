//! # Power Distribution Calculation
//!
//! Sizes a single feeder run: fault and short-circuit current, arc-flash
//! incident energy, voltage drop, power-factor correction, harmonic estimate
//! and a two-stage breaker coordination table.
//!
//! ## Assumptions
//!
//! - Three-phase feeder, impedance dominated by conductor resistance
//! - Resistivity at 20 °C (the `temperature` input only drives warnings)
//! - Simplified IEEE 1584 incident energy at 610 mm working distance
//!
//! ## Example
//!
//! ```rust
//! use rackline_core::calculations::power::{calculate, CableType, LoadType, PowerParams};
//!
//! let params = PowerParams {
//!     voltage: 400.0,
//!     current: 1000.0,
//!     power_factor: 0.9,
//!     distance: 50.0,
//!     cable_type: CableType::Copper,
//!     temperature: 30.0,
//!     load_type: LoadType::Linear,
//! };
//!
//! let result = calculate(&params).unwrap();
//! assert!((result.short_circuit_current - result.fault_current * 1.25).abs() < 1e-3);
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{cable, defaults, electrical, ieee};
use crate::errors::{CalcError, CalcResult};
use crate::validation::{validate_power, ValidationReport};

/// Conductor material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CableType {
    #[default]
    Copper,
    Aluminum,
}

impl CableType {
    /// All cable types for UI selection
    pub const ALL: [CableType; 2] = [CableType::Copper, CableType::Aluminum];

    /// Resistivity in Ω·m
    pub fn resistivity(&self) -> f64 {
        match self {
            CableType::Copper => cable::COPPER_RESISTIVITY,
            CableType::Aluminum => cable::ALUMINUM_RESISTIVITY,
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            CableType::Copper => "Copper",
            CableType::Aluminum => "Aluminum",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_uppercase().as_str() {
            "COPPER" | "CU" => Ok(CableType::Copper),
            "ALUMINUM" | "ALUMINIUM" | "AL" => Ok(CableType::Aluminum),
            _ => Err(CalcError::invalid_input(
                "cableType",
                s,
                "Expected COPPER or ALUMINUM",
            )),
        }
    }
}

/// Electrical character of the connected load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadType {
    #[default]
    Linear,
    /// Switch-mode power supplies, VFDs, rectifiers
    Nonlinear,
}

/// Input parameters for a feeder run.
///
/// ## JSON Example
///
/// ```json
/// {
///   "voltage": 400.0,
///   "current": 1000.0,
///   "powerFactor": 0.9,
///   "distance": 50.0,
///   "cableType": "COPPER",
///   "temperature": 30.0,
///   "loadType": "linear"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerParams {
    /// Line-to-line voltage (V)
    pub voltage: f64,

    /// Load current (A)
    pub current: f64,

    /// Displacement power factor, 0 < pf ≤ 1
    pub power_factor: f64,

    /// One-way cable length (m)
    pub distance: f64,

    /// Conductor material
    pub cable_type: CableType,

    /// Conductor operating temperature (°C)
    pub temperature: f64,

    /// Load character
    pub load_type: LoadType,
}

impl Default for PowerParams {
    fn default() -> Self {
        PowerParams {
            voltage: defaults::VOLTAGE_V,
            current: defaults::CURRENT_A,
            power_factor: defaults::POWER_FACTOR,
            distance: defaults::CABLE_RUN_M,
            cable_type: CableType::Copper,
            temperature: defaults::CABLE_TEMP_C,
            load_type: LoadType::Linear,
        }
    }
}

impl PowerParams {
    /// Validate input parameters.
    pub fn validate(&self) -> ValidationReport {
        validate_power(self)
    }

    /// Conductor impedance used for fault calculations (Ω)
    pub fn impedance(&self) -> f64 {
        self.cable_type.resistivity() * self.distance / ieee::IMPEDANCE_FACTOR
    }
}

/// One row of the breaker coordination table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerSetting {
    /// Interrupting rating (A)
    pub rating: f64,
    /// Trip time (s)
    pub trip_time: f64,
    /// Whether this stage coordinates with the stage below it
    pub coordination: bool,
}

/// Results from the feeder calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "faultCurrent": 8.439e8,
///   "shortCircuitCurrent": 1.055e9,
///   "arcFlashEnergy": 4.150e6,
///   "voltageDrop": 0.1125,
///   "correctedPowerFactor": 0.95,
///   "harmonicDistortion": 0.05,
///   "requiredFeederSize": 1250.0,
///   "breakers": [
///     { "rating": 1.055e9, "tripTime": 0.1, "coordination": true },
///     { "rating": 1.266e9, "tripTime": 0.3, "coordination": true }
///   ],
///   "warnings": []
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerResult {
    /// Available fault current (A)
    pub fault_current: f64,

    /// Short-circuit current, 1.25 × fault current (A)
    pub short_circuit_current: f64,

    /// Incident energy estimate
    pub arc_flash_energy: f64,

    /// Voltage drop ratio
    pub voltage_drop: f64,

    /// Power factor after correction, capped at 0.95
    pub corrected_power_factor: f64,

    /// Estimated total harmonic distortion
    pub harmonic_distortion: f64,

    /// Minimum feeder ampacity (A)
    pub required_feeder_size: f64,

    /// Breaker coordination table, branch stage first
    pub breakers: Vec<BreakerSetting>,

    /// Non-blocking validation findings
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Calculate feeder results.
///
/// # Returns
///
/// * `Ok(PowerResult)` - Calculation results
/// * `Err(CalcError::Validation)` - If inputs are invalid
pub fn calculate(params: &PowerParams) -> CalcResult<PowerResult> {
    let warnings = params.validate().into_result()?;

    let impedance = params.impedance();
    if impedance <= 0.0 {
        return Err(CalcError::calculation_failed(
            "power",
            "Cable impedance is zero",
        ));
    }

    let fault_current = params.voltage * ieee::VOLTAGE_FACTOR / impedance;
    let short_circuit_current = fault_current * ieee::SHORT_CIRCUIT_FACTOR;
    let arc_flash_energy = ieee::INCIDENT_ENERGY_FACTOR * fault_current * ieee::TIME_FACTOR
        / ieee::DISTANCE_FACTOR;

    let voltage_drop =
        params.current * params.distance * params.power_factor / (params.voltage * 1000.0);

    let corrected_power_factor = (params.power_factor * ieee::POWER_FACTOR_CORRECTION_GAIN)
        .min(ieee::MAX_CORRECTED_POWER_FACTOR);

    let harmonic_distortion = match params.load_type {
        LoadType::Nonlinear => ieee::THD_NONLINEAR,
        LoadType::Linear => ieee::THD_LINEAR,
    };

    let required_feeder_size = params.current * ieee::FEEDER_SIZING_FACTOR;

    let breakers = vec![
        BreakerSetting {
            rating: fault_current * electrical::BRANCH_RATING_FACTOR,
            trip_time: electrical::BRANCH_TRIP_TIME_S,
            coordination: true,
        },
        BreakerSetting {
            rating: fault_current * electrical::MAIN_RATING_FACTOR,
            trip_time: electrical::MAIN_TRIP_TIME_S,
            coordination: true,
        },
    ];

    Ok(PowerResult {
        fault_current,
        short_circuit_current,
        arc_flash_energy,
        voltage_drop,
        corrected_power_factor,
        harmonic_distortion,
        required_feeder_size,
        breakers,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_feeder() -> PowerParams {
        PowerParams {
            voltage: 400.0,
            current: 1000.0,
            power_factor: 0.9,
            distance: 50.0,
            cable_type: CableType::Copper,
            temperature: 30.0,
            load_type: LoadType::Linear,
        }
    }

    #[test]
    fn test_fault_current_matches_formula() {
        let params = test_feeder();
        let result = calculate(&params).unwrap();

        let impedance = 1.724e-8 * 50.0 / 1.732;
        let expected = 400.0 * 1.05 / impedance;
        assert!(((result.fault_current - expected) / expected).abs() < 1e-12);
    }

    #[test]
    fn test_derived_currents() {
        let result = calculate(&test_feeder()).unwrap();

        assert!(
            ((result.short_circuit_current - 1.25 * result.fault_current) / result.fault_current)
                .abs()
                < 1e-12
        );
        let expected_arc = 1.5 * result.fault_current * 2.0 / 610.0;
        assert!(((result.arc_flash_energy - expected_arc) / expected_arc).abs() < 1e-12);
        assert_eq!(result.required_feeder_size, 1250.0);
    }

    #[test]
    fn test_voltage_drop() {
        let result = calculate(&test_feeder()).unwrap();
        // 1000 * 50 * 0.9 / (400 * 1000)
        assert!((result.voltage_drop - 0.1125).abs() < 1e-12);
    }

    #[test]
    fn test_power_factor_correction_is_capped() {
        let result = calculate(&test_feeder()).unwrap();
        assert_eq!(result.corrected_power_factor, 0.95);

        let mut low = test_feeder();
        low.power_factor = 0.7;
        let result = calculate(&low).unwrap();
        assert!((result.corrected_power_factor - 0.84).abs() < 1e-12);
    }

    #[test]
    fn test_corrected_power_factor_never_exceeds_cap() {
        for pf in [0.05, 0.3, 0.5, 0.79, 0.8, 0.95, 1.0] {
            let mut params = test_feeder();
            params.power_factor = pf;
            let result = calculate(&params).unwrap();
            assert!(result.corrected_power_factor <= 0.95);
        }
    }

    #[test]
    fn test_harmonics_by_load_type() {
        let mut params = test_feeder();
        assert_eq!(calculate(&params).unwrap().harmonic_distortion, 0.05);

        params.load_type = LoadType::Nonlinear;
        assert_eq!(calculate(&params).unwrap().harmonic_distortion, 0.15);
    }

    #[test]
    fn test_aluminum_has_lower_fault_current() {
        let copper = calculate(&test_feeder()).unwrap();
        let mut params = test_feeder();
        params.cable_type = CableType::Aluminum;
        let aluminum = calculate(&params).unwrap();
        assert!(aluminum.fault_current < copper.fault_current);
    }

    #[test]
    fn test_breaker_table() {
        let result = calculate(&test_feeder()).unwrap();
        assert_eq!(result.breakers.len(), 2);
        assert_eq!(result.breakers[0].trip_time, 0.1);
        assert_eq!(result.breakers[1].trip_time, 0.3);
        assert!(result.breakers.iter().all(|b| b.coordination));
        assert!(result.breakers[1].rating > result.breakers[0].rating);
    }

    #[test]
    fn test_invalid_inputs_list_all_errors() {
        let mut params = test_feeder();
        params.voltage = 0.0;
        params.current = -5.0;
        let err = calculate(&params).unwrap_err();
        match err {
            CalcError::Validation { errors } => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_warnings_carried_into_result() {
        let mut params = test_feeder();
        params.voltage = 415.5;
        let result = calculate(&params).unwrap();
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_json_field_names() {
        let json = r#"{
            "voltage": 400.0,
            "current": 1000.0,
            "powerFactor": 0.9,
            "distance": 50.0,
            "cableType": "COPPER",
            "temperature": 30.0,
            "loadType": "nonlinear"
        }"#;
        let params: PowerParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.cable_type, CableType::Copper);
        assert_eq!(params.load_type, LoadType::Nonlinear);
    }

    #[test]
    fn test_cable_type_parsing() {
        assert_eq!(CableType::from_str_flexible("cu").unwrap(), CableType::Copper);
        assert_eq!(
            CableType::from_str_flexible("Aluminium").unwrap(),
            CableType::Aluminum
        );
        assert!(CableType::from_str_flexible("silver").is_err());
    }
}
