//! # Input Validation
//!
//! Per-domain validators that check calculator inputs before any formula runs.
//!
//! - **Errors** are hard constraint violations; the calculator refuses to run.
//! - **Warnings** flag unusual but computable inputs (non-standard voltage,
//!   out-of-band ASHRAE conditions, inverted tariffs, ...) and are copied into
//!   the calculation result.
//!
//! ## Example
//!
//! ```rust
//! use rackline_core::calculations::power::PowerParams;
//! use rackline_core::validation::validate_power;
//!
//! let mut params = PowerParams::default();
//! params.power_factor = 1.2;
//!
//! let report = validate_power(&params);
//! assert!(!report.is_valid);
//! assert_eq!(report.errors.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::cooling::CoolingParams;
use crate::calculations::economic::EconomicParams;
use crate::calculations::power::PowerParams;
use crate::constants::{ashrae, cable, economic, electrical};
use crate::errors::{CalcError, CalcResult};

/// Outcome of validating one parameter set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// True when `errors` is empty
    pub is_valid: bool,
    /// Blocking violations
    pub errors: Vec<String>,
    /// Non-blocking findings
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn new() -> Self {
        ValidationReport {
            is_valid: true,
            ..Default::default()
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Convert into `Err(CalcError::Validation)` when any error was found.
    pub fn into_result(self) -> CalcResult<Vec<String>> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(CalcError::validation(self.errors))
        }
    }
}

/// Record an error for a non-finite value and report whether it was finite.
fn require_finite(report: &mut ValidationReport, field: &str, value: f64) -> bool {
    if value.is_finite() {
        true
    } else {
        report.error(format!("{field} must be a finite number"));
        false
    }
}

/// Validate feeder parameters.
pub fn validate_power(params: &PowerParams) -> ValidationReport {
    let mut report = ValidationReport::new();

    if require_finite(&mut report, "Voltage", params.voltage) {
        if params.voltage <= 0.0 {
            report.error("Voltage must be positive");
        } else if !electrical::STANDARD_VOLTAGES.contains(&params.voltage) {
            report.warn(format!("Non-standard voltage: {} V", params.voltage));
        }
    }

    if require_finite(&mut report, "Current", params.current) {
        if params.current <= 0.0 {
            report.error("Current must be positive");
        } else if params.current > electrical::HIGH_CURRENT_A {
            report.warn(format!(
                "High current: {} A exceeds {} A",
                params.current,
                electrical::HIGH_CURRENT_A
            ));
        }
    }

    if require_finite(&mut report, "Power factor", params.power_factor) {
        if params.power_factor <= 0.0 || params.power_factor > 1.0 {
            report.error("Power factor must be between 0 and 1");
        } else if params.power_factor < electrical::LOW_POWER_FACTOR {
            report.warn(format!(
                "Low power factor: {} (below {})",
                params.power_factor,
                electrical::LOW_POWER_FACTOR
            ));
        }
    }

    if require_finite(&mut report, "Distance", params.distance) {
        if params.distance <= 0.0 {
            report.error("Distance must be positive");
        } else if params.distance > cable::LONG_RUN_M {
            report.warn(format!(
                "Long cable run: {} m, check voltage drop",
                params.distance
            ));
        }
    }

    if require_finite(&mut report, "Temperature", params.temperature)
        && params.temperature > cable::MAX_CONDUCTOR_TEMP_C
    {
        report.warn(format!(
            "Conductor temperature {} °C exceeds {} °C rating",
            params.temperature,
            cable::MAX_CONDUCTOR_TEMP_C
        ));
    }

    report
}

/// Validate cooling parameters.
pub fn validate_cooling(params: &CoolingParams) -> ValidationReport {
    let mut report = ValidationReport::new();

    if require_finite(&mut report, "IT load", params.it_load) && params.it_load <= 0.0 {
        report.error("IT load must be positive");
    }

    let supply = params.temperature.supply;
    let return_temp = params.temperature.return_temp;
    let temps_finite = require_finite(&mut report, "Supply temperature", supply)
        & require_finite(&mut report, "Return temperature", return_temp)
        & require_finite(&mut report, "Ambient temperature", params.temperature.ambient);
    if temps_finite {
        if return_temp <= supply {
            report.error("Return temperature must exceed supply temperature");
        }
        let recommended = ashrae::RECOMMENDED_SUPPLY_MIN_C..=ashrae::RECOMMENDED_SUPPLY_MAX_C;
        if !recommended.contains(&supply) {
            report.warn(format!(
                "Supply temperature {} °C is outside the ASHRAE recommended range ({}-{} °C)",
                supply,
                ashrae::RECOMMENDED_SUPPLY_MIN_C,
                ashrae::RECOMMENDED_SUPPLY_MAX_C
            ));
        }
    }

    let relative = params.humidity.relative;
    if require_finite(&mut report, "Relative humidity", relative) {
        if relative <= 0.0 || relative > 100.0 {
            report.error("Relative humidity must be between 0 and 100%");
        } else if !(ashrae::HUMIDITY_MIN_PCT..=ashrae::HUMIDITY_MAX_PCT).contains(&relative) {
            report.warn(format!(
                "Relative humidity {}% is outside the ASHRAE range ({}-{}%)",
                relative,
                ashrae::HUMIDITY_MIN_PCT,
                ashrae::HUMIDITY_MAX_PCT
            ));
        }
    }

    let target = params.humidity.target;
    if require_finite(&mut report, "Target humidity", target) {
        if !(0.0..=100.0).contains(&target) {
            report.error("Target humidity must be between 0 and 100%");
        } else if !(ashrae::HUMIDITY_MIN_PCT..=ashrae::HUMIDITY_MAX_PCT).contains(&target) {
            report.warn(format!(
                "Target humidity {}% is outside the ASHRAE range ({}-{}%)",
                target,
                ashrae::HUMIDITY_MIN_PCT,
                ashrae::HUMIDITY_MAX_PCT
            ));
        }
    }

    let density = params.rack_density;
    if require_finite(&mut report, "Rack density", density) {
        if density < 0.0 {
            report.error("Rack density cannot be negative");
        } else if density > ashrae::LIQUID_COOLING_RACK_DENSITY_KW {
            report.warn(format!(
                "Rack density {} kW exceeds {} kW; direct liquid cooling recommended",
                density,
                ashrae::LIQUID_COOLING_RACK_DENSITY_KW
            ));
        } else if density > ashrae::HIGH_RACK_DENSITY_KW {
            report.warn(format!(
                "High rack density: {} kW, hot/cold aisle containment required",
                density
            ));
        }
    }

    let room = &params.room_dimensions;
    for (name, value) in [
        ("Room length", room.length),
        ("Room width", room.width),
        ("Room height", room.height),
    ] {
        if require_finite(&mut report, name, value) && value <= 0.0 {
            report.error(format!("{name} must be positive"));
        }
    }

    report
}

/// Validate economic parameters.
pub fn validate_economic(params: &EconomicParams) -> ValidationReport {
    let mut report = ValidationReport::new();

    for (name, value) in [
        ("Power cost", params.power_cost),
        ("Cooling cost", params.cooling_cost),
        ("Maintenance cost", params.maintenance_cost),
        ("Initial investment", params.initial_investment),
        ("Peak rate", params.energy_rates.peak),
        ("Off-peak rate", params.energy_rates.off_peak),
        ("Carbon emission factor", params.carbon_emission_factor),
    ] {
        if require_finite(&mut report, name, value) && value < 0.0 {
            report.error(format!("{name} cannot be negative"));
        }
    }

    let hours = params.operational_hours;
    if require_finite(&mut report, "Operational hours", hours) {
        if !(0.0..=economic::HOURS_PER_YEAR).contains(&hours) {
            report.error(format!(
                "Operational hours must be between 0 and {}",
                economic::HOURS_PER_YEAR
            ));
        } else if hours == 0.0 {
            report.warn("Operational hours is zero; energy cost will be zero");
        }
    }

    if params.energy_rates.peak < params.energy_rates.off_peak {
        report.warn("Peak rate is lower than off-peak rate");
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_clean() {
        let power = validate_power(&PowerParams::default());
        assert!(power.is_valid);
        assert!(power.warnings.is_empty());

        let cooling = validate_cooling(&CoolingParams::default());
        assert!(cooling.is_valid);
        assert!(cooling.warnings.is_empty());

        let economic = validate_economic(&EconomicParams::default());
        assert!(economic.is_valid);
        assert!(economic.warnings.is_empty());
    }

    #[test]
    fn test_power_errors() {
        let params = PowerParams {
            voltage: -1.0,
            current: 0.0,
            power_factor: 0.0,
            distance: 0.0,
            ..PowerParams::default()
        };
        let report = validate_power(&params);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 4);
    }

    #[test]
    fn test_power_factor_of_one_is_valid() {
        let params = PowerParams {
            power_factor: 1.0,
            ..PowerParams::default()
        };
        assert!(validate_power(&params).is_valid);
    }

    #[test]
    fn test_power_warnings() {
        let params = PowerParams {
            voltage: 380.0,
            current: 3500.0,
            power_factor: 0.7,
            distance: 150.0,
            temperature: 95.0,
            ..PowerParams::default()
        };
        let report = validate_power(&params);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 5);
    }

    #[test]
    fn test_nan_is_an_error() {
        let params = PowerParams {
            current: f64::NAN,
            ..PowerParams::default()
        };
        let report = validate_power(&params);
        assert_eq!(report.errors, vec!["Current must be a finite number".to_string()]);
    }

    #[test]
    fn test_cooling_errors() {
        let mut params = CoolingParams::default();
        params.it_load = 0.0;
        params.temperature.return_temp = 15.0;
        params.humidity.relative = 0.0;
        params.room_dimensions.height = 0.0;
        let report = validate_cooling(&params);
        assert_eq!(report.errors.len(), 4);
    }

    #[test]
    fn test_cooling_ashrae_warnings() {
        let mut params = CoolingParams::default();
        params.temperature.supply = 15.0;
        params.humidity.relative = 85.0;
        let report = validate_cooling(&params);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_rack_density_tiers() {
        let mut params = CoolingParams::default();
        params.rack_density = 30.0;
        let report = validate_cooling(&params);
        assert!(report.warnings[0].contains("containment"));

        params.rack_density = 80.0;
        let report = validate_cooling(&params);
        assert!(report.warnings[0].contains("liquid cooling"));
    }

    #[test]
    fn test_economic_errors() {
        let params = EconomicParams {
            power_cost: -1.0,
            cooling_cost: -1.0,
            operational_hours: 9000.0,
            ..EconomicParams::default()
        };
        let report = validate_economic(&params);
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn test_inverted_rates_warning() {
        let mut params = EconomicParams::default();
        params.energy_rates.peak = 0.05;
        let report = validate_economic(&params);
        assert!(report.is_valid);
        assert_eq!(report.warnings, vec!["Peak rate is lower than off-peak rate".to_string()]);
    }

    #[test]
    fn test_into_result() {
        let ok = validate_economic(&EconomicParams::default()).into_result();
        assert!(ok.is_ok());

        let err = validate_power(&PowerParams {
            voltage: 0.0,
            ..PowerParams::default()
        })
        .into_result()
        .unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Voltage must be positive");
    }
}
