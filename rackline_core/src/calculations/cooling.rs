//! # Cooling Calculation
//!
//! Sizes cooling for an IT load: required capacity, supply airflow, chilled
//! water flow, heat rejection, supply-air psychrometrics and whether an
//! N / N+1 / 2N unit arrangement covers the load.
//!
//! ## Psychrometrics
//!
//! All moist-air properties are evaluated at the supply temperature:
//!
//! ```text
//! α        = ln(RH/100) + 17.27·T / (237.3 + T)
//! T_dew    = 237.3·α / (17.27 − α)
//! AH       = 6.112·e^(17.67·T/(T+243.5)) · RH · 2.1674 / (273.15 + T)
//! h        = 1.006·T + AH·(2501 + 1.86·T)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rackline_core::calculations::cooling::{calculate, CoolingParams};
//!
//! let result = calculate(&CoolingParams::default()).unwrap();
//! assert!(result.airflow > 0.0);
//! assert!(result.redundancy.n_plus_one);
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{cooling, defaults, psychro};
use crate::errors::{CalcError, CalcResult};
use crate::units::{celsius_to_kelvin, BtuPerHour, Kilowatts};
use crate::validation::{validate_cooling, ValidationReport};

/// Air temperatures (°C)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSet {
    /// Supply (cold aisle) temperature
    pub supply: f64,
    /// Return (hot aisle) temperature
    #[serde(rename = "return")]
    pub return_temp: f64,
    /// Outdoor ambient temperature
    pub ambient: f64,
}

/// Humidity conditions (% RH)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HumiditySet {
    /// Measured relative humidity
    pub relative: f64,
    /// Set-point relative humidity
    pub target: f64,
}

/// White-space dimensions (m)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomDimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl RoomDimensions {
    /// Room volume (m³)
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}

/// Input parameters for cooling sizing.
///
/// ## JSON Example
///
/// ```json
/// {
///   "itLoad": 100.0,
///   "temperature": { "supply": 20.0, "return": 32.0, "ambient": 25.0 },
///   "humidity": { "relative": 45.0, "target": 50.0 },
///   "rackDensity": 10.0,
///   "roomDimensions": { "length": 12.0, "width": 3.0, "height": 3.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoolingParams {
    /// IT load (kW)
    pub it_load: f64,

    /// Air temperatures
    pub temperature: TemperatureSet,

    /// Humidity conditions
    pub humidity: HumiditySet,

    /// Average rack power density (kW/rack)
    pub rack_density: f64,

    /// Room dimensions
    pub room_dimensions: RoomDimensions,
}

impl Default for CoolingParams {
    fn default() -> Self {
        CoolingParams {
            it_load: defaults::IT_LOAD_KW,
            temperature: TemperatureSet {
                supply: defaults::SUPPLY_TEMP_C,
                return_temp: defaults::RETURN_TEMP_C,
                ambient: defaults::AMBIENT_TEMP_C,
            },
            humidity: HumiditySet {
                relative: defaults::RELATIVE_HUMIDITY_PCT,
                target: defaults::TARGET_HUMIDITY_PCT,
            },
            rack_density: defaults::RACK_DENSITY_KW,
            room_dimensions: RoomDimensions {
                length: defaults::ROOM_LENGTH_M,
                width: defaults::ROOM_WIDTH_M,
                height: defaults::ROOM_HEIGHT_M,
            },
        }
    }
}

impl CoolingParams {
    /// Validate input parameters.
    pub fn validate(&self) -> ValidationReport {
        validate_cooling(self)
    }

    /// Return minus supply temperature
    pub fn delta_t(&self) -> f64 {
        self.temperature.return_temp - self.temperature.supply
    }
}

/// Moist-air properties at supply conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Psychrometrics {
    /// Dew point (°C)
    pub dew_point: f64,
    /// Absolute humidity (g/m³)
    pub absolute_humidity: f64,
    /// Specific enthalpy (kJ/kg)
    pub enthalpy: f64,
}

/// Redundancy feasibility with two units sized at half the required capacity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedundancyCheck {
    /// Capacity of a single unit (kW)
    pub unit_capacity: f64,
    pub n: bool,
    pub n_plus_one: bool,
    pub two_n: bool,
}

/// Results from cooling sizing.
///
/// ## JSON Example
///
/// ```json
/// {
///   "requiredCapacity": 120.0,
///   "airflow": 26328.2,
///   "chilledWaterFlow": 81.8,
///   "heatRejection": 130.0,
///   "psychrometrics": { "dewPoint": 7.7, "absoluteHumidity": 7.78, "enthalpy": 19757.4 },
///   "redundancy": { "unitCapacity": 60.0, "n": true, "nPlusOne": true, "twoN": false },
///   "warnings": []
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoolingResult {
    /// Cooling capacity including safety margin (kW)
    pub required_capacity: f64,

    /// Supply airflow (CFM)
    pub airflow: f64,

    /// Chilled water flow (GPM)
    pub chilled_water_flow: f64,

    /// Heat rejected to atmosphere (kW)
    pub heat_rejection: f64,

    /// Supply-air moist-air properties
    pub psychrometrics: Psychrometrics,

    /// Redundancy feasibility
    pub redundancy: RedundancyCheck,

    /// Non-blocking validation findings
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Calculate cooling requirements.
///
/// # Returns
///
/// * `Ok(CoolingResult)` - Calculation results
/// * `Err(CalcError::Validation)` - If inputs are invalid
pub fn calculate(params: &CoolingParams) -> CalcResult<CoolingResult> {
    let warnings = params.validate().into_result()?;

    let delta_t = params.delta_t();
    if delta_t <= 0.0 {
        return Err(CalcError::calculation_failed(
            "cooling",
            "Return temperature must exceed supply temperature",
        ));
    }

    let heat_btu: BtuPerHour = Kilowatts(params.it_load).into();

    let required_capacity = params.it_load * cooling::SAFETY_MARGIN;
    let airflow = heat_btu.0 / (cooling::AIR_SENSIBLE_HEAT_FACTOR * delta_t);
    let chilled_water_flow =
        heat_btu.0 / (cooling::WATER_HEAT_FACTOR * cooling::WATER_DENSITY_LB_PER_GAL);
    let heat_rejection = params.it_load * cooling::HEAT_REJECTION_FACTOR;

    let psychrometrics = psychrometrics(params.temperature.supply, params.humidity.relative);
    let redundancy = redundancy(required_capacity);

    Ok(CoolingResult {
        required_capacity,
        airflow,
        chilled_water_flow,
        heat_rejection,
        psychrometrics,
        redundancy,
        warnings,
    })
}

/// Moist-air properties at dry-bulb `t_c` (°C) and `rh_pct` (% RH).
pub fn psychrometrics(t_c: f64, rh_pct: f64) -> Psychrometrics {
    let alpha = (rh_pct / 100.0).ln() + psychro::MAGNUS_A * t_c / (psychro::MAGNUS_B + t_c);
    let dew_point = psychro::MAGNUS_B * alpha / (psychro::MAGNUS_A - alpha);

    let saturation = psychro::SATURATION_HPA
        * (psychro::SATURATION_A * t_c / (t_c + psychro::SATURATION_B)).exp();
    let absolute_humidity =
        saturation * rh_pct * psychro::ABSOLUTE_HUMIDITY_FACTOR / celsius_to_kelvin(t_c);

    let enthalpy = psychro::CP_AIR * t_c
        + absolute_humidity * (psychro::LATENT_HEAT + psychro::CP_VAPOUR * t_c);

    Psychrometrics {
        dew_point,
        absolute_humidity,
        enthalpy,
    }
}

/// Redundancy feasibility for units of half the required capacity.
pub fn redundancy(required_capacity: f64) -> RedundancyCheck {
    let unit_capacity = required_capacity / 2.0;
    RedundancyCheck {
        unit_capacity,
        n: true,
        n_plus_one: unit_capacity * 2.0 >= required_capacity,
        two_n: unit_capacity * 3.0 >= required_capacity * 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_and_heat_rejection() {
        let result = calculate(&CoolingParams::default()).unwrap();
        assert!((result.required_capacity - 120.0).abs() < 1e-9);
        assert!((result.heat_rejection - 130.0).abs() < 1e-9);
    }

    #[test]
    fn test_airflow_formula() {
        let params = CoolingParams::default();
        let result = calculate(&params).unwrap();
        let expected = 100.0 * 3412.142 / (1.08 * (32.0 - 20.0));
        assert!((result.airflow - expected).abs() < 1e-6);
    }

    #[test]
    fn test_airflow_positive_when_return_exceeds_supply() {
        for (supply, ret) in [(18.0, 18.5), (20.0, 35.0), (10.0, 45.0)] {
            let mut params = CoolingParams::default();
            params.temperature.supply = supply;
            params.temperature.return_temp = ret;
            let result = calculate(&params).unwrap();
            assert!(result.airflow > 0.0);
        }
    }

    #[test]
    fn test_chilled_water_flow() {
        let result = calculate(&CoolingParams::default()).unwrap();
        let expected = 100.0 * 3412.142 / (500.0 * 8.34);
        assert!((result.chilled_water_flow - expected).abs() < 1e-9);
    }

    #[test]
    fn test_dew_point_below_dry_bulb() {
        let p = psychrometrics(20.0, 45.0);
        // Magnus at 20 °C / 45 % is about 7.7 °C
        assert!((p.dew_point - 7.7).abs() < 0.1);
        assert!(p.dew_point < 20.0);
    }

    #[test]
    fn test_saturated_air_dew_point_equals_dry_bulb() {
        let p = psychrometrics(24.0, 100.0);
        assert!((p.dew_point - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_absolute_humidity_and_enthalpy_formulas() {
        let t: f64 = 22.0;
        let rh = 50.0;
        let p = psychrometrics(t, rh);
        let ah = 6.112 * (17.67 * t / (t + 243.5)).exp() * rh * 2.1674 / (273.15 + t);
        assert!((p.absolute_humidity - ah).abs() < 1e-12);
        let h = 1.006 * t + ah * (2501.0 + 1.86 * t);
        assert!((p.enthalpy - h).abs() < 1e-9);
    }

    #[test]
    fn test_redundancy_inclusive_tie() {
        let check = redundancy(120.0);
        assert_eq!(check.unit_capacity, 60.0);
        assert!(check.n);
        // 60 * 2 == 120 is feasible (inclusive)
        assert!(check.n_plus_one);
        // 60 * 3 = 180 < 240
        assert_eq!(check.two_n, check.unit_capacity * 3.0 >= 120.0 * 2.0);
        assert!(!check.two_n);
    }

    #[test]
    fn test_two_n_never_met_by_half_size_units() {
        for load in [1.0, 50.0, 120.0, 10_000.0] {
            let check = redundancy(load);
            assert!(check.n_plus_one);
            assert!(!check.two_n);
        }
    }

    #[test]
    fn test_invalid_temperature_delta() {
        let mut params = CoolingParams::default();
        params.temperature.return_temp = params.temperature.supply;
        assert!(matches!(
            calculate(&params),
            Err(CalcError::Validation { .. })
        ));
    }

    #[test]
    fn test_return_field_name() {
        let json = serde_json::to_string(&CoolingParams::default()).unwrap();
        assert!(json.contains("\"return\":32.0"));
        assert!(json.contains("\"itLoad\":100.0"));
        let roundtrip: CoolingParams = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, CoolingParams::default());
    }
}
