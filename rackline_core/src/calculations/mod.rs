//! # Engineering Calculations
//!
//! Each domain calculation follows the same pattern:
//!
//! - `*Params` - Input parameters (JSON-serializable, camelCase)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(&params) -> CalcResult<*Result>` - Pure calculation function
//!
//! On top of the pure functions, [`cache`] adds per-instance result caches and
//! [`service`] adds instrumentation and cache sweeping.
//!
//! ## Available Calculations
//!
//! - [`power`] - Fault current, arc flash, voltage drop, feeder and breaker sizing
//! - [`cooling`] - Capacity, airflow, chilled water, psychrometrics, redundancy
//! - [`economic`] - TCO, PUE, energy cost, carbon footprint, NPV/IRR

pub mod cache;
pub mod cooling;
pub mod economic;
pub mod power;
pub mod service;

use serde::{Deserialize, Serialize};

pub use cooling::{CoolingParams, CoolingResult};
pub use economic::{EconomicParams, EconomicResult};
pub use power::{PowerParams, PowerResult};

/// A calculation request for any domain.
///
/// ## JSON Example
///
/// ```json
/// { "type": "Power", "voltage": 480.0, "current": 200.0, "powerFactor": 0.9,
///   "distance": 45.0, "cableType": "COPPER", "temperature": 30.0, "loadType": "linear" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationRequest {
    Power(PowerParams),
    Cooling(CoolingParams),
    Economic(EconomicParams),
}

impl CalculationRequest {
    /// Get the calculation type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationRequest::Power(_) => "Power",
            CalculationRequest::Cooling(_) => "Cooling",
            CalculationRequest::Economic(_) => "Economic",
        }
    }
}

/// Result matching a [`CalculationRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationOutput {
    Power(PowerResult),
    Cooling(CoolingResult),
    Economic(EconomicResult),
}

impl CalculationOutput {
    /// Non-blocking validation findings carried by the result
    pub fn warnings(&self) -> &[String] {
        match self {
            CalculationOutput::Power(r) => &r.warnings,
            CalculationOutput::Cooling(r) => &r.warnings,
            CalculationOutput::Economic(r) => &r.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_tagged_serialization() {
        let request = CalculationRequest::Cooling(CoolingParams::default());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "Cooling");
        assert_eq!(json["itLoad"], 100.0);

        let back: CalculationRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back.calc_type(), "Cooling");
    }

    #[test]
    fn test_parse_power_request() {
        let json = r#"{
            "type": "Power", "voltage": 480.0, "current": 200.0, "powerFactor": 0.9,
            "distance": 45.0, "cableType": "COPPER", "temperature": 30.0, "loadType": "linear"
        }"#;
        let request: CalculationRequest = serde_json::from_str(json).unwrap();
        match request {
            CalculationRequest::Power(params) => assert_eq!(params.voltage, 480.0),
            other => panic!("unexpected request {}", other.calc_type()),
        }
    }
}
