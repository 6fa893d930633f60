//! # Engine Settings
//!
//! Tunables for the calculation service and the layout editor. Every field has
//! a default, so a settings file only needs to name what it overrides.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "calculation": { "slowThresholdMs": 500, "sweepEveryCalls": 1000 },
//!   "autosave": { "debounceMs": 5000 }
//! }
//! ```
//!
//! ```rust
//! use rackline_core::settings::EngineSettings;
//!
//! let settings = EngineSettings::from_json_str(r#"{"history": {"maxEntries": 20}}"#).unwrap();
//! assert_eq!(settings.history.max_entries, 20);
//! assert_eq!(settings.autosave.debounce_ms, 2000);
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::calculations::economic::EconomicRates;
use crate::errors::{CalcError, CalcResult};

/// Root settings container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    pub calculation: CalculationSettings,
    pub history: HistorySettings,
    pub autosave: AutosaveSettings,
}

impl EngineSettings {
    /// Parse settings from a JSON string. An out-of-range economic horizon
    /// is clamped to `1..=MAX_HORIZON_YEARS`.
    pub fn from_json_str(json: &str) -> CalcResult<Self> {
        let mut settings: Self =
            serde_json::from_str(json).map_err(|e| CalcError::SerializationError {
                reason: format!("Invalid settings JSON: {e}"),
            })?;
        let rates = settings.calculation.economic_rates.bounded();
        if rates.horizon_years != settings.calculation.economic_rates.horizon_years {
            tracing::warn!(
                requested = settings.calculation.economic_rates.horizon_years,
                horizon_years = rates.horizon_years,
                "economic horizon out of range; clamped"
            );
            settings.calculation.economic_rates = rates;
        }
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> CalcResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CalcError::persistence(
                "load settings",
                format!("{}: {}", path.display(), e),
            )
        })?;
        let settings = Self::from_json_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded engine settings");
        Ok(settings)
    }
}

/// Calculation service tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculationSettings {
    /// Calls slower than this are reported as warnings
    pub slow_threshold_ms: u64,

    /// Elapsed time between cache sweeps
    pub cache_sweep_interval_secs: u64,

    /// Also sweep after this many calls, when set
    pub sweep_every_calls: Option<u64>,

    /// Number of recent call metrics retained
    pub metrics_capacity: usize,

    /// Discount/inflation/horizon used by the economic calculator
    pub economic_rates: EconomicRates,
}

impl Default for CalculationSettings {
    fn default() -> Self {
        CalculationSettings {
            slow_threshold_ms: 1000,
            cache_sweep_interval_secs: 30 * 60,
            sweep_every_calls: None,
            metrics_capacity: 100,
            economic_rates: EconomicRates::default(),
        }
    }
}

impl CalculationSettings {
    pub fn slow_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_threshold_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }
}

/// Undo/redo history tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistorySettings {
    /// Oldest entries are evicted past this count
    pub max_entries: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        HistorySettings { max_entries: 50 }
    }
}

/// Autosave tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutosaveSettings {
    pub enabled: bool,
    /// Quiet period after the last edit before a write
    pub debounce_ms: u64,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        AutosaveSettings {
            enabled: true,
            debounce_ms: 2000,
        }
    }
}

impl AutosaveSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.calculation.slow_threshold(), Duration::from_secs(1));
        assert_eq!(settings.calculation.sweep_interval(), Duration::from_secs(1800));
        assert_eq!(settings.calculation.sweep_every_calls, None);
        assert_eq!(settings.history.max_entries, 50);
        assert!(settings.autosave.enabled);
        assert_eq!(settings.autosave.debounce(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_override() {
        let settings = EngineSettings::from_json_str(
            r#"{"calculation": {"sweepEveryCalls": 10, "economicRates": {"horizonYears": 15}}}"#,
        )
        .unwrap();
        assert_eq!(settings.calculation.sweep_every_calls, Some(10));
        assert_eq!(settings.calculation.slow_threshold_ms, 1000);
        assert_eq!(settings.calculation.economic_rates.horizon_years, 15);
        assert!((settings.calculation.economic_rates.discount_rate - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_horizon_clamped_on_load() {
        let settings = EngineSettings::from_json_str(
            r#"{"calculation": {"economicRates": {"horizonYears": 4000000000}}}"#,
        )
        .unwrap();
        assert_eq!(settings.calculation.economic_rates.horizon_years, 50);

        let settings = EngineSettings::from_json_str(
            r#"{"calculation": {"economicRates": {"horizonYears": 0}}}"#,
        )
        .unwrap();
        assert_eq!(settings.calculation.economic_rates.horizon_years, 1);
    }

    #[test]
    fn test_invalid_json() {
        let err = EngineSettings::from_json_str("{not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineSettings::load(Path::new("/nonexistent/rackline.json")).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_load_from_file() {
        let path =
            std::env::temp_dir().join(format!("rackline_settings_{}.json", std::process::id()));
        fs::write(&path, r#"{"autosave": {"enabled": false}}"#).unwrap();
        let settings = EngineSettings::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert!(!settings.autosave.enabled);
    }
}
