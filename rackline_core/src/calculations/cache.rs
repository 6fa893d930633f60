//! # Result Caches
//!
//! [`Calculator`] wraps one calculation model with its own [`ResultCache`].
//! Results are keyed by the canonical (sorted-key) JSON of the input, so two
//! parameter sets that serialize identically share one entry regardless of
//! field order.
//!
//! ```rust
//! use rackline_core::calculations::cache::PowerCalculator;
//! use rackline_core::calculations::power::PowerParams;
//!
//! let calculator = PowerCalculator::default();
//! let params = PowerParams::default();
//!
//! let first = calculator.calculate(&params).unwrap();
//! let second = calculator.calculate(&params).unwrap();
//! assert_eq!(first, second);
//! assert_eq!(calculator.computations(), 1);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;

use crate::calculations::cooling::{self, CoolingParams, CoolingResult};
use crate::calculations::economic::{self, EconomicParams, EconomicRates, EconomicResult};
use crate::calculations::power::{self, PowerParams, PowerResult};
use crate::canonical::to_canonical_string;
use crate::errors::{CalcError, CalcResult};
use crate::monitoring::{Monitor, OperationLog, OperationStatus, PerformanceMetric, TracingMonitor};
use crate::validation::ValidationReport;

/// A pure calculation with separate validation and compute steps.
pub trait Calculation: Send + Sync {
    type Params: Serialize + Send + Sync;
    type Output: Clone + Send + Sync;

    /// Short name used in logs and metrics
    const KIND: &'static str;

    fn validate(&self, params: &Self::Params) -> ValidationReport;

    fn compute(&self, params: &Self::Params) -> CalcResult<Self::Output>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PowerModel;

impl Calculation for PowerModel {
    type Params = PowerParams;
    type Output = PowerResult;
    const KIND: &'static str = "power";

    fn validate(&self, params: &PowerParams) -> ValidationReport {
        params.validate()
    }

    fn compute(&self, params: &PowerParams) -> CalcResult<PowerResult> {
        power::calculate(params)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CoolingModel;

impl Calculation for CoolingModel {
    type Params = CoolingParams;
    type Output = CoolingResult;
    const KIND: &'static str = "cooling";

    fn validate(&self, params: &CoolingParams) -> ValidationReport {
        params.validate()
    }

    fn compute(&self, params: &CoolingParams) -> CalcResult<CoolingResult> {
        cooling::calculate(params)
    }
}

/// Economic model bound to a fixed set of financial rates.
#[derive(Debug, Default, Clone, Copy)]
pub struct EconomicModel {
    pub rates: EconomicRates,
}

impl Calculation for EconomicModel {
    type Params = EconomicParams;
    type Output = EconomicResult;
    const KIND: &'static str = "economic";

    fn validate(&self, params: &EconomicParams) -> ValidationReport {
        params.validate()
    }

    fn compute(&self, params: &EconomicParams) -> CalcResult<EconomicResult> {
        economic::calculate_with_rates(params, &self.rates)
    }
}

/// Unbounded map from canonical input key to result; cleared wholesale.
#[derive(Debug)]
pub struct ResultCache<V> {
    entries: Mutex<HashMap<String, V>>,
}

impl<V> Default for ResultCache<V> {
    fn default() -> Self {
        ResultCache {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> ResultCache<V> {
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert(&self, key: String, value: V) {
        self.entries.lock().insert(key, value);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Validating, caching front for a [`Calculation`].
pub struct Calculator<M: Calculation> {
    model: M,
    cache: ResultCache<M::Output>,
    computations: AtomicU64,
    monitor: Arc<dyn Monitor>,
}

pub type PowerCalculator = Calculator<PowerModel>;
pub type CoolingCalculator = Calculator<CoolingModel>;
pub type EconomicCalculator = Calculator<EconomicModel>;

impl<M: Calculation + Default> Default for Calculator<M> {
    fn default() -> Self {
        Calculator::new(M::default(), Arc::new(TracingMonitor))
    }
}

impl<M: Calculation> Calculator<M> {
    pub fn new(model: M, monitor: Arc<dyn Monitor>) -> Self {
        Calculator {
            model,
            cache: ResultCache::default(),
            computations: AtomicU64::new(0),
            monitor,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Validate, then return the cached result or compute and cache a new one.
    ///
    /// # Returns
    ///
    /// * `Err(CalcError::Validation)` - If inputs are invalid (nothing is cached)
    /// * `Err(CalcError::CalculationFailed)` - If the model cannot produce a result
    pub fn calculate(&self, params: &M::Params) -> CalcResult<M::Output> {
        let report = self.model.validate(params);
        if !report.is_valid {
            let error = CalcError::validation(report.errors);
            self.monitor.log_operation(
                OperationLog::new("calculation", M::KIND, OperationStatus::Failure)
                    .with_error(&error),
            );
            return Err(error);
        }

        let key = to_canonical_string(params)?;
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(kind = M::KIND, "calculation cache hit");
            return Ok(hit);
        }

        let started = Instant::now();
        let result = match self.model.compute(params) {
            Ok(result) => result,
            Err(error) => {
                self.monitor.log_operation(
                    OperationLog::new("calculation", M::KIND, OperationStatus::Failure)
                        .with_error(&error),
                );
                return Err(error);
            }
        };
        self.computations.fetch_add(1, Ordering::Relaxed);
        self.cache.insert(key, result.clone());
        self.monitor
            .log_performance_metric(PerformanceMetric::new(M::KIND, started.elapsed(), None));

        Ok(result)
    }

    /// Number of times the model actually ran
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::MemoryMonitor;

    #[test]
    fn test_cache_hit_skips_recompute() {
        let calculator = CoolingCalculator::default();
        let params = CoolingParams::default();

        let first = calculator.calculate(&params).unwrap();
        let second = calculator.calculate(&params).unwrap();

        assert_eq!(first, second);
        assert_eq!(calculator.computations(), 1);
        assert_eq!(calculator.cached_entries(), 1);
    }

    #[test]
    fn test_distinct_inputs_are_cached_separately() {
        let calculator = PowerCalculator::default();
        let mut params = PowerParams::default();
        calculator.calculate(&params).unwrap();
        params.distance = 60.0;
        calculator.calculate(&params).unwrap();

        assert_eq!(calculator.computations(), 2);
        assert_eq!(calculator.cached_entries(), 2);
    }

    #[test]
    fn test_clear_cache_forces_recompute() {
        let calculator = EconomicCalculator::default();
        let params = EconomicParams::default();
        let first = calculator.calculate(&params).unwrap();
        calculator.clear_cache();
        assert_eq!(calculator.cached_entries(), 0);

        let second = calculator.calculate(&params).unwrap();
        assert_eq!(calculator.computations(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_validation_failure_is_logged_and_not_cached() {
        let monitor = MemoryMonitor::shared();
        let calculator = PowerCalculator::new(PowerModel, monitor.clone());
        let params = PowerParams {
            voltage: -1.0,
            ..Default::default()
        };

        let err = calculator.calculate(&params).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
        assert_eq!(calculator.cached_entries(), 0);
        assert_eq!(calculator.computations(), 0);

        let failures = monitor.operations_with_status(OperationStatus::Failure);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].action, "power");
        assert!(failures[0].error.as_deref().unwrap().contains("Voltage must be positive"));
    }

    #[test]
    fn test_compute_emits_metric_once() {
        let monitor = MemoryMonitor::shared();
        let calculator = CoolingCalculator::new(CoolingModel, monitor.clone());
        let params = CoolingParams::default();
        calculator.calculate(&params).unwrap();
        calculator.calculate(&params).unwrap();

        let metrics = monitor.metrics();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].operation, "cooling");
    }

    #[test]
    fn test_economic_model_uses_its_rates() {
        let params = EconomicParams::default();
        let short = EconomicCalculator::new(
            EconomicModel {
                rates: EconomicRates {
                    horizon_years: 5,
                    ..Default::default()
                },
            },
            Arc::new(TracingMonitor),
        );
        let standard = EconomicCalculator::default();

        let short_tco = short.calculate(&params).unwrap().tco;
        let standard_tco = standard.calculate(&params).unwrap().tco;
        assert!(short_tco < standard_tco);
    }

    #[test]
    fn test_calculation_failure_is_logged() {
        let monitor = MemoryMonitor::shared();
        let calculator = EconomicCalculator::new(EconomicModel::default(), monitor.clone());
        let params = EconomicParams {
            power_cost: 0.0,
            ..Default::default()
        };

        let err = calculator.calculate(&params).unwrap_err();
        assert_eq!(err.error_code(), "CALCULATION_FAILED");
        assert_eq!(monitor.operations_with_status(OperationStatus::Failure).len(), 1);
    }
}
