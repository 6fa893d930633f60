//! # Calculation Service
//!
//! Front door for the three calculators. The service owns one cached
//! calculator per domain and adds instrumentation around every call:
//!
//! - wall-clock timing and (optional) heap sampling via a [`MemoryProbe`]
//! - a bounded buffer of recent [`CalculationMetric`]s
//! - a warning to the monitor when a call exceeds the slow threshold
//! - periodic cache sweeps, by elapsed time or by call count
//!
//! ## Example
//!
//! ```rust
//! use rackline_core::calculations::service::{CalculationService, DesignInputs};
//! use rackline_core::settings::CalculationSettings;
//!
//! let service = CalculationService::new(CalculationSettings::default());
//! let summary = service.calculate_all(&DesignInputs::default()).unwrap();
//!
//! assert!(summary.power.fault_current > 0.0);
//! assert!(summary.cooling.airflow > 0.0);
//! assert!(summary.economic.pue >= 1.0);
//! assert_eq!(service.recent_metrics().len(), 3);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::calculations::cache::{
    Calculation, Calculator, CoolingCalculator, CoolingModel, EconomicCalculator, EconomicModel,
    PowerCalculator, PowerModel,
};
use crate::calculations::cooling::{CoolingParams, CoolingResult};
use crate::calculations::economic::{EconomicParams, EconomicResult};
use crate::calculations::power::{PowerParams, PowerResult};
use crate::calculations::{CalculationOutput, CalculationRequest};
use crate::errors::CalcResult;
use crate::monitoring::{
    MemoryProbe, Monitor, NoopMemoryProbe, OperationLog, OperationStatus, TracingMonitor,
};
use crate::settings::CalculationSettings;

/// Inputs for a full design pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignInputs {
    pub power: PowerParams,
    pub cooling: CoolingParams,
    pub economic: EconomicParams,
}

/// Results of a full design pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSummary {
    pub power: PowerResult,
    pub cooling: CoolingResult,
    pub economic: EconomicResult,
}

/// Instrumentation record for one service call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationMetric {
    /// "power", "cooling" or "economic"
    pub kind: String,
    pub duration_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_before: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_after: Option<u64>,
    pub succeeded: bool,
    /// Duration exceeded the slow threshold
    pub slow: bool,
    pub timestamp: DateTime<Utc>,
}

impl CalculationMetric {
    /// Heap growth across the call, when both samples exist
    pub fn memory_delta(&self) -> Option<i64> {
        match (self.memory_before, self.memory_after) {
            (Some(before), Some(after)) => Some(after as i64 - before as i64),
            _ => None,
        }
    }
}

struct SweepState {
    last_sweep: Instant,
    calls_since_sweep: u64,
}

/// Aggregating calculation service.
pub struct CalculationService {
    power: PowerCalculator,
    cooling: CoolingCalculator,
    economic: EconomicCalculator,
    monitor: Arc<dyn Monitor>,
    probe: Arc<dyn MemoryProbe>,
    settings: CalculationSettings,
    sweep: Mutex<SweepState>,
    metrics: Mutex<VecDeque<CalculationMetric>>,
}

impl CalculationService {
    /// Service reporting to `tracing`, without heap sampling.
    pub fn new(settings: CalculationSettings) -> Self {
        Self::with_monitor(settings, Arc::new(TracingMonitor))
    }

    pub fn with_monitor(settings: CalculationSettings, monitor: Arc<dyn Monitor>) -> Self {
        let economic_model = EconomicModel {
            rates: settings.economic_rates,
        };
        CalculationService {
            power: Calculator::new(PowerModel, monitor.clone()),
            cooling: Calculator::new(CoolingModel, monitor.clone()),
            economic: Calculator::new(economic_model, monitor.clone()),
            monitor,
            probe: Arc::new(NoopMemoryProbe),
            sweep: Mutex::new(SweepState {
                last_sweep: Instant::now(),
                calls_since_sweep: 0,
            }),
            metrics: Mutex::new(VecDeque::with_capacity(settings.metrics_capacity)),
            settings,
        }
    }

    /// Replace the heap sampler (builder pattern)
    pub fn with_memory_probe(mut self, probe: Arc<dyn MemoryProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn settings(&self) -> &CalculationSettings {
        &self.settings
    }

    pub fn calculate_power(&self, params: &PowerParams) -> CalcResult<PowerResult> {
        self.instrumented(&self.power, params)
    }

    pub fn calculate_cooling(&self, params: &CoolingParams) -> CalcResult<CoolingResult> {
        self.instrumented(&self.cooling, params)
    }

    pub fn calculate_economic(&self, params: &EconomicParams) -> CalcResult<EconomicResult> {
        self.instrumented(&self.economic, params)
    }

    /// Dispatch a tagged request to the matching calculator.
    pub fn calculate(&self, request: &CalculationRequest) -> CalcResult<CalculationOutput> {
        Ok(match request {
            CalculationRequest::Power(params) => {
                CalculationOutput::Power(self.calculate_power(params)?)
            }
            CalculationRequest::Cooling(params) => {
                CalculationOutput::Cooling(self.calculate_cooling(params)?)
            }
            CalculationRequest::Economic(params) => {
                CalculationOutput::Economic(self.calculate_economic(params)?)
            }
        })
    }

    /// Run all three calculators; the first failure is returned.
    pub fn calculate_all(&self, inputs: &DesignInputs) -> CalcResult<DesignSummary> {
        Ok(DesignSummary {
            power: self.calculate_power(&inputs.power)?,
            cooling: self.calculate_cooling(&inputs.cooling)?,
            economic: self.calculate_economic(&inputs.economic)?,
        })
    }

    /// Empty every calculator cache.
    pub fn clear_all_caches(&self) {
        self.power.clear_cache();
        self.cooling.clear_cache();
        self.economic.clear_cache();
        tracing::debug!("calculation caches cleared");
    }

    /// Most recent call metrics, oldest first
    pub fn recent_metrics(&self) -> Vec<CalculationMetric> {
        self.metrics.lock().iter().cloned().collect()
    }

    pub fn power_calculator(&self) -> &PowerCalculator {
        &self.power
    }

    pub fn cooling_calculator(&self) -> &CoolingCalculator {
        &self.cooling
    }

    pub fn economic_calculator(&self) -> &EconomicCalculator {
        &self.economic
    }

    /// Sweep all caches now and restart the sweep clock.
    pub fn sweep_caches(&self) {
        {
            let mut state = self.sweep.lock();
            state.last_sweep = Instant::now();
            state.calls_since_sweep = 0;
        }
        self.clear_all_caches();
        self.monitor.log_operation(OperationLog::new(
            "calculation",
            "cache_sweep",
            OperationStatus::Success,
        ));
    }

    /// Sweep on a fixed interval for as long as the service is alive.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_cache_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let service: Weak<Self> = Arc::downgrade(self);
        let period = self.settings.sweep_interval();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match service.upgrade() {
                    Some(service) => service.sweep_caches(),
                    None => break,
                }
            }
        })
    }

    fn sweep_if_due(&self) {
        let due = {
            let state = self.sweep.lock();
            let by_time = state.last_sweep.elapsed() >= self.settings.sweep_interval();
            let by_calls = self
                .settings
                .sweep_every_calls
                .is_some_and(|every| every > 0 && state.calls_since_sweep >= every);
            by_time || by_calls
        };
        if due {
            self.sweep_caches();
        }
    }

    fn instrumented<M: Calculation>(
        &self,
        calculator: &Calculator<M>,
        params: &M::Params,
    ) -> CalcResult<M::Output> {
        self.sweep_if_due();

        let memory_before = self.probe.heap_used_bytes();
        let started = Instant::now();
        let result = calculator.calculate(params);
        let elapsed = started.elapsed();
        let memory_after = self.probe.heap_used_bytes();

        let slow = elapsed > self.settings.slow_threshold();
        let metric = CalculationMetric {
            kind: M::KIND.to_string(),
            duration_ms: elapsed.as_secs_f64() * 1000.0,
            memory_before,
            memory_after,
            succeeded: result.is_ok(),
            slow,
            timestamp: Utc::now(),
        };

        if slow {
            tracing::warn!(
                kind = M::KIND,
                duration_ms = metric.duration_ms,
                threshold_ms = self.settings.slow_threshold_ms,
                "slow calculation"
            );
            self.monitor.log_operation(
                OperationLog::new("calculation", M::KIND, OperationStatus::Warning)
                    .with_error("Calculation exceeded slow threshold")
                    .with_details(serde_json::json!({
                        "durationMs": metric.duration_ms,
                        "memoryDelta": metric.memory_delta(),
                    })),
            );
        }

        self.sweep.lock().calls_since_sweep += 1;
        self.record(metric);
        result
    }

    fn record(&self, metric: CalculationMetric) {
        let capacity = self.settings.metrics_capacity;
        if capacity == 0 {
            return;
        }
        let mut metrics = self.metrics.lock();
        while metrics.len() >= capacity {
            metrics.pop_front();
        }
        metrics.push_back(metric);
    }
}

impl Default for CalculationService {
    fn default() -> Self {
        Self::new(CalculationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::MemoryMonitor;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    struct CountingProbe(AtomicU64);

    impl MemoryProbe for CountingProbe {
        fn heap_used_bytes(&self) -> Option<u64> {
            Some(self.0.fetch_add(512, Ordering::Relaxed))
        }
    }

    fn settings_with(f: impl FnOnce(&mut CalculationSettings)) -> CalculationSettings {
        let mut settings = CalculationSettings::default();
        f(&mut settings);
        settings
    }

    #[test]
    fn test_calculate_all_records_metrics() {
        let service = CalculationService::default();
        service.calculate_all(&DesignInputs::default()).unwrap();

        let kinds: Vec<_> = service.recent_metrics().into_iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec!["power", "cooling", "economic"]);
    }

    #[test]
    fn test_repeat_calls_hit_cache() {
        let service = CalculationService::default();
        let params = PowerParams::default();
        service.calculate_power(&params).unwrap();
        service.calculate_power(&params).unwrap();
        assert_eq!(service.power_calculator().computations(), 1);
    }

    #[test]
    fn test_failed_call_is_recorded() {
        let service = CalculationService::default();
        let params = CoolingParams {
            it_load: -5.0,
            ..Default::default()
        };
        assert!(service.calculate_cooling(&params).is_err());

        let metrics = service.recent_metrics();
        assert_eq!(metrics.len(), 1);
        assert!(!metrics[0].succeeded);
    }

    #[test]
    fn test_metrics_buffer_is_bounded() {
        let service = CalculationService::new(settings_with(|s| s.metrics_capacity = 2));
        let params = PowerParams::default();
        for _ in 0..5 {
            service.calculate_power(&params).unwrap();
        }
        assert_eq!(service.recent_metrics().len(), 2);
    }

    #[test]
    fn test_memory_probe_samples_each_call() {
        let service = CalculationService::default()
            .with_memory_probe(Arc::new(CountingProbe(AtomicU64::new(1024))));
        service.calculate_economic(&EconomicParams::default()).unwrap();

        let metric = &service.recent_metrics()[0];
        assert_eq!(metric.memory_before, Some(1024));
        assert_eq!(metric.memory_after, Some(1536));
        assert_eq!(metric.memory_delta(), Some(512));
    }

    #[test]
    fn test_slow_call_warns() {
        let monitor = MemoryMonitor::shared();
        // Any measurable duration exceeds a zero threshold.
        let service = CalculationService::with_monitor(
            settings_with(|s| s.slow_threshold_ms = 0),
            monitor.clone(),
        );
        service.calculate_cooling(&CoolingParams::default()).unwrap();

        let warnings = monitor.operations_with_status(OperationStatus::Warning);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].action, "cooling");
        assert!(service.recent_metrics()[0].slow);
    }

    #[test]
    fn test_fast_call_does_not_warn() {
        let monitor = MemoryMonitor::shared();
        let service =
            CalculationService::with_monitor(CalculationSettings::default(), monitor.clone());
        service.calculate_power(&PowerParams::default()).unwrap();
        assert!(monitor.operations_with_status(OperationStatus::Warning).is_empty());
    }

    #[test]
    fn test_sweep_by_call_count() {
        let service = CalculationService::new(settings_with(|s| s.sweep_every_calls = Some(2)));
        let params = PowerParams::default();

        service.calculate_power(&params).unwrap();
        service.calculate_power(&params).unwrap();
        assert_eq!(service.power_calculator().computations(), 1);

        // Third call sweeps first, so the result is recomputed.
        service.calculate_power(&params).unwrap();
        assert_eq!(service.power_calculator().computations(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_by_elapsed_time() {
        let monitor = MemoryMonitor::shared();
        let service =
            CalculationService::with_monitor(CalculationSettings::default(), monitor.clone());
        let params = CoolingParams::default();

        service.calculate_cooling(&params).unwrap();
        tokio::time::advance(Duration::from_secs(29 * 60)).await;
        service.calculate_cooling(&params).unwrap();
        assert_eq!(service.cooling_calculator().computations(), 1);

        tokio::time::advance(Duration::from_secs(2 * 60)).await;
        service.calculate_cooling(&params).unwrap();
        assert_eq!(service.cooling_calculator().computations(), 2);

        let sweeps: Vec<_> = monitor
            .operations()
            .into_iter()
            .filter(|op| op.action == "cache_sweep")
            .collect();
        assert_eq!(sweeps.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweeper() {
        let service = Arc::new(CalculationService::default());
        service.calculate_power(&PowerParams::default()).unwrap();
        assert_eq!(service.power_calculator().cached_entries(), 1);

        let handle = service.spawn_cache_sweeper();
        tokio::time::sleep(Duration::from_secs(30 * 60 + 1)).await;
        assert_eq!(service.power_calculator().cached_entries(), 0);

        handle.abort();
    }

    #[test]
    fn test_dispatch_request() {
        let service = CalculationService::default();
        let output = service
            .calculate(&CalculationRequest::Economic(EconomicParams::default()))
            .unwrap();
        assert!(matches!(output, CalculationOutput::Economic(_)));
        assert_eq!(service.economic_calculator().computations(), 1);
    }

    #[test]
    fn test_clear_all_caches() {
        let service = CalculationService::default();
        service.calculate_all(&DesignInputs::default()).unwrap();
        service.clear_all_caches();
        assert_eq!(service.power_calculator().cached_entries(), 0);
        assert_eq!(service.cooling_calculator().cached_entries(), 0);
        assert_eq!(service.economic_calculator().cached_entries(), 0);
    }
}
