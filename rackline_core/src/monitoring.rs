//! # Monitoring
//!
//! Operation logs and performance metrics emitted by the calculators, the
//! calculation service and the layout editor.
//!
//! The [`Monitor`] trait is fire-and-forget: implementations must swallow
//! their own failures so that monitoring never changes the outcome of a
//! calculation or a save.
//!
//! - [`TracingMonitor`] forwards everything to `tracing` (the default).
//! - [`MemoryMonitor`] keeps events in memory for tests and diagnostics.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Outcome recorded with an operation log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Success,
    Warning,
    Failure,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Success => "success",
            OperationStatus::Warning => "warning",
            OperationStatus::Failure => "failure",
        }
    }
}

/// One operation log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationLog {
    /// Subsystem, e.g. "calculation" or "layout"
    #[serde(rename = "type")]
    pub kind: String,
    /// What was attempted, e.g. "power" or "autosave"
    pub action: String,
    pub status: OperationStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl OperationLog {
    /// New entry stamped with the current time
    pub fn new(
        kind: impl Into<String>,
        action: impl Into<String>,
        status: OperationStatus,
    ) -> Self {
        OperationLog {
            kind: kind.into(),
            action: action.into(),
            status,
            timestamp: Utc::now(),
            error: None,
            details: None,
        }
    }

    /// Attach an error message (builder pattern)
    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }

    /// Attach structured details (builder pattern)
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Timing (and optionally heap) sample for one operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetric {
    /// Operation name
    pub operation: String,
    /// Duration in milliseconds
    pub operation_duration: f64,
    /// Heap in use after the operation (bytes), when a probe is available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

impl PerformanceMetric {
    pub fn new(
        operation: impl Into<String>,
        duration: Duration,
        memory_usage: Option<u64>,
    ) -> Self {
        PerformanceMetric {
            operation: operation.into(),
            operation_duration: duration.as_secs_f64() * 1000.0,
            memory_usage,
            timestamp: Utc::now(),
        }
    }
}

/// Sink for operation logs and performance metrics.
pub trait Monitor: Send + Sync {
    fn log_operation(&self, entry: OperationLog);

    fn log_performance_metric(&self, metric: PerformanceMetric);
}

/// Monitor that emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMonitor;

impl Monitor for TracingMonitor {
    fn log_operation(&self, entry: OperationLog) {
        let error = entry.error.as_deref().unwrap_or("");
        match entry.status {
            OperationStatus::Success => tracing::info!(
                kind = %entry.kind,
                action = %entry.action,
                status = entry.status.as_str(),
                "operation completed"
            ),
            OperationStatus::Warning => tracing::warn!(
                kind = %entry.kind,
                action = %entry.action,
                status = entry.status.as_str(),
                error,
                "operation completed with warning"
            ),
            OperationStatus::Failure => tracing::error!(
                kind = %entry.kind,
                action = %entry.action,
                status = entry.status.as_str(),
                error,
                "operation failed"
            ),
        }
    }

    fn log_performance_metric(&self, metric: PerformanceMetric) {
        tracing::debug!(
            operation = %metric.operation,
            duration_ms = metric.operation_duration,
            memory_bytes = metric.memory_usage.unwrap_or_default(),
            "performance metric"
        );
    }
}

/// Monitor that records every event in memory.
#[derive(Debug, Default)]
pub struct MemoryMonitor {
    operations: Mutex<Vec<OperationLog>>,
    metrics: Mutex<Vec<PerformanceMetric>>,
}

impl MemoryMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle, ready to hand to a calculator or editor
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn operations(&self) -> Vec<OperationLog> {
        self.operations.lock().clone()
    }

    pub fn metrics(&self) -> Vec<PerformanceMetric> {
        self.metrics.lock().clone()
    }

    /// Operation logs with the given status
    pub fn operations_with_status(&self, status: OperationStatus) -> Vec<OperationLog> {
        self.operations
            .lock()
            .iter()
            .filter(|entry| entry.status == status)
            .cloned()
            .collect()
    }
}

impl Monitor for MemoryMonitor {
    fn log_operation(&self, entry: OperationLog) {
        self.operations.lock().push(entry);
    }

    fn log_performance_metric(&self, metric: PerformanceMetric) {
        self.metrics.lock().push(metric);
    }
}

/// Heap usage sampler. Platform specific, so it is injected.
pub trait MemoryProbe: Send + Sync {
    /// Bytes currently in use, if known
    fn heap_used_bytes(&self) -> Option<u64>;
}

/// Probe that never reports a value.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMemoryProbe;

impl MemoryProbe for NoopMemoryProbe {
    fn heap_used_bytes(&self) -> Option<u64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_log_serialization() {
        let entry = OperationLog::new("calculation", "power", OperationStatus::Failure)
            .with_error("Validation failed: Voltage must be positive");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "calculation");
        assert_eq!(json["status"], "failure");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_metric_duration_in_ms() {
        let metric = PerformanceMetric::new("cooling", Duration::from_millis(250), Some(1024));
        assert!((metric.operation_duration - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_memory_monitor_records() {
        let monitor = MemoryMonitor::new();
        monitor.log_operation(OperationLog::new("layout", "autosave", OperationStatus::Success));
        monitor.log_operation(OperationLog::new("layout", "autosave", OperationStatus::Failure));
        monitor.log_performance_metric(PerformanceMetric::new("power", Duration::ZERO, None));

        assert_eq!(monitor.operations().len(), 2);
        assert_eq!(monitor.operations_with_status(OperationStatus::Failure).len(), 1);
        assert_eq!(monitor.metrics().len(), 1);
    }

    #[test]
    fn test_tracing_monitor_does_not_panic() {
        let monitor = TracingMonitor;
        monitor.log_operation(
            OperationLog::new("calculation", "economic", OperationStatus::Warning)
                .with_details(serde_json::json!({"durationMs": 1200.0})),
        );
        monitor.log_performance_metric(PerformanceMetric::new("economic", Duration::ZERO, None));
    }
}
