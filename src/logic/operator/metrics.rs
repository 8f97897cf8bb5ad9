//! Operator metrics and status snapshot

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logic::model::{MllibModel, ModelHost};

#[derive(Debug, Default)]
pub struct OperatorMetrics {
    processed: AtomicU64,
    submitted: AtomicU64,
    dropped: AtomicU64,
    control_messages: AtomicU64,
    latency_sum_us: AtomicU64,
}

impl OperatorMetrics {
    fn record(&self, elapsed: Duration) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_submitted(&self, elapsed: Duration) {
        self.record(elapsed);
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, elapsed: Duration) {
        self.record(elapsed);
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_control(&self) {
        self.control_messages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn control_messages(&self) -> u64 {
        self.control_messages.load(Ordering::Relaxed)
    }

    fn avg_latency_us(&self) -> f64 {
        let count = self.processed();
        if count == 0 {
            return 0.0;
        }
        self.latency_sum_us.load(Ordering::Relaxed) as f64 / count as f64
    }
}

/// Status for logs and monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorStatus {
    pub operator: String,
    pub analysis: String,
    pub model_path: String,
    pub model_checksum: String,
    pub model_loaded_at: chrono::DateTime<chrono::Utc>,
    pub tuples_processed: u64,
    pub tuples_submitted: u64,
    pub tuples_dropped: u64,
    pub control_messages: u64,
    pub reloads: u64,
    pub reload_failures: u64,
    pub avg_latency_us: f64,
}

impl OperatorStatus {
    pub fn collect<M: MllibModel>(
        operator: &str,
        analysis: &str,
        metrics: &OperatorMetrics,
        host: &ModelHost<M>,
    ) -> Self {
        let metadata = host.metadata();
        Self {
            operator: operator.to_string(),
            analysis: analysis.to_string(),
            model_path: metadata.model_path,
            model_checksum: metadata.checksum,
            model_loaded_at: metadata.loaded_at,
            tuples_processed: metrics.processed(),
            tuples_submitted: metrics.submitted(),
            tuples_dropped: metrics.dropped(),
            control_messages: metrics.control_messages(),
            reloads: host.reload_count(),
            reload_failures: host.reload_failure_count(),
            avg_latency_us: metrics.avg_latency_us(),
        }
    }
}
