//! Metrics Collection
//!
//! Collects and exposes metrics for monitoring the admission controller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics collector for the admission controller.
#[derive(Default)]
pub struct Metrics {
    /// Start time for uptime calculation
    start_time: Option<Instant>,

    /// Total admission requests handled
    pub requests_total: AtomicU64,

    /// Requests allowed (including breakglass and pass-through)
    pub allowed_total: AtomicU64,

    /// Requests denied by a violation strategy
    pub denied_total: AtomicU64,

    /// Requests that failed with a handler error (500)
    pub errors_total: AtomicU64,

    /// Requests short-circuited by the breakglass annotation
    pub breakglass_total: AtomicU64,

    /// Requests skipped because an update introduced no new image
    pub update_skipped_total: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0)
    }

    pub fn inc_requests(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_allowed(&self) {
        self.allowed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_denied(&self) {
        self.denied_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_errors(&self) {
        self.errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_breakglass(&self) {
        self.breakglass_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_update_skipped(&self) {
        self.update_skipped_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Export metrics in Prometheus format
    pub fn to_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "# HELP isp_admission_uptime_seconds Controller uptime in seconds\n\
             # TYPE isp_admission_uptime_seconds gauge\n\
             isp_admission_uptime_seconds {}\n\n",
            self.uptime_secs()
        ));

        output.push_str(&format!(
            "# HELP isp_admission_requests_total Total admission requests handled\n\
             # TYPE isp_admission_requests_total counter\n\
             isp_admission_requests_total {}\n\n",
            self.requests_total.load(Ordering::Relaxed)
        ));

        output.push_str(&format!(
            "# HELP isp_admission_allowed_total Requests allowed\n\
             # TYPE isp_admission_allowed_total counter\n\
             isp_admission_allowed_total {}\n\n",
            self.allowed_total.load(Ordering::Relaxed)
        ));

        output.push_str(&format!(
            "# HELP isp_admission_denied_total Requests denied\n\
             # TYPE isp_admission_denied_total counter\n\
             isp_admission_denied_total {}\n\n",
            self.denied_total.load(Ordering::Relaxed)
        ));

        output.push_str(&format!(
            "# HELP isp_admission_errors_total Requests that failed with a handler error\n\
             # TYPE isp_admission_errors_total counter\n\
             isp_admission_errors_total {}\n\n",
            self.errors_total.load(Ordering::Relaxed)
        ));

        output.push_str(&format!(
            "# HELP isp_admission_breakglass_total Requests short-circuited by breakglass\n\
             # TYPE isp_admission_breakglass_total counter\n\
             isp_admission_breakglass_total {}\n\n",
            self.breakglass_total.load(Ordering::Relaxed)
        ));

        output.push_str(&format!(
            "# HELP isp_admission_update_skipped_total Updates skipped, no new image\n\
             # TYPE isp_admission_update_skipped_total counter\n\
             isp_admission_update_skipped_total {}\n\n",
            self.update_skipped_total.load(Ordering::Relaxed)
        ));

        output
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "uptime_secs": self.uptime_secs(),
            "requests_total": self.requests_total.load(Ordering::Relaxed),
            "allowed_total": self.allowed_total.load(Ordering::Relaxed),
            "denied_total": self.denied_total.load(Ordering::Relaxed),
            "errors_total": self.errors_total.load(Ordering::Relaxed),
            "breakglass_total": self.breakglass_total.load(Ordering::Relaxed),
            "update_skipped_total": self.update_skipped_total.load(Ordering::Relaxed),
        })
    }
}
