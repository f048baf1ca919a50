//! Admission Controller Configuration.
//!
//! Configurable parameters for the ISP admission controller. Default values
//! favor safety: the default violation strategy is log-only, so enabling the
//! webhook in a cluster never silently starts blocking workloads until an
//! operator opts into enforcement.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which collaborator backs the [`crate::policy::PolicyFetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyBackend {
    /// Read `{namespace}.toml` files from a directory.
    File,
    /// Fixtures only; used for local dry runs and tests.
    Static,
}

/// Which strategy converts accumulated violations into a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationStrategyKind {
    /// Log every violation, always allow. Safe default for rollout.
    LogOnly,
    /// Deny on the first violation.
    Block,
}

/// Main configuration for the admission controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    // === Network ===
    /// Port for the HTTPS/HTTP admission webhook and observability server.
    pub listen_port: u16,

    // === Policy source ===
    /// Backend the policy fetcher reads ISPs from.
    pub policy_backend: PolicyBackend,

    /// Directory holding `{namespace}.toml` policy files, when
    /// `policy_backend = file`.
    pub policy_dir: String,

    // === Metadata source ===
    /// Base URL of the vulnerability/build metadata service.
    pub metadata_base_url: String,

    // === Enforcement ===
    /// How accumulated violations become an allow/deny decision.
    pub violation_strategy: ViolationStrategyKind,

    /// Annotation key whose presence bypasses ISP evaluation for one object.
    pub breakglass_annotation_key: String,

    /// Maximum time, in milliseconds, the HTTP handler waits on the reviewer
    /// before treating the request as a cancellation error (fail-closed).
    pub request_timeout_ms: u64,

    // === Observability ===
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            listen_port: 8443,

            policy_backend: PolicyBackend::File,
            policy_dir: "./policies".to_string(),

            metadata_base_url: "http://localhost:9090".to_string(),

            violation_strategy: ViolationStrategyKind::LogOnly,
            breakglass_annotation_key: crate::BREAKGLASS_ANNOTATION_KEY.to_string(),
            request_timeout_ms: 10_000,

            log_level: "info".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    // Builder-style methods for CLI overrides.

    pub fn with_listen_port(mut self, port: u16) -> Self {
        self.listen_port = port;
        self
    }

    pub fn with_policy_dir(mut self, dir: String) -> Self {
        self.policy_dir = dir;
        self
    }

    pub fn with_metadata_base_url(mut self, url: String) -> Self {
        self.metadata_base_url = url;
        self
    }

    pub fn with_violation_strategy(mut self, strategy: ViolationStrategyKind) -> Self {
        self.violation_strategy = strategy;
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.breakglass_annotation_key.is_empty() {
            anyhow::bail!("breakglass_annotation_key must not be empty");
        }

        if self.policy_backend == PolicyBackend::File && self.policy_dir.is_empty() {
            anyhow::bail!("policy_dir must be set when policy_backend = file");
        }

        if self.request_timeout_ms == 0 {
            anyhow::bail!("request_timeout_ms must be greater than zero");
        }

        Ok(())
    }
}
