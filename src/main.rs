//! ISP Admission Controller
//!
//! Kubernetes admission webhook that gates workload creation and mutation on
//! namespace-scoped Image Security Policies: vulnerability severity
//! thresholds, CVE and image allowlists, build provenance, and attestation
//! shortcuts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                ISP ADMISSION CONTROLLER                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  POST /validate   ←── AdmissionReview webhook requests       │
//! │  Policy Fetcher   ←── ISPs per namespace (file or static)    │
//! │  Metadata Client  ←── vulnerabilities + builds per digest    │
//! │  Registry Client  ←── tag → digest resolution                │
//! │  Attestation      ←── out-of-scope signer/verifier boundary  │
//! │  GET  /metrics    ←── Prometheus + JSON observability        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use isp_admission_controller::api::{self, Metrics};
use isp_admission_controller::attestation::NoAuthorities;
use isp_admission_controller::config::{ControllerConfig, PolicyBackend, ViolationStrategyKind};
use isp_admission_controller::metadata::HttpMetadataClient;
use isp_admission_controller::policy::{FilePolicyFetcher, InMemoryPolicyFetcher, PolicyFetcher};
use isp_admission_controller::resolver::HttpRegistryClient;
use isp_admission_controller::reviewer::{BlockStrategy, LogOnlyStrategy, Reviewer, ViolationStrategy};

/// ISP Admission Controller - gates workloads on Image Security Policies
#[derive(Parser, Debug)]
#[command(name = "isp-admission-controller")]
#[command(author = "ISP Admission Controller Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Admission webhook enforcing Image Security Policies", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "isp-admission.toml")]
    config: PathBuf,

    /// Port for the admission webhook and observability server
    #[arg(long)]
    listen_port: Option<u16>,

    /// Directory of `{namespace}.toml` policy files (file backend)
    #[arg(long)]
    policy_dir: Option<String>,

    /// Base URL of the vulnerability/build metadata service
    #[arg(long)]
    metadata_base_url: Option<String>,

    /// Maximum time, in milliseconds, an admission request may take before
    /// it is denied as a cancellation (fail-closed)
    #[arg(long)]
    request_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .init();

    info!("ISP Admission Controller v{}", env!("CARGO_PKG_VERSION"));

    let mut config = if args.config.exists() {
        ControllerConfig::load(&args.config)?
    } else {
        warn!("config file not found, using defaults");
        ControllerConfig::default()
    };

    if let Some(port) = args.listen_port {
        config = config.with_listen_port(port);
    }
    if let Some(dir) = args.policy_dir {
        config = config.with_policy_dir(dir);
    }
    if let Some(url) = args.metadata_base_url {
        config = config.with_metadata_base_url(url);
    }
    if let Some(timeout_ms) = args.request_timeout_ms {
        config = config.with_request_timeout_ms(timeout_ms);
    }

    config.validate()?;

    info!("configuration:");
    info!("   listen port: {}", config.listen_port);
    info!("   policy backend: {:?}", config.policy_backend);
    info!("   violation strategy: {:?}", config.violation_strategy);

    let policy_fetcher: Arc<dyn PolicyFetcher> = match config.policy_backend {
        PolicyBackend::File => Arc::new(FilePolicyFetcher::new(config.policy_dir.clone())),
        PolicyBackend::Static => Arc::new(InMemoryPolicyFetcher::new()),
    };

    let metadata_client = Arc::new(HttpMetadataClient::new(config.metadata_base_url.clone()));
    let registry_client = Arc::new(HttpRegistryClient::new());
    let attestation_authority = Arc::new(NoAuthorities);

    let violation_strategy: Arc<dyn ViolationStrategy> = match config.violation_strategy {
        ViolationStrategyKind::LogOnly => Arc::new(LogOnlyStrategy),
        ViolationStrategyKind::Block => Arc::new(BlockStrategy),
    };

    let reviewer = Arc::new(Reviewer::new(
        policy_fetcher,
        metadata_client,
        registry_client,
        attestation_authority,
        violation_strategy,
    ));

    let metrics = Arc::new(Metrics::new());

    info!("admission controller starting");
    api::run_api_server(config.listen_port, reviewer, metrics, config.request_timeout_ms).await?;

    info!("admission controller shutting down");
    Ok(())
}
