//! Startup helpers for the QA chat terminal client.

use std::process::ExitCode;
use std::sync::Arc;

use crate::api::{ApiConfig, HttpApiClient};
use crate::state::ChatCoordinator;
use crate::ui;

/// Run the client until the user quits.
///
/// Logging is silent unless `RUST_LOG` is set, so the TUI stays clean by
/// default; point `RUST_LOG` at a redirected stderr to capture logs.
///
/// # Returns
/// `ExitCode::SUCCESS` on a clean exit, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting QA chat client v{}", env!("CARGO_PKG_VERSION"));

    let config = match ApiConfig::resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid API configuration: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::info!("API endpoint: {}", config.base_url);

    let api = match HttpApiClient::new(config.clone()) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!("Failed to create API client: {e}");
            return ExitCode::from(1);
        }
    };
    let coordinator = Arc::new(ChatCoordinator::new(Arc::new(api)));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(ui::run(coordinator, &config)) {
        tracing::error!("UI error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}
