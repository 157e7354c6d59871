pub mod advisor; // Language-model collaborators (Ollama)
pub mod catalog; // Blood test reference catalog
pub mod chat;
pub mod classify; // Range classifier + scan heuristic
pub mod config;
pub mod dashboard; // Session store, lifecycles, events
pub mod models;
pub mod panel; // Form coercion

pub use dashboard::{Completion, Dashboard, DashboardError, DashboardEvent, DashboardSnapshot};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}

/// Dashboard wired to a local Ollama instance, configured from the
/// environment.
pub fn connect_local() -> Dashboard {
    let settings = config::OllamaSettings::from_env();
    Dashboard::with_ollama(config::DashboardConfig::default(), &settings)
}
