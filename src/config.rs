use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Hepatolens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulated latency of the panel classification step.
pub const PANEL_ANALYSIS_DELAY: Duration = Duration::from_millis(1500);
/// Simulated latency of the scan classification step.
pub const SCAN_ANALYSIS_DELAY: Duration = Duration::from_millis(2000);

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "medgemma:latest";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub const ENV_OLLAMA_URL: &str = "HEPATOLENS_OLLAMA_URL";
pub const ENV_MODEL: &str = "HEPATOLENS_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "HEPATOLENS_TIMEOUT_SECS";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "hepatolens_lib=info,warn"
}

/// Dashboard behaviour knobs.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub panel_delay: Duration,
    pub scan_delay: Duration,
    /// Request insights as soon as both panel and scan succeed.
    pub auto_insights: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            panel_delay: PANEL_ANALYSIS_DELAY,
            scan_delay: SCAN_ANALYSIS_DELAY,
            auto_insights: true,
        }
    }
}

impl DashboardConfig {
    /// No simulated latency and no auto-triggered insights.
    pub fn immediate() -> Self {
        Self {
            panel_delay: Duration::ZERO,
            scan_delay: Duration::ZERO,
            auto_insights: false,
        }
    }

    pub fn with_auto_insights(mut self, enabled: bool) -> Self {
        self.auto_insights = enabled;
        self
    }
}

/// Where the language-model collaborator lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OllamaSettings {
    /// Defaults overridden by `HEPATOLENS_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(url) = lookup(ENV_OLLAMA_URL).filter(|v| !v.trim().is_empty()) {
            settings.base_url = url.trim().to_string();
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            settings.model = model.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => settings.timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "ignoring invalid {ENV_TIMEOUT_SECS}"),
            }
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_name_is_hepatolens() {
        assert_eq!(APP_NAME, "Hepatolens");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn default_delays_match_dashboard_timing() {
        let config = DashboardConfig::default();
        assert_eq!(config.panel_delay, Duration::from_millis(1500));
        assert_eq!(config.scan_delay, Duration::from_millis(2000));
        assert!(config.auto_insights);
    }

    #[test]
    fn immediate_config_has_no_latency() {
        let config = DashboardConfig::immediate();
        assert!(config.panel_delay.is_zero());
        assert!(!config.auto_insights);
        assert!(config.with_auto_insights(true).auto_insights);
    }

    #[test]
    fn settings_default_without_env() {
        let settings = OllamaSettings::from_lookup(lookup(&[]));
        assert_eq!(settings, OllamaSettings::default());
        assert_eq!(settings.base_url, "http://localhost:11434");
    }

    #[test]
    fn settings_read_overrides() {
        let settings = OllamaSettings::from_lookup(lookup(&[
            (ENV_OLLAMA_URL, "http://gpu-box:11434"),
            (ENV_MODEL, "llama3:8b"),
            (ENV_TIMEOUT_SECS, "60"),
        ]));
        assert_eq!(settings.base_url, "http://gpu-box:11434");
        assert_eq!(settings.model, "llama3:8b");
        assert_eq!(settings.timeout_secs, 60);
    }

    #[test]
    fn invalid_timeout_keeps_default() {
        let settings = OllamaSettings::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")]));
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
        let zero = OllamaSettings::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "0")]));
        assert_eq!(zero.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
