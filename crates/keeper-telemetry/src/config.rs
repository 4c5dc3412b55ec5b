//! Telemetry settings read from the environment.

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Name on the startup line.
    pub service_name: String,
    /// `EnvFilter` directive, e.g. `info` or `kl_file_loader=debug,info`.
    pub log_level: String,
    /// Write log lines to stderr at all.
    pub console_output: bool,
    /// One JSON object per line instead of human-readable output.
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "keeper-loader".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Read `KL_SERVICE_NAME`, `KL_LOG_LEVEL` (or `RUST_LOG`),
    /// `KL_CONSOLE_OUTPUT` and `KL_JSON_LOGS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    ///
    /// JSON logs default to on when running under Kubernetes or Docker.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let in_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("KL_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: lookup("KL_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            console_output: lookup("KL_CONSOLE_OUTPUT")
                .map(|v| !is_false(&v))
                .unwrap_or(defaults.console_output),
            json_logs: lookup("KL_JSON_LOGS")
                .map(|v| !is_false(&v))
                .unwrap_or(in_container),
        }
    }
}

fn is_false(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off")
}
