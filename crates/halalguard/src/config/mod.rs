use std::env;
use std::fmt;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the dashboard core.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub api: ApiConfig,
    pub socket: SocketConfig,
    pub monitor: MonitorConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = env::var("HALALGUARD_API_URL")
            .unwrap_or_else(|_| "http://localhost:8087/api".to_string());
        let socket_url = env::var("HALALGUARD_WS_URL")
            .unwrap_or_else(|_| "ws://localhost:8087/ws".to_string());

        let mode = match env::var("HALALGUARD_MONITOR_MODE") {
            Ok(value) => MonitorMode::from_str(&value)
                .ok_or(ConfigError::InvalidMonitorMode { value })?,
            Err(_) => MonitorMode::Remote,
        };

        let poll_secs = env::var("HALALGUARD_POLL_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidPollInterval)?;

        let window = env::var("HALALGUARD_WINDOW")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<usize>()
            .ok()
            .filter(|len| *len > 0)
            .ok_or(ConfigError::InvalidWindow)?;

        let log_level = env::var("HALALGUARD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        // Color codes would corrupt captured logs outside a dev terminal.
        let ansi = environment == AppEnvironment::Development;

        Ok(Self {
            environment,
            api: ApiConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
            },
            socket: SocketConfig { url: socket_url },
            monitor: MonitorConfig {
                mode,
                poll_interval: Duration::from_secs(poll_secs),
                window,
            },
            telemetry: TelemetryConfig { log_level, ansi },
        })
    }
}

/// Base address of the remote analysis service.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

/// Push-notification socket endpoint.
#[derive(Debug, Clone)]
pub struct SocketConfig {
    pub url: String,
}

/// Which metrics provider feeds the monitoring view.
///
/// Remote polling is the canonical behavior; the simulated generator is an
/// explicit opt-in demo fallback, never silently mixed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorMode {
    Remote,
    Simulated,
}

impl MonitorMode {
    fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote" => Some(Self::Remote),
            "simulated" | "demo" => Some(Self::Simulated),
            _ => None,
        }
    }
}

/// Settings for the metrics refresh loop.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub mode: MonitorMode,
    pub poll_interval: Duration,
    /// Rolling time-series window length, in samples.
    pub window: usize,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// ANSI color in log output, enabled only for development terminals.
    pub ansi: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPollInterval,
    InvalidWindow,
    InvalidMonitorMode { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPollInterval => {
                write!(f, "HALALGUARD_POLL_SECS must be a positive integer")
            }
            ConfigError::InvalidWindow => {
                write!(f, "HALALGUARD_WINDOW must be a positive integer")
            }
            ConfigError::InvalidMonitorMode { value } => {
                write!(
                    f,
                    "HALALGUARD_MONITOR_MODE must be 'remote' or 'simulated', got '{value}'"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
