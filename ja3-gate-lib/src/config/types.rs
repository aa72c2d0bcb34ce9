use serde::Deserialize;
use std::net::SocketAddr;

use super::ja3::Ja3Config;
use super::tls::TlsConfig;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Address and port to listen on
    /// Example: "0.0.0.0:8443" or "127.0.0.1:8080"
    pub listen: SocketAddr,
    /// Backend server that receives allowed requests (host:port format)
    /// Example: "127.0.0.1:9000"
    pub backend: String,
    /// JA3 classification and enforcement
    #[serde(default)]
    pub ja3: Ja3Config,
    /// TLS termination configuration (optional)
    /// Without TLS no handshake is ever observed, so every request passes
    /// through without JA3 headers.
    /// Default: None
    #[serde(default)]
    pub tls: Option<TlsConfig>,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Timeout configuration
    #[serde(default)]
    pub timeout: TimeoutConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Hot reload of the `[ja3]` section
    #[serde(default)]
    pub reload: ReloadConfig,
}

/// Logging configuration
/// Controls application-level structured logging (stdout/stderr)
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    /// Default: "info"
    /// Can be overridden at runtime via RUST_LOG environment variable
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Show module path (target) in log messages
    /// Default: false
    #[serde(default)]
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), show_target: false }
    }
}

/// Timeout configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Maximum time allowed for a client to complete the TLS handshake
    /// Default: 10
    #[serde(default = "default_tls_handshake_timeout")]
    pub tls_handshake_secs: u64,
    /// Graceful shutdown timeout in seconds
    /// Default: 30
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            tls_handshake_secs: default_tls_handshake_timeout(),
            shutdown_secs: default_shutdown_timeout(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Metrics server port (optional)
    /// If provided, starts a separate HTTP server on this port serving
    /// `/metrics` (Prometheus) and `/health`
    /// Default: None (metrics disabled)
    #[serde(default)]
    pub metrics_port: Option<u16>,
    /// OpenTelemetry internal log level
    /// Default: "warn"
    #[serde(default = "default_otel_log_level")]
    pub otel_log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { metrics_port: None, otel_log_level: default_otel_log_level() }
    }
}

/// Configuration reload settings
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ReloadConfig {
    /// Watch the configuration file and apply `[ja3]` changes without a restart.
    /// Other sections are only read at startup.
    /// Default: false
    #[serde(default)]
    pub watch: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_otel_log_level() -> String {
    "warn".to_string()
}

fn default_tls_handshake_timeout() -> u64 {
    10
}

fn default_shutdown_timeout() -> u64 {
    30
}
