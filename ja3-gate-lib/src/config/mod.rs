mod ja3;
mod loader;
mod tls;
mod types;
pub mod watcher;

pub use ja3::Ja3Config;
pub use loader::{load_from_path, load_from_str};
pub use tls::TlsConfig;
pub use types::{Config, LoggingConfig, ReloadConfig, TelemetryConfig, TimeoutConfig};
pub use watcher::{reload_enforcement, watch_enforcement, ConfigWatcher};
