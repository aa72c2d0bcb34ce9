#![forbid(unsafe_code)]

pub mod config;
pub mod enforcement;
pub mod error;
pub mod fingerprinting;
pub mod proxy;
pub mod telemetry;
pub mod tls;

pub use config::{load_from_path, Config, Ja3Config, TlsConfig};
pub use enforcement::{Decision, EnforcementMode, Ja3Engine, Rejection};
pub use error::{GateError, Result};
pub use fingerprinting::{names, FingerprintCache, FingerprintDatabase, MemoryCache};
pub use proxy::{run, ConnectionInfo};
pub use tls::build_tls_acceptor;
