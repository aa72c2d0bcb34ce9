use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{GateError, Result};

pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let txt = fs::read_to_string(p)
        .map_err(|e| GateError::Config(format!("Failed to read config file: {e}")))?;
    load_from_str(&txt)
}

/// Parses and validates a configuration document.
///
/// Unknown options and non-boolean values in `[ja3]` are reported here,
/// naming the offending token.
pub fn load_from_str(txt: &str) -> Result<Config> {
    let cfg: Config =
        toml::from_str(txt).map_err(|e| GateError::Config(format!("Failed to parse config: {e}")))?;

    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> Result<()> {
    if cfg.backend.trim().is_empty() {
        return Err(GateError::Config("backend address cannot be empty".to_string()));
    }

    if let Some(tls) = &cfg.tls {
        if !Path::new(&tls.cert_path).exists() {
            return Err(GateError::Config(format!(
                "Certificate file not found: {}",
                tls.cert_path
            )));
        }
        if !Path::new(&tls.key_path).exists() {
            return Err(GateError::Config(format!("Key file not found: {}", tls.key_path)));
        }
    }

    if cfg.timeout.tls_handshake_secs == 0 {
        return Err(GateError::Config("tls_handshake_secs must be > 0".to_string()));
    }

    Ok(())
}
