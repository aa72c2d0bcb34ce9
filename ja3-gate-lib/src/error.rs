use thiserror::Error;

/// Errors that can occur while configuring or running the gate
#[derive(Error, Debug)]
pub enum GateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    #[error("No private key found in key file")]
    NoPrivateKey,
}

pub type Result<T> = std::result::Result<T, GateError>;
