use http::StatusCode;
use thiserror::Error;

/// Why a request was refused by the JA3 gate
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Strict enforcement is on and the hash is not in the database
    #[error("failed fingerprint test: {ja3}")]
    UnrecognizedFingerprint { ja3: String },
}

impl Rejection {
    /// Status code the client receives
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::UnrecognizedFingerprint { .. } => StatusCode::FORBIDDEN,
        }
    }

    /// Stable identifier for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::UnrecognizedFingerprint { .. } => "unrecognized_fingerprint",
        }
    }

    /// The hash that caused the rejection
    pub fn ja3(&self) -> &str {
        match self {
            Rejection::UnrecognizedFingerprint { ja3 } => ja3,
        }
    }
}

/// Outcome of running the gate for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No completed TLS handshake; the request is left untouched
    PassThrough,
    /// No hash cached for the connection yet; allowed without labels
    Unlabeled,
    /// Allowed, carrying the raw hash and, under strict enforcement, the
    /// classified client family
    Annotated { ja3: String, browser: Option<String> },
    /// Refused; nothing downstream may run
    Rejected(Rejection),
}

impl Decision {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Decision::Rejected(_))
    }

    /// Metric label for this outcome
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::PassThrough => "pass_through",
            Decision::Unlabeled => "cache_miss",
            Decision::Annotated { browser: None, .. } => "annotated",
            Decision::Annotated { browser: Some(_), .. } => "classified",
            Decision::Rejected(_) => "rejected",
        }
    }
}
