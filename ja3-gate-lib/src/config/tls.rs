use serde::Deserialize;

/// TLS termination configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TlsConfig {
    /// Path to TLS certificate file (PEM format)
    /// File must exist and be readable at startup
    pub cert_path: String,
    /// Path to TLS private key file (PEM format)
    /// File must exist and be readable at startup
    pub key_path: String,
    /// Application-Layer Protocol Negotiation (ALPN) protocols
    /// Common values: ["h2", "http/1.1"]
    /// Default: empty (h2 and http/1.1 are advertised)
    #[serde(default)]
    pub alpn: Vec<String>,
}
