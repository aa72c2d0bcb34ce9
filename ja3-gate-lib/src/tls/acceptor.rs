use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use std::sync::Arc;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

use crate::config::TlsConfig;
use crate::error::{GateError, Result};

/// Builds a TLS acceptor from configuration
///
/// Advertises `h2` and `http/1.1` when no ALPN list is configured.
pub fn build_tls_acceptor(cfg: &TlsConfig) -> Result<TlsAcceptor> {
    let certs = {
        let bytes = std::fs::read(&cfg.cert_path)
            .map_err(|e| GateError::Tls(format!("Failed to read certificate: {e}")))?;
        CertificateDer::pem_slice_iter(&bytes)
            .collect::<std::result::Result<Vec<_>, rustls_pki_types::pem::Error>>()
            .map_err(|e| GateError::Tls(format!("Failed to parse certificates: {e}")))?
    };
    if certs.is_empty() {
        return Err(GateError::Tls("No certificates found".to_string()));
    }

    let key = {
        let bytes = std::fs::read(&cfg.key_path)
            .map_err(|e| GateError::Tls(format!("Failed to read key: {e}")))?;
        let mut keys: Vec<PrivateKeyDer<'_>> = PrivateKeyDer::pem_slice_iter(&bytes)
            .collect::<std::result::Result<Vec<_>, rustls_pki_types::pem::Error>>()
            .map_err(|e| GateError::Tls(format!("Failed to parse private key: {e}")))?;
        let Some(k) = keys.pop() else {
            return Err(GateError::NoPrivateKey);
        };
        k
    };

    let mut server = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| GateError::Tls(format!("Failed to build TLS config: {e}")))?;

    server.alpn_protocols = if cfg.alpn.is_empty() {
        vec![b"h2".to_vec(), b"http/1.1".to_vec()]
    } else {
        cfg.alpn.iter().map(|s| s.as_bytes().to_vec()).collect()
    };

    Ok(TlsAcceptor::from(Arc::new(server)))
}
