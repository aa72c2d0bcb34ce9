//! Shared helpers for integration tests
#![allow(dead_code)]

use std::convert::Infallible;
use std::fs;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper::Response;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use ja3_gate_lib::fingerprinting::names;
use ja3_gate_lib::FingerprintCache;
use tempfile::NamedTempFile;
use tokio::net::TcpListener;

pub type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub const CHROME: &str = "aa56c057ad164ec4fdcb7a5a283be9fc";
pub const UNKNOWN: &str = "0000000000000000000000000000dead";

/// Cache that returns the same hash for every connection
pub struct StaticCache(pub Option<String>);

impl StaticCache {
    pub fn hit(ja3: &str) -> Self {
        Self(Some(ja3.to_string()))
    }

    pub fn miss() -> Self {
        Self(None)
    }
}

impl FingerprintCache for StaticCache {
    fn lookup(&self, _identity: &str) -> Option<String> {
        self.0.clone()
    }
}

pub struct EchoBackend {
    pub addr: SocketAddr,
    pub requests: Arc<AtomicUsize>,
}

impl EchoBackend {
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Backend that copies every `ja3` and `browser` request header into the
/// response, and counts the requests it receives
pub async fn spawn_echo_backend() -> TestResult<EchoBackend> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let svc = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async move {
                        let mut resp = Response::new(Full::new(Bytes::from("ok")));
                        for name in [names::JA3, names::BROWSER] {
                            for value in req.headers().get_all(name) {
                                resp.headers_mut().append(name, value.clone());
                            }
                        }
                        Ok::<_, Infallible>(resp)
                    }
                });
                let _ = ConnBuilder::new(TokioExecutor::new())
                    .serve_connection(TokioIo::new(stream), svc)
                    .await;
            });
        }
    });

    Ok(EchoBackend { addr, requests })
}

/// Self-signed certificate and key for `localhost`, written as PEM files
pub fn write_test_cert() -> TestResult<(NamedTempFile, NamedTempFile)> {
    let rcgen::CertifiedKey { cert, signing_key } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()])?;
    let cert_file = NamedTempFile::new()?;
    let key_file = NamedTempFile::new()?;
    fs::write(cert_file.path(), cert.pem())?;
    fs::write(key_file.path(), signing_key.serialize_pem())?;
    Ok((cert_file, key_file))
}
