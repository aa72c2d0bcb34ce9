use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use prometheus::{Encoder, Registry, TextEncoder};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::{GateError, Result};
use crate::proxy::synthetic_response::RespBody;

/// Start the observability server
///
/// Serves `/metrics` (Prometheus text format) and `/health`.
pub async fn start_observability_server(port: u16, registry: Registry) -> Result<()> {
    let registry = Arc::new(registry);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(?addr, "Observability server started");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Observability server: accept error");
                continue;
            }
        };

        let registry = registry.clone();
        tokio::spawn(async move {
            let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
                let registry = registry.clone();
                async move {
                    let result = match req.uri().path() {
                        "/metrics" => metrics_response(&registry),
                        "/health" => health_response(),
                        _ => text_response(StatusCode::NOT_FOUND, "Not Found"),
                    };
                    Ok::<_, hyper::Error>(result.unwrap_or_else(|e| {
                        warn!(error = %e, "Observability server: failed to build response");
                        let mut resp = Response::new(full(Bytes::from("Internal Server Error")));
                        *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                        resp
                    }))
                }
            });

            let builder = ConnBuilder::new(TokioExecutor::new());
            if let Err(e) = builder.serve_connection(TokioIo::new(stream), svc).await {
                warn!(?peer, error = %e, "Observability server: serve_connection error");
            }
        });
    }
}

fn metrics_response(registry: &Registry) -> Result<Response<RespBody>> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&registry.gather(), &mut buffer)
        .map_err(|e| GateError::Http(format!("Failed to encode metrics: {e}")))?;

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", encoder.format_type())
        .body(full(Bytes::from(buffer)))
        .map_err(|e| GateError::Http(format!("Failed to build response: {e}")))
}

fn health_response() -> Result<Response<RespBody>> {
    let body = serde_json::to_vec(&json!({"status": "healthy"}))
        .map_err(|e| GateError::Http(format!("Failed to serialize health response: {e}")))?;

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(full(Bytes::from(body)))
        .map_err(|e| GateError::Http(format!("Failed to build health response: {e}")))
}

fn text_response(status: StatusCode, text: &'static str) -> Result<Response<RespBody>> {
    Response::builder()
        .status(status)
        .body(full(Bytes::from(text)))
        .map_err(|e| GateError::Http(format!("Failed to build response: {e}")))
}

fn full(bytes: Bytes) -> RespBody {
    Full::new(bytes).map_err(|never| match never {}).boxed()
}
