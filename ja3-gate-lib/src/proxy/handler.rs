use http::{Request, Response, StatusCode};
use hyper::body::{Body, Incoming};
use std::sync::Arc;
use tracing::warn;

use crate::enforcement::Ja3Engine;
use crate::proxy::connection::ConnectionInfo;
use crate::proxy::forwarding::{add_forwarded_headers, create_client, forward, HttpClient};
use crate::proxy::http_result::{HttpError, HttpResult};
use crate::proxy::synthetic_response::{empty_body, synthetic_error_response, RespBody};
use crate::telemetry::Metrics;

/// Shared state for handling requests on every connection
pub struct ProxyContext<B = Incoming> {
    pub engine: Arc<Ja3Engine>,
    pub backend: String,
    pub client: HttpClient<B>,
    pub metrics: Option<Arc<Metrics>>,
}

impl<B> ProxyContext<B>
where
    B: Body + Send,
    B::Data: Send,
{
    pub fn new(engine: Arc<Ja3Engine>, backend: String, metrics: Option<Arc<Metrics>>) -> Self {
        Self { engine, backend, client: create_client(), metrics }
    }
}

/// Runs the JA3 gate on a request and forwards it if allowed
///
/// A rejected request never reaches the backend.
pub async fn handle_request<B>(
    mut req: Request<B>,
    conn: ConnectionInfo,
    ctx: &ProxyContext<B>,
) -> HttpResult<Response<RespBody>>
where
    B: Body + Send + Unpin + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    ctx.engine.process(&mut req, &conn)?;

    add_forwarded_headers(req.headers_mut(), conn.peer, conn.handshake_complete);

    forward(req, &ctx.backend, &ctx.client).await
}

/// Handles a request and turns any failure into a synthetic response
pub async fn respond<B>(
    req: Request<B>,
    conn: ConnectionInfo,
    ctx: &ProxyContext<B>,
) -> Response<RespBody>
where
    B: Body + Send + Unpin + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match handle_request(req, conn, ctx).await {
        Ok(resp) => resp,
        Err(e) => {
            match &e {
                HttpError::Rejected(rejection) => warn!(
                    peer = %conn.peer,
                    ja3 = rejection.ja3(),
                    reason = rejection.reason(),
                    error = %rejection,
                    "request rejected"
                ),
                other => {
                    warn!(peer = %conn.peer, error = %other, "request failed");
                    if let Some(ref m) = ctx.metrics {
                        m.record_error(other.error_type());
                    }
                }
            }
            let status: StatusCode = e.into();
            synthetic_error_response(status).unwrap_or_else(|_| {
                let mut resp = Response::new(empty_body());
                *resp.status_mut() = status;
                resp
            })
        }
    }
}
