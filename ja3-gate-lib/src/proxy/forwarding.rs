use http::header::HeaderValue;
use http::{HeaderMap, Request, Response, Uri, Version};
use http_body_util::BodyExt;
use hyper::body::Body;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::net::SocketAddr;
use tracing::debug;

use crate::fingerprinting::forwarded;
use crate::proxy::http_result::{HttpError, HttpResult};
use crate::proxy::synthetic_response::RespBody;

pub type HttpClient<B> = Client<HttpConnector, B>;

/// HTTP/1.1 client used to reach the backend
pub fn create_client<B>() -> HttpClient<B>
where
    B: Body + Send,
    B::Data: Send,
{
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

/// Rewrites the request target to `backend` and sends it.
pub async fn forward<B>(
    mut req: Request<B>,
    backend: &str,
    client: &HttpClient<B>,
) -> HttpResult<Response<RespBody>>
where
    B: Body + Send + Unpin + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let pq = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let uri: Uri = format!("http://{backend}{pq}")
        .parse()
        .map_err(|e| HttpError::InvalidUri(format!("{e}")))?;

    debug!(%uri, "forwarding request to backend");
    *req.uri_mut() = uri;
    *req.version_mut() = Version::HTTP_11;

    let resp = client
        .request(req)
        .await
        .map_err(|e| HttpError::FailedToGetResponseFromBackend(e.to_string()))?;

    Ok(resp.map(|body| body.boxed()))
}

/// Add X-Forwarded-For and X-Forwarded-Proto headers
///
/// The client IP is appended to the existing X-Forwarded-For list (all
/// values, in order), or the header is created if missing. An existing
/// list that is not valid UTF-8 is left untouched.
pub fn add_forwarded_headers(headers: &mut HeaderMap, peer: SocketAddr, is_https: bool) {
    let client_ip = peer.ip().to_string();
    let existing: Option<Vec<&str>> = headers
        .get_all(forwarded::FOR)
        .iter()
        .map(|v| v.to_str().ok())
        .collect();
    let forwarded_for = match existing {
        Some(values) if values.is_empty() => Some(client_ip),
        Some(values) => Some(format!("{}, {client_ip}", values.join(", "))),
        None => None,
    };
    match forwarded_for.map(|v| HeaderValue::from_str(&v)) {
        Some(Ok(hv)) => {
            headers.insert(forwarded::FOR, hv);
        }
        Some(Err(_)) => debug!(%peer, "X-Forwarded-For would be invalid, leaving it untouched"),
        None => debug!(%peer, "X-Forwarded-For is not valid UTF-8, leaving it untouched"),
    }

    let proto = if is_https { "https" } else { "http" };
    headers.insert(forwarded::PROTO, HeaderValue::from_static(proto));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarded_for_is_created() {
        let mut headers = HeaderMap::new();
        add_forwarded_headers(&mut headers, SocketAddr::from(([198, 51, 100, 4], 5000)), true);
        assert_eq!(headers.get(forwarded::FOR).map(|v| v.as_bytes()), Some(&b"198.51.100.4"[..]));
        assert_eq!(headers.get(forwarded::PROTO).map(|v| v.as_bytes()), Some(&b"https"[..]));
    }

    #[test]
    fn test_forwarded_for_is_appended() {
        let mut headers = HeaderMap::new();
        headers.insert(forwarded::FOR, HeaderValue::from_static("10.0.0.1"));
        add_forwarded_headers(&mut headers, SocketAddr::from(([198, 51, 100, 4], 5000)), false);
        assert_eq!(
            headers.get(forwarded::FOR).map(|v| v.as_bytes()),
            Some(&b"10.0.0.1, 198.51.100.4"[..])
        );
        assert_eq!(headers.get(forwarded::PROTO).map(|v| v.as_bytes()), Some(&b"http"[..]));
    }

    #[test]
    fn test_every_forwarded_for_value_is_kept() {
        let mut headers = HeaderMap::new();
        headers.append(forwarded::FOR, HeaderValue::from_static("10.0.0.1"));
        headers.append(forwarded::FOR, HeaderValue::from_static("10.0.0.2, 10.0.0.3"));
        add_forwarded_headers(&mut headers, SocketAddr::from(([198, 51, 100, 4], 5000)), true);

        let values: Vec<_> = headers.get_all(forwarded::FOR).iter().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], "10.0.0.1, 10.0.0.2, 10.0.0.3, 198.51.100.4");
    }

    #[test]
    fn test_unreadable_forwarded_for_is_left_alone(
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut headers = HeaderMap::new();
        let opaque = HeaderValue::from_bytes(b"10.0.0.1 \xff")?;
        headers.insert(forwarded::FOR, opaque.clone());
        add_forwarded_headers(&mut headers, SocketAddr::from(([198, 51, 100, 4], 5000)), false);

        assert_eq!(headers.get(forwarded::FOR), Some(&opaque));
        assert_eq!(headers.get(forwarded::PROTO).map(|v| v.as_bytes()), Some(&b"http"[..]));
        Ok(())
    }
}
