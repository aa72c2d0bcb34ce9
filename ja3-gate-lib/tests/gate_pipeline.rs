mod helpers;

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use helpers::{spawn_echo_backend, StaticCache, TestResult, CHROME, UNKNOWN};
use http::{Request, StatusCode};
use http_body_util::Full;
use ja3_gate_lib::proxy::{handle_request, respond, HttpError, ProxyContext};
use ja3_gate_lib::{names, ConnectionInfo, EnforcementMode, FingerprintCache, Ja3Engine};

fn peer() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 40000))
}

fn context(
    cache: impl FingerprintCache + 'static,
    mode: EnforcementMode,
    backend: SocketAddr,
) -> ProxyContext<Full<Bytes>> {
    let engine = Arc::new(Ja3Engine::new(Arc::new(cache), mode));
    ProxyContext::new(engine, backend.to_string(), None)
}

fn request() -> TestResult<Request<Full<Bytes>>> {
    Ok(Request::builder().uri("/resource?id=1").body(Full::new(Bytes::new()))?)
}

fn header_values(headers: &http::HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn strict_unknown_fingerprint_never_reaches_backend() -> TestResult<()> {
    let backend = spawn_echo_backend().await?;
    let ctx = context(StaticCache::hit(UNKNOWN), EnforcementMode::Strict, backend.addr);

    let result = handle_request(request()?, ConnectionInfo::new(peer(), true), &ctx).await;
    match result {
        Err(HttpError::Rejected(rejection)) => {
            assert_eq!(rejection.ja3(), UNKNOWN);
            assert_eq!(rejection.status(), StatusCode::FORBIDDEN);
        }
        Err(other) => return Err(format!("unexpected error: {other}").into()),
        Ok(_) => return Err("request should have been rejected".into()),
    }
    assert_eq!(backend.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn rejection_is_answered_with_forbidden() -> TestResult<()> {
    let backend = spawn_echo_backend().await?;
    let ctx = context(StaticCache::hit(UNKNOWN), EnforcementMode::Strict, backend.addr);

    let resp = respond(request()?, ConnectionInfo::new(peer(), true), &ctx).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(backend.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn strict_known_fingerprint_adds_browser_and_ja3() -> TestResult<()> {
    let backend = spawn_echo_backend().await?;
    let ctx = context(StaticCache::hit(CHROME), EnforcementMode::Strict, backend.addr);

    let resp = respond(request()?, ConnectionInfo::new(peer(), true), &ctx).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header_values(resp.headers(), names::JA3), vec![CHROME]);
    assert_eq!(header_values(resp.headers(), names::BROWSER), vec!["Chrome"]);
    assert_eq!(backend.request_count(), 1);
    Ok(())
}

#[tokio::test]
async fn permissive_adds_only_ja3() -> TestResult<()> {
    let backend = spawn_echo_backend().await?;
    let ctx = context(StaticCache::hit(UNKNOWN), EnforcementMode::Permissive, backend.addr);

    let resp = respond(request()?, ConnectionInfo::new(peer(), true), &ctx).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header_values(resp.headers(), names::JA3), vec![UNKNOWN]);
    assert!(header_values(resp.headers(), names::BROWSER).is_empty());
    Ok(())
}

#[tokio::test]
async fn client_supplied_ja3_header_is_kept() -> TestResult<()> {
    let backend = spawn_echo_backend().await?;
    let ctx = context(StaticCache::hit(CHROME), EnforcementMode::Permissive, backend.addr);

    let req = Request::builder()
        .uri("/")
        .header(names::JA3, "spoofed")
        .body(Full::new(Bytes::new()))?;
    let resp = respond(req, ConnectionInfo::new(peer(), true), &ctx).await;
    assert_eq!(header_values(resp.headers(), names::JA3), vec!["spoofed", CHROME]);
    Ok(())
}

#[tokio::test]
async fn cache_miss_passes_unlabeled_in_strict_mode() -> TestResult<()> {
    let backend = spawn_echo_backend().await?;
    let ctx = context(StaticCache::miss(), EnforcementMode::Strict, backend.addr);

    let resp = respond(request()?, ConnectionInfo::new(peer(), true), &ctx).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(header_values(resp.headers(), names::JA3).is_empty());
    assert!(header_values(resp.headers(), names::BROWSER).is_empty());
    assert_eq!(backend.request_count(), 1);
    Ok(())
}

#[tokio::test]
async fn incomplete_handshake_passes_through() -> TestResult<()> {
    let backend = spawn_echo_backend().await?;
    let ctx = context(StaticCache::hit(UNKNOWN), EnforcementMode::Strict, backend.addr);

    let resp = respond(request()?, ConnectionInfo::plain(peer()), &ctx).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(header_values(resp.headers(), names::JA3).is_empty());
    Ok(())
}

#[tokio::test]
async fn mode_switch_applies_to_next_request() -> TestResult<()> {
    let backend = spawn_echo_backend().await?;
    let ctx = context(StaticCache::hit(UNKNOWN), EnforcementMode::Permissive, backend.addr);
    let conn = ConnectionInfo::new(peer(), true);

    let resp = respond(request()?, conn, &ctx).await;
    assert_eq!(resp.status(), StatusCode::OK);

    ctx.engine.set_mode(EnforcementMode::Strict);
    let resp = respond(request()?, conn, &ctx).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(backend.request_count(), 1);
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_bad_gateway() -> TestResult<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let ctx = context(StaticCache::hit(CHROME), EnforcementMode::Strict, addr);
    let resp = respond(request()?, ConnectionInfo::new(peer(), true), &ctx).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    Ok(())
}
