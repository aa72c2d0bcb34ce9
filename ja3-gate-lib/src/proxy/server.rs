use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration};
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::enforcement::Ja3Engine;
use crate::error::{GateError, Result};
use crate::proxy::connection::{ConnectionGuard, ConnectionInfo};
use crate::proxy::handler::{respond, ProxyContext};
use crate::telemetry::Metrics;
use crate::tls::build_tls_acceptor;

/// Binds the configured listener and serves until SIGTERM or SIGINT
pub async fn run(
    config: Arc<Config>,
    engine: Arc<Ja3Engine>,
    metrics: Option<Arc<Metrics>>,
) -> Result<()> {
    let listener = TcpListener::bind(config.listen).await?;

    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).map_err(|e| {
        GateError::Io(std::io::Error::other(format!("Failed to setup SIGTERM handler: {e}")))
    })?;
    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).map_err(|e| {
        GateError::Io(std::io::Error::other(format!("Failed to setup SIGINT handler: {e}")))
    })?;

    let shutdown = async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
            _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
        }
    };

    serve(listener, config, engine, metrics, shutdown).await
}

/// Accepts connections on `listener` until `shutdown` completes, then waits
/// up to `timeout.shutdown_secs` for active connections to finish. Connections
/// still open after that are aborted.
pub async fn serve<F>(
    listener: TcpListener,
    config: Arc<Config>,
    engine: Arc<Ja3Engine>,
    metrics: Option<Arc<Metrics>>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    let tls_acceptor = match &config.tls {
        Some(t) => Some(build_tls_acceptor(t)?),
        None => None,
    };
    if tls_acceptor.is_none() {
        warn!("TLS is not configured, requests will pass through without JA3 headers");
    }

    let ctx: Arc<ProxyContext> =
        Arc::new(ProxyContext::new(engine.clone(), config.backend.clone(), metrics.clone()));
    let builder = ConnBuilder::new(TokioExecutor::new());
    let handshake_timeout = Duration::from_secs(config.timeout.tls_handshake_secs);

    let active_connections = Arc::new(AtomicUsize::new(0));
    let (closed_tx, mut closed_rx) = watch::channel(());
    let closed_tx = Arc::new(closed_tx);
    let mut connections = JoinSet::new();

    info!(?addr, backend = %config.backend, mode = %engine.mode(), "starting JA3 gate");

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        warn!(error = %e, "connection task panicked");
                    }
                }
            }
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(error = %e, "accept error");
                        continue;
                    }
                };

                if let Some(ref m) = metrics {
                    m.connections_total.add(1, &[]);
                }

                let guard = ConnectionGuard::new(active_connections.clone(), closed_tx.clone());
                let ctx = ctx.clone();
                let builder = builder.clone();
                let tls_acceptor = tls_acceptor.clone();

                connections.spawn(async move {
                    let _guard = guard;
                    handle_connection(stream, peer, tls_acceptor, handshake_timeout, builder, ctx)
                        .await;
                });
            }
        }
    }

    drop(listener);
    let active = active_connections.load(Ordering::Relaxed);
    if active > 0 {
        info!(
            active_connections = active,
            "Waiting for active connections to finish (timeout: {}s)", config.timeout.shutdown_secs
        );
        let drained = timeout(Duration::from_secs(config.timeout.shutdown_secs), async {
            while active_connections.load(Ordering::Relaxed) > 0 {
                if closed_rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await;
        if drained.is_err() {
            warn!(
                active_connections = active_connections.load(Ordering::Relaxed),
                "Shutdown timeout reached, aborting remaining connections"
            );
            connections.shutdown().await;
        }
    }

    info!("JA3 gate stopped");
    Ok(())
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    tls_acceptor: Option<TlsAcceptor>,
    handshake_timeout: Duration,
    builder: ConnBuilder<TokioExecutor>,
    ctx: Arc<ProxyContext>,
) {
    let Some(acceptor) = tls_acceptor else {
        serve_connection(stream, ConnectionInfo::plain(peer), builder, ctx).await;
        return;
    };

    let tls = match timeout(handshake_timeout, acceptor.accept(stream)).await {
        Ok(Ok(tls)) => tls,
        Ok(Err(e)) => {
            warn!(?peer, error = %e, "TLS accept failed");
            if let Some(ref m) = ctx.metrics {
                m.tls_handshake_errors_total.add(1, &[]);
            }
            return;
        }
        Err(_) => {
            warn!(?peer, "TLS handshake timeout");
            if let Some(ref m) = ctx.metrics {
                m.tls_handshake_errors_total.add(1, &[]);
            }
            return;
        }
    };

    let handshake_complete = !tls.get_ref().1.is_handshaking();
    debug!(?peer, handshake_complete, "TLS connection established");
    serve_connection(tls, ConnectionInfo::new(peer, handshake_complete), builder, ctx).await;
}

async fn serve_connection<I>(
    io: I,
    conn: ConnectionInfo,
    builder: ConnBuilder<TokioExecutor>,
    ctx: Arc<ProxyContext>,
) where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
        let ctx = ctx.clone();
        async move { Ok::<_, hyper::Error>(respond(req, conn, &*ctx).await) }
    });

    if let Err(e) = builder.serve_connection(TokioIo::new(io), svc).await {
        warn!(peer = ?conn.peer, error = %e, "serve_connection error");
    }
}
