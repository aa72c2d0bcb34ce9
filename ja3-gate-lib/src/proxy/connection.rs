use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// What the gate knows about the connection a request arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Remote address of the client
    pub peer: SocketAddr,
    /// Whether a TLS handshake has completed on this connection
    pub handshake_complete: bool,
}

impl ConnectionInfo {
    pub fn new(peer: SocketAddr, handshake_complete: bool) -> Self {
        Self { peer, handshake_complete }
    }

    /// A connection without TLS
    pub fn plain(peer: SocketAddr) -> Self {
        Self::new(peer, false)
    }

    /// Key under which the JA3 hash of this connection is cached (`ip:port`)
    pub fn identity(&self) -> String {
        self.peer.to_string()
    }
}

/// Guard to decrement active connections counter when dropped
/// Also notifies when the last connection closes (for graceful shutdown)
pub struct ConnectionGuard {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl ConnectionGuard {
    pub fn new(counter: Arc<AtomicUsize>, notifier: Arc<watch::Sender<()>>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self { counter, notifier }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let remaining = self.counter.fetch_sub(1, Ordering::Relaxed);
        if remaining == 1 {
            let _ = self.notifier.send(());
        }
    }
}
