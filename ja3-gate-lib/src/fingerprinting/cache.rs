use ahash::AHashMap;
use std::sync::{Arc, RwLock};
use tracing::warn;

/// Source of JA3 hashes keyed by connection identity (the remote `ip:port`)
///
/// The cache is filled by whatever captures ClientHello messages; the gate
/// only reads from it. Lookups run concurrently from every in-flight
/// request and may legitimately return `None` when the handshake has not
/// been recorded yet.
pub trait FingerprintCache: Send + Sync {
    fn lookup(&self, identity: &str) -> Option<String>;
}

impl<T: FingerprintCache + ?Sized> FingerprintCache for Arc<T> {
    fn lookup(&self, identity: &str) -> Option<String> {
        (**self).lookup(identity)
    }
}

/// In-memory [`FingerprintCache`] for embedders that capture ClientHello
/// messages in-process
///
/// Entries live until removed; expiry is left to the writer.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<AHashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the JA3 hash observed for `identity`, replacing any previous one.
    pub fn insert(&self, identity: impl Into<String>, ja3: impl Into<String>) {
        match self.entries.write() {
            Ok(mut guard) => {
                guard.insert(identity.into(), ja3.into());
            }
            Err(_) => warn!("fingerprint cache lock poisoned, dropping entry"),
        }
    }

    pub fn remove(&self, identity: &str) -> Option<String> {
        match self.entries.write() {
            Ok(mut guard) => guard.remove(identity),
            Err(_) => {
                warn!("fingerprint cache lock poisoned");
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FingerprintCache for MemoryCache {
    fn lookup(&self, identity: &str) -> Option<String> {
        match self.entries.read() {
            Ok(guard) => guard.get(identity).cloned(),
            Err(_) => {
                warn!("fingerprint cache lock poisoned");
                None
            }
        }
    }
}
