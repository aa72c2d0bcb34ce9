use arc_swap::ArcSwap;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Request;
use std::sync::Arc;
use tracing::{debug, warn};

use super::decision::{Decision, Rejection};
use super::mode::EnforcementMode;
use crate::fingerprinting::{names, FingerprintCache, FingerprintDatabase};
use crate::proxy::ConnectionInfo;
use crate::telemetry::Metrics;

/// Classifies connections by JA3 hash and decides whether requests pass
///
/// The enforcement mode is held as a snapshot that can be replaced while
/// serving; each decision reads it exactly once.
pub struct Ja3Engine {
    database: Arc<FingerprintDatabase>,
    cache: Arc<dyn FingerprintCache>,
    mode: ArcSwap<EnforcementMode>,
    metrics: Option<Arc<Metrics>>,
}

impl Ja3Engine {
    /// Creates an engine backed by the built-in fingerprint database
    pub fn new(cache: Arc<dyn FingerprintCache>, mode: EnforcementMode) -> Self {
        Self {
            database: FingerprintDatabase::builtin(),
            cache,
            mode: ArcSwap::from_pointee(mode),
            metrics: None,
        }
    }

    pub fn with_database(mut self, database: Arc<FingerprintDatabase>) -> Self {
        self.database = database;
        self
    }

    pub fn with_metrics(mut self, metrics: Option<Arc<Metrics>>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn database(&self) -> &FingerprintDatabase {
        &self.database
    }

    pub fn mode(&self) -> EnforcementMode {
        **self.mode.load()
    }

    /// Replaces the enforcement mode, returning the previous one.
    ///
    /// Decisions already in flight keep the snapshot they started with.
    pub fn set_mode(&self, mode: EnforcementMode) -> EnforcementMode {
        *self.mode.swap(Arc::new(mode))
    }

    /// Decides what to do with a request arriving on `conn`.
    pub fn decide(&self, conn: &ConnectionInfo) -> Decision {
        let decision = self.evaluate(conn);
        if let Some(ref m) = self.metrics {
            m.record_decision(decision.outcome());
            if let Decision::Rejected(ref rejection) = decision {
                m.record_rejection(rejection.reason());
            }
        }
        decision
    }

    fn evaluate(&self, conn: &ConnectionInfo) -> Decision {
        if !conn.handshake_complete {
            return Decision::PassThrough;
        }

        let identity = conn.identity();
        let Some(ja3) = self.cache.lookup(&identity) else {
            debug!(peer = %identity, "ClientHello missing from cache");
            return Decision::Unlabeled;
        };

        let mode = self.mode();
        if !mode.is_strict() {
            debug!(peer = %identity, ja3 = %ja3, "attaching JA3 to request");
            return Decision::Annotated { ja3, browser: None };
        }

        match self.database.classify(&ja3) {
            Some(browser) => {
                debug!(peer = %identity, ja3 = %ja3, browser, "attaching JA3 and browser");
                Decision::Annotated { browser: Some(browser.to_string()), ja3 }
            }
            None => {
                warn!(peer = %identity, ja3 = %ja3, "rejecting unrecognized JA3 fingerprint");
                Decision::Rejected(Rejection::UnrecognizedFingerprint { ja3 })
            }
        }
    }

    /// Runs the gate for `req` and applies the resulting headers.
    ///
    /// An `Err` means the request must not go any further; the caller
    /// answers with [`Rejection::status`].
    pub fn process<B>(
        &self,
        req: &mut Request<B>,
        conn: &ConnectionInfo,
    ) -> Result<Decision, Rejection> {
        match self.decide(conn) {
            Decision::Rejected(rejection) => Err(rejection),
            decision => {
                annotate_headers(&decision, req.headers_mut());
                Ok(decision)
            }
        }
    }
}

/// Appends the `browser` and `ja3` headers for an annotated decision.
///
/// Existing values under the same names are kept; other decisions leave
/// the headers untouched.
pub fn annotate_headers(decision: &Decision, headers: &mut HeaderMap) {
    let Decision::Annotated { ja3, browser } = decision else {
        return;
    };

    if let Some(browser) = browser {
        append(headers, names::BROWSER, browser);
    }
    append(headers, names::JA3, ja3);
}

fn append(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(hv) => {
            headers.append(HeaderName::from_static(name), hv);
        }
        Err(_) => warn!(header = name, "skipping value that is not a valid header value"),
    }
}
