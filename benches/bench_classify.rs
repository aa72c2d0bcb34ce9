//! Micro benchmarks for the JA3 decision path.
//! Pure CPU - no network, no IO.
//!
//! ```bash
//! cargo bench --bench bench_classify
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use ja3_gate_lib::{ConnectionInfo, EnforcementMode, FingerprintDatabase, Ja3Engine, MemoryCache};

const CHROME: &str = "aa56c057ad164ec4fdcb7a5a283be9fc";
const CHROME_UPPER: &str = "AA56C057AD164EC4FDCB7A5A283BE9FC";
const UNKNOWN: &str = "0000000000000000000000000000dead";

fn bench_classify(c: &mut Criterion) {
    let db = FingerprintDatabase::builtin();
    assert_eq!(db.classify(CHROME), Some("Chrome"), "built-in table is missing Chrome");

    c.bench_function("classify_known_lowercase", |b| {
        b.iter(|| db.classify(std::hint::black_box(CHROME)));
    });
    c.bench_function("classify_known_uppercase", |b| {
        b.iter(|| db.classify(std::hint::black_box(CHROME_UPPER)));
    });
    c.bench_function("classify_unknown", |b| {
        b.iter(|| db.classify(std::hint::black_box(UNKNOWN)));
    });
}

fn bench_decide(c: &mut Criterion) {
    let peer = SocketAddr::from(([198, 51, 100, 7], 443));
    let cache = MemoryCache::new();
    cache.insert(peer.to_string(), CHROME);
    let engine = Ja3Engine::new(Arc::new(cache), EnforcementMode::Strict);
    let conn = ConnectionInfo::new(peer, true);

    assert!(!engine.decide(&conn).is_rejected());

    c.bench_function("decide_strict_known", |b| {
        b.iter(|| engine.decide(std::hint::black_box(&conn)));
    });

    engine.set_mode(EnforcementMode::Permissive);
    c.bench_function("decide_permissive", |b| {
        b.iter(|| engine.decide(std::hint::black_box(&conn)));
    });
}

criterion_group!(classify_benches, bench_classify, bench_decide);
criterion_main!(classify_benches);
