#![forbid(unsafe_code)]

use clap::Parser;
use ja3_gate_lib::config::{load_from_path, watch_enforcement};
use ja3_gate_lib::telemetry::{init_metrics, init_tracing, start_observability_server};
use ja3_gate_lib::{FingerprintCache, Ja3Engine, MemoryCache};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "JA3 fingerprint gate for TLS clients")]
struct Cli {
    /// Path to configuration TOML file
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "JA3_GATE_CONFIG",
        default_value = "ja3-gate.toml"
    )]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match load_from_path(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            let _ = init_tracing("info", false, "warn");
            error!(%err, path = %cli.config.display(), "failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(err) = init_tracing(
        &cfg.logging.level,
        cfg.logging.show_target,
        &cfg.telemetry.otel_log_level,
    ) {
        eprintln!("failed to initialize tracing: {err}");
        std::process::exit(1);
    }

    info!(
        ?cfg.listen,
        backend = %cfg.backend,
        strict = cfg.ja3.strict_enforcement,
        "configuration loaded"
    );

    let metrics = match cfg.telemetry.metrics_port {
        Some(port) => match init_metrics() {
            Ok((metrics, registry)) => {
                tokio::spawn(async move {
                    if let Err(err) = start_observability_server(port, registry).await {
                        error!(%err, "observability server exited with error");
                    }
                });
                Some(metrics)
            }
            Err(err) => {
                warn!(%err, "failed to initialize metrics, continuing without them");
                None
            }
        },
        None => None,
    };

    // No ClientHello capture is wired in here; until an embedder fills the
    // cache every request is a cache miss and passes through unlabeled.
    let cache: Arc<dyn FingerprintCache> = Arc::new(MemoryCache::new());
    let engine = Arc::new(Ja3Engine::new(cache, cfg.ja3.mode()).with_metrics(metrics.clone()));

    let _watcher = if cfg.reload.watch {
        match watch_enforcement(cli.config.clone(), engine.clone()) {
            Ok(w) => Some(w),
            Err(err) => {
                error!(%err, "failed to watch configuration");
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    if let Err(err) = ja3_gate_lib::run(Arc::new(cfg), engine, metrics).await {
        error!(%err, "JA3 gate exited with error");
        std::process::exit(1);
    }
}
