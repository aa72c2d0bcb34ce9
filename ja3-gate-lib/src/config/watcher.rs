use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::load_from_path;
use crate::enforcement::{EnforcementMode, Ja3Engine};
use crate::error::{GateError, Result};

/// Keeps the filesystem watcher and its reload task alive.
///
/// Dropping it stops watching; the engine keeps the last applied mode.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Re-reads the configuration file and stores the resulting enforcement
/// mode into the engine.
///
/// The whole file is validated first; on error the engine is left untouched.
pub fn reload_enforcement(path: &Path, engine: &Ja3Engine) -> Result<EnforcementMode> {
    let cfg = load_from_path(path)?;
    let mode = cfg.ja3.mode();
    let previous = engine.set_mode(mode);
    if previous != mode {
        info!(?previous, current = ?mode, "JA3 enforcement mode changed");
    } else {
        debug!(?mode, "configuration reloaded, enforcement mode unchanged");
    }
    Ok(mode)
}

/// Watches `path` and applies `[ja3]` changes to `engine` as they happen.
///
/// The parent directory is watched rather than the file itself so editors
/// that replace the file on save are still picked up. Must be called from
/// within a tokio runtime.
pub fn watch_enforcement(path: PathBuf, engine: Arc<Ja3Engine>) -> Result<ConfigWatcher> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .map_err(|e| GateError::Config(format!("Failed to create config watcher: {e}")))?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| GateError::Config(format!("Failed to watch {}: {e}", dir.display())))?;

    info!(path = %path.display(), "watching configuration for JA3 enforcement changes");

    let task = tokio::spawn(async move {
        while let Some(res) = rx.recv().await {
            match res {
                Ok(event) if touches(&event, &path) => {
                    if let Err(e) = reload_enforcement(&path, &engine) {
                        warn!(error = %e, "ignoring invalid configuration, keeping previous mode");
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "config watcher error"),
            }
        }
    });

    Ok(ConfigWatcher { _watcher: watcher, task })
}

fn touches(event: &Event, path: &Path) -> bool {
    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
        return false;
    }
    let Some(name) = path.file_name() else {
        return false;
    };
    event.paths.iter().any(|p| p.file_name() == Some(name))
}
