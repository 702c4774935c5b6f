//! Structured logging setup, grounded on the teacher's reloadable
//! `EnvFilter` pattern.

use std::path::Path;
use std::sync::{Mutex, OnceLock};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

static LOG_RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, tracing_subscriber::Registry>> = OnceLock::new();

/// Holds the non-blocking writer's flush guard when logging to a file, so
/// `shutdown_tracing` can drop it to force a final flush. `None` when
/// logging to stdout.
static LOG_WRITER_GUARD: OnceLock<Mutex<Option<WorkerGuard>>> = OnceLock::new();

/// `log_path` of `None` logs to stdout. `Some(path)` opens a non-rotating
/// file appender at that path (spec §6's `log_path` option) — the hook
/// point a future rotation policy would plug into `tracing_appender::rolling`.
pub fn init_tracing(level: &str, log_path: Option<&str>) {
    let base_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (reload_layer, handle) = reload::Layer::new(base_filter);
    let _ = LOG_RELOAD_HANDLE.set(handle);

    let writer = match log_path {
        Some(path) => {
            let path = Path::new(path);
            let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().map_or_else(|| "auth-server.log".to_string(), |n| n.to_string_lossy().into_owned());
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let _ = LOG_WRITER_GUARD.set(Mutex::new(Some(guard)));
            BoxMakeWriter::new(non_blocking)
        }
        None => BoxMakeWriter::new(std::io::stdout),
    };

    let _ = tracing_subscriber::registry().with(reload_layer).with(fmt::layer().with_writer(writer)).try_init();
}

/// Applies a new logging level at runtime, if `init_tracing` has run.
pub fn apply_logging_level(level: &str) {
    if let Some(handle) = LOG_RELOAD_HANDLE.get() {
        let _ = handle.modify(|filter| *filter = EnvFilter::new(level));
    }
}

/// Drops the file writer's flush guard, if logging to a file. No-op for
/// stdout logging.
pub fn shutdown_tracing() {
    if let Some(guard) = LOG_WRITER_GUARD.get() {
        guard.lock().expect("log writer guard mutex poisoned").take();
    }
}
