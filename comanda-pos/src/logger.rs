//! Logging Infrastructure
//!
//! Events render in the TUI log pane. When a log directory is configured they
//! are also written to a daily rolling file.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_DIR_ENV: &str = "COMANDA_LOG_DIR";

const DEFAULT_FILTER: &str = "comanda_pos=info,comanda_client=info";

/// Initialize the logger
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole process.
pub fn init_logger(log_dir: Option<&str>) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, guard) = match log_dir.map(Path::new) {
        Some(dir) if std::fs::create_dir_all(dir).is_ok() => {
            let appender = tracing_appender::rolling::daily(dir, "comanda-pos");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(tui_logger::tracing_subscriber_layer())
        .with(file_layer)
        .with(env_filter)
        .init();

    // Dependencies logging through the `log` crate
    tui_logger::init_logger(log::LevelFilter::Info).ok();
    tui_logger::set_default_level(log::LevelFilter::Info);

    if let Some(dir) = log_dir
        && guard.is_none()
    {
        tracing::warn!(dir, "log directory unavailable, file logging disabled");
    }
    guard
}
