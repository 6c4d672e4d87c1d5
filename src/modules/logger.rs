use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global tracing subscriber.
///
/// Console output always; a daily-rolling `attribution.log` under `log_dir`
/// when given. `RUST_LOG` overrides the default `info` filter. Calling this
/// more than once is harmless, the first subscriber wins.
pub fn init_logger(log_dir: Option<&Path>) {
    // Host SDKs that still emit through `log` end up in the same sink.
    let _ = tracing_log::LogTracer::init();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer().with_target(false);

    let file_layer = log_dir.map(|dir| {
        let appender = tracing_appender::rolling::daily(dir, "attribution.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer().with_ansi(false).with_writer(writer)
    });

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer);
    let result = tracing::subscriber::set_global_default(subscriber);

    match result {
        Ok(()) => tracing::info!("Attribution logger initialized"),
        Err(_) => tracing::debug!("Logger already initialized, keeping existing subscriber"),
    }
}
