//! Logging initialization
//!
//! Human-readable or JSON output on stdout, with an optional daily rolling
//! log file alongside it.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::cli::LogFormat;

/// Default filter directive for the given verbosity
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug,templog_monitor=debug"
    } else {
        "info,templog_monitor=info"
    }
}

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `verbose`. When `log_dir` is given, a
/// `templog-monitor.log.YYYY-MM-DD` file is also written there.
///
/// The returned `WorkerGuard` must be held in `main` so buffered file output is
/// flushed on exit.
pub fn init_logging(verbose: bool, format: LogFormat, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let stdout_layer = match format {
        LogFormat::Text => fmt::layer()
            .with_timer(fmt::time::ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
            .with_target(false)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_current_span(true)
            .flatten_event(false)
            .boxed(),
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let file_appender = rolling::daily(dir, "templog-monitor.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .json()
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();

    if let Err(err) = installed {
        // A subscriber set earlier in the process (tests, embedding) is kept as is
        let already_set = std::error::Error::source(&err)
            .is_some_and(|src| src.is::<tracing::dispatcher::SetGlobalDefaultError>());
        if !already_set {
            eprintln!("Could not install log subscriber: {err}");
        }
    }

    guard
}
