use std::process::ExitCode;

use clap::Parser;
use templog_monitor::cli::Cli;
use templog_monitor::config::AppConfig;
use templog_monitor::monitoring::Monitor;
use templog_monitor::shutdown::shutdown_signal;
use templog_monitor::utils::{init_logging, AppError};
use templog_monitor::{build_notifier, send_test_notification};

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Environment (.env may carry the webhook URL)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 2. Logging
    let _guard = init_logging(cli.verbose, cli.log_format, cli.log_dir.as_deref());

    // 3. Configuration
    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => return fail(AppError::from(e)),
    };

    let notifier = match build_notifier(&config) {
        Ok(notifier) => notifier,
        Err(e) => return fail(AppError::from(e)),
    };

    if cli.test_notify {
        return match send_test_notification(&config, &notifier).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(e),
        };
    }

    // 4. Monitor until interrupted
    tracing::info!(
        config = %cli.config.display(),
        dated = config.log_source.is_dated(),
        notifier = ?notifier.kind(),
        "Starting monitor"
    );
    let mut monitor = Monitor::new(config, notifier);

    tokio::select! {
        _ = monitor.run() => {},
        _ = shutdown_signal() => {
            tracing::info!("Stopped by user.");
        },
    }

    ExitCode::SUCCESS
}

fn fail(error: AppError) -> ExitCode {
    tracing::error!(error = %error, "Startup failed");
    eprintln!("{}", error);
    ExitCode::from(error.exit_code() as u8)
}
