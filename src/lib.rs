pub mod cli;
pub mod config;
pub mod monitoring;
pub mod shutdown;
pub mod utils;

use chrono::Local;

use config::AppConfig;
use monitoring::{Alert, Notifier, WebhookNotifier};
use utils::{AppError, NotifyError};

/// Build the webhook notifier described by the config
pub fn build_notifier(config: &AppConfig) -> Result<WebhookNotifier, NotifyError> {
    let n = &config.notifier;
    WebhookNotifier::new(
        n.webhook_url.clone(),
        n.kind,
        n.subject.clone(),
        n.source_name.clone(),
        n.recipients.clone(),
    )
}

/// Send one test alert so the notification path can be checked end to end
pub async fn send_test_notification<N: Notifier>(
    config: &AppConfig,
    notifier: &N,
) -> Result<(), AppError> {
    let now = Local::now();
    let alert = Alert {
        value: config.threshold,
        threshold: config.threshold,
        line: "Hello world (test notification)".to_string(),
        path: config.log_source.resolve(&now),
        detected_at: now,
    };

    notifier.notify(&alert).await?;
    tracing::info!("Test notification sent");
    Ok(())
}
