use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use templog_monitor::config::{AppConfig, NotifierConfig};
use templog_monitor::monitoring::{Alert, LogSource, Notifier, TextEncoding, WebhookKind};
use templog_monitor::utils::{AppError, NotifyError};
use templog_monitor::{build_notifier, send_test_notification};
use tokio_test::{assert_err, assert_ok};

struct StubNotifier {
    fail: bool,
    sent: Arc<Mutex<Vec<Alert>>>,
}

#[async_trait::async_trait]
impl Notifier for StubNotifier {
    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

fn config(kind: WebhookKind) -> AppConfig {
    AppConfig {
        threshold: 0.05,
        log_source: LogSource::Fixed(PathBuf::from("/data/logs/TempLog.txt")),
        poll_interval: Duration::from_secs(1),
        start_from_beginning: false,
        cooldown: Duration::from_secs(300),
        encoding: TextEncoding::Utf8,
        notifier: NotifierConfig {
            kind,
            webhook_url: "http://localhost/hook".to_string(),
            subject: "[ALERT] Threshold exceeded: {value}".to_string(),
            source_name: "Fridge1".to_string(),
            recipients: vec!["@oncall".to_string()],
        },
    }
}

#[tokio::test]
async fn should_send_test_notification_through_notifier() {
    // Arrange
    let sent = Arc::new(Mutex::new(Vec::new()));
    let notifier = StubNotifier {
        fail: false,
        sent: sent.clone(),
    };

    // Act
    let result = send_test_notification(&config(WebhookKind::Slack), &notifier).await;

    // Assert
    assert_ok!(result);
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].path, PathBuf::from("/data/logs/TempLog.txt"));
    assert!(sent[0].line.contains("test notification"));
}

#[tokio::test]
async fn should_exit_with_one_when_test_notification_fails() {
    // Arrange
    let notifier = StubNotifier {
        fail: true,
        sent: Arc::new(Mutex::new(Vec::new())),
    };

    // Act
    let result = send_test_notification(&config(WebhookKind::Slack), &notifier).await;

    // Assert
    let err = assert_err!(result);
    assert!(matches!(err, AppError::Notify(NotifyError::Status { status: 503, .. })));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn should_build_notifier_from_config() {
    let notifier = assert_ok!(build_notifier(&config(WebhookKind::Discord)));

    assert_eq!(notifier.kind(), WebhookKind::Discord);
}
