//! Alert delivery
//!
//! Alerts go out through the `Notifier` trait. `WebhookNotifier` posts them to a
//! Slack incoming webhook or a Discord channel webhook.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, instrument};

use crate::utils::NotifyError;

/// Request timeout for webhook delivery
const WEBHOOK_TIMEOUT_SECS: u64 = 30;

/// Default subject template; supports `{value}`, `{threshold}` and `{file}`
pub const DEFAULT_SUBJECT: &str = "[ALERT] Threshold exceeded: {value}";

/// Embed color for alerts (#E74C3C)
const ALERT_COLOR: u32 = 15158332;

/// A threshold exceedance to report
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub value: f64,
    pub threshold: f64,
    pub line: String,
    pub path: PathBuf,
    pub detected_at: DateTime<Local>,
}

/// Something that can deliver an alert
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Webhook payload flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookKind {
    #[default]
    Slack,
    Discord,
}

/// Discord webhook message payload
#[derive(Debug, Serialize)]
struct DiscordMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    color: u32,
    fields: Vec<DiscordEmbedField>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct DiscordEmbedField {
    name: String,
    value: String,
    inline: bool,
}

/// Posts alerts to a chat webhook
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    webhook_url: String,
    kind: WebhookKind,
    subject: String,
    source_name: String,
    recipients: Vec<String>,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(
        webhook_url: impl Into<String>,
        kind: WebhookKind,
        subject: impl Into<String>,
        source_name: impl Into<String>,
        recipients: Vec<String>,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            webhook_url: webhook_url.into(),
            kind,
            subject: subject.into(),
            source_name: source_name.into(),
            recipients,
            client,
        })
    }

    /// Render the subject template for an alert
    pub fn render_subject(&self, alert: &Alert) -> String {
        self.subject
            .replace("{value}", &alert.value.to_string())
            .replace("{threshold}", &alert.threshold.to_string())
            .replace("{file}", &alert.path.display().to_string())
    }

    /// Plain-text alert body
    pub fn render_body(&self, alert: &Alert) -> String {
        format!(
            "{} threshold exceeded at {}.\n\n\
             Threshold: {} K\n\
             Value:     {} K\n\
             File:      {}\n\
             Line:      {}\n",
            self.source_name,
            alert.detected_at.format("%Y-%m-%d %H:%M:%S"),
            alert.threshold,
            alert.value,
            alert.path.display(),
            alert.line.trim(),
        )
    }

    fn recipients_line(&self) -> Option<String> {
        (!self.recipients.is_empty()).then(|| format!("To: {}", self.recipients.join(", ")))
    }

    /// JSON body posted to the webhook
    pub fn build_payload(&self, alert: &Alert) -> serde_json::Value {
        let subject = self.render_subject(alert);

        match self.kind {
            WebhookKind::Slack => {
                let mut text = format!("*{}*\n", subject);
                if let Some(to) = self.recipients_line() {
                    text.push_str(&to);
                    text.push('\n');
                }
                text.push_str(&format!("```{}```", self.render_body(alert)));
                json!({ "text": text })
            }
            WebhookKind::Discord => {
                let field = |name: &str, value: String, inline: bool| DiscordEmbedField {
                    name: name.to_string(),
                    value,
                    inline,
                };
                let message = DiscordMessage {
                    content: self.recipients_line(),
                    embeds: vec![DiscordEmbed {
                        title: subject,
                        description: format!(
                            "{} threshold exceeded at {}.",
                            self.source_name,
                            alert.detected_at.format("%Y-%m-%d %H:%M:%S")
                        ),
                        color: ALERT_COLOR,
                        fields: vec![
                            field("Value", format!("{} K", alert.value), true),
                            field("Threshold", format!("{} K", alert.threshold), true),
                            field("File", format!("`{}`", alert.path.display()), false),
                            field("Line", format!("`{}`", alert.line.trim()), false),
                        ],
                        timestamp: alert.detected_at.to_rfc3339(),
                    }],
                };
                serde_json::to_value(message).unwrap_or_default()
            }
        }
    }

    pub fn kind(&self) -> WebhookKind {
        self.kind
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip_all, fields(value = alert.value))]
    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        let payload = self.build_payload(alert);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send alert webhook");
                NotifyError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Alert webhook returned error");
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!(recipients = ?self.recipients, "Alert sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_alert() -> Alert {
        Alert {
            value: 0.0612,
            threshold: 0.05,
            line: "08-09-25, 00:00:02, 6.12e-02\n".to_string(),
            path: PathBuf::from("/data/logs/20250908/TempLog.txt"),
            detected_at: Local.with_ymd_and_hms(2025, 9, 8, 0, 0, 3).unwrap(),
        }
    }

    fn notifier(url: &str, kind: WebhookKind) -> WebhookNotifier {
        WebhookNotifier::new(
            url,
            kind,
            DEFAULT_SUBJECT,
            "Fridge1",
            vec!["@oncall".to_string(), "@lab".to_string()],
        )
        .expect("Failed to build notifier")
    }

    /// Serve one HTTP request with the given status line, then close
    async fn one_shot_server(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/hook", addr)
    }

    #[test]
    fn should_render_subject_placeholders() {
        // Arrange
        let mut n = notifier("http://localhost/hook", WebhookKind::Slack);
        n.subject = "[ALERT] {value} > {threshold} in {file}".to_string();

        // Act
        let subject = n.render_subject(&test_alert());

        // Assert
        assert_eq!(
            subject,
            "[ALERT] 0.0612 > 0.05 in /data/logs/20250908/TempLog.txt"
        );
    }

    #[test]
    fn should_render_body_with_trimmed_line() {
        let n = notifier("http://localhost/hook", WebhookKind::Slack);

        let body = n.render_body(&test_alert());

        assert!(body.starts_with("Fridge1 threshold exceeded at 2025-09-08 00:00:03."));
        assert!(body.contains("Threshold: 0.05 K"));
        assert!(body.contains("Value:     0.0612 K"));
        assert!(body.contains("Line:      08-09-25, 00:00:02, 6.12e-02\n"));
    }

    #[test]
    fn should_build_slack_payload_with_text() {
        let n = notifier("http://localhost/hook", WebhookKind::Slack);

        let payload = n.build_payload(&test_alert());

        let text = payload["text"].as_str().expect("text field");
        assert!(text.starts_with("*[ALERT] Threshold exceeded: 0.0612*"));
        assert!(text.contains("To: @oncall, @lab"));
        assert!(payload.get("embeds").is_none());
    }

    #[test]
    fn should_build_discord_payload_with_embed() {
        let n = notifier("http://localhost/hook", WebhookKind::Discord);

        let payload = n.build_payload(&test_alert());

        assert_eq!(payload["content"], "To: @oncall, @lab");
        let embed = &payload["embeds"][0];
        assert_eq!(embed["title"], "[ALERT] Threshold exceeded: 0.0612");
        assert_eq!(embed["color"], ALERT_COLOR);
        assert_eq!(embed["fields"][0]["name"], "Value");
        assert_eq!(embed["fields"][0]["value"], "0.0612 K");
        assert_eq!(embed["fields"][2]["value"], "`/data/logs/20250908/TempLog.txt`");
    }

    #[test]
    fn should_omit_discord_content_without_recipients() {
        let n = WebhookNotifier::new(
            "http://localhost/hook",
            WebhookKind::Discord,
            DEFAULT_SUBJECT,
            "Fridge1",
            vec![],
        )
        .unwrap();

        let payload = n.build_payload(&test_alert());

        assert!(payload.get("content").is_none());
    }

    #[tokio::test]
    async fn should_succeed_on_2xx_response() {
        // Arrange
        let url = one_shot_server("HTTP/1.1 204 No Content", "").await;
        let n = notifier(&url, WebhookKind::Slack);

        // Act
        let result = n.notify(&test_alert()).await;

        // Assert
        assert!(result.is_ok(), "{result:?}");
    }

    #[tokio::test]
    async fn should_fail_on_error_status() {
        // Arrange
        let url = one_shot_server("HTTP/1.1 500 Internal Server Error", "boom").await;
        let n = notifier(&url, WebhookKind::Discord);

        // Act
        let result = n.notify(&test_alert()).await;

        // Assert
        match result {
            Err(NotifyError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_fail_when_endpoint_unreachable() {
        // Arrange - bind then drop to get a closed port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let n = notifier(&format!("http://{}/hook", addr), WebhookKind::Slack);

        // Act
        let result = n.notify(&test_alert()).await;

        // Assert
        assert!(matches!(result, Err(NotifyError::Transport(_))));
    }
}
