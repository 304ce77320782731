//! Threshold check with a resend cooldown

use std::time::Duration;
use tokio::time::Instant;

/// Whether a reading should fire an alert.
///
/// True iff `value` is strictly above `threshold` and at least `cooldown` has
/// passed since `last_alert`. `None` means no alert was sent yet.
pub fn should_alert(
    value: f64,
    threshold: f64,
    now: Instant,
    last_alert: Option<Instant>,
    cooldown: Duration,
) -> bool {
    value > threshold && cooldown_remaining(now, last_alert, cooldown).is_none()
}

fn cooldown_remaining(now: Instant, last_alert: Option<Instant>, cooldown: Duration) -> Option<Duration> {
    let elapsed = now.saturating_duration_since(last_alert?);
    (elapsed < cooldown).then(|| cooldown - elapsed)
}

/// Outcome of evaluating one reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    BelowThreshold,
    Alert,
    CoolingDown { remaining: Duration },
}

/// Tracks the last successful alert and applies the cooldown.
///
/// Only `record_sent` moves the window, so a failed delivery leaves the next
/// exceedance free to retry immediately.
#[derive(Debug, Clone)]
pub struct AlertDebouncer {
    cooldown: Duration,
    last_alert: Option<Instant>,
}

impl AlertDebouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_alert: None,
        }
    }

    pub fn evaluate(&self, value: f64, threshold: f64, now: Instant) -> Decision {
        if should_alert(value, threshold, now, self.last_alert, self.cooldown) {
            return Decision::Alert;
        }
        match cooldown_remaining(now, self.last_alert, self.cooldown) {
            Some(remaining) if value > threshold => Decision::CoolingDown { remaining },
            _ => Decision::BelowThreshold,
        }
    }

    /// Mark an alert as delivered at `now`
    pub fn record_sent(&mut self, now: Instant) {
        self.last_alert = Some(now);
    }

    pub fn last_alert(&self) -> Option<Instant> {
        self.last_alert
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
