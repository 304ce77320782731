//! Monitor loop
//!
//! Drives the whole pipeline: resolve the active path, wait for the file,
//! tail it, extract a reading from each line and alert through the notifier.
//!
//! ```text
//! ResolvingPath -> WaitingForFile -> Tailing --(rollover)--> ResolvingPath
//!                        ^               |
//!                        +--(I/O error, pause poll_interval)
//! ```
//!
//! Transient I/O failures never end the loop; it only stops when the caller
//! drops the `run()` future (Ctrl+C in `main`).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::monitoring::debounce::{AlertDebouncer, Decision};
use crate::monitoring::extractor::extract_rightmost_float;
use crate::monitoring::notifier::{Alert, Notifier};
use crate::monitoring::tail::LogTail;
use crate::utils::MonitorError;

/// Source of local wall-clock time for day-folder resolution
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The system's local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// What happened to a single tailed line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineOutcome {
    NoValue,
    BelowThreshold { value: f64 },
    CoolingDown { value: f64 },
    Alerted { value: f64 },
    DeliveryFailed { value: f64 },
}

/// Mutable state carried across loop iterations
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub current_path: PathBuf,
    pub debouncer: AlertDebouncer,
}

/// Tails the configured log and alerts on threshold exceedance
pub struct Monitor<N: Notifier, C: Clock = SystemClock> {
    config: AppConfig,
    notifier: N,
    clock: C,
    state: MonitorState,
}

impl<N: Notifier> Monitor<N, SystemClock> {
    pub fn new(config: AppConfig, notifier: N) -> Self {
        Self::with_clock(config, notifier, SystemClock)
    }
}

impl<N: Notifier, C: Clock> Monitor<N, C> {
    pub fn with_clock(config: AppConfig, notifier: N, clock: C) -> Self {
        let current_path = config.log_source.resolve(&clock.now());
        let debouncer = AlertDebouncer::new(config.cooldown);

        Self {
            config,
            notifier,
            clock,
            state: MonitorState {
                current_path,
                debouncer,
            },
        }
    }

    /// Run until the future is dropped
    pub async fn run(&mut self) {
        info!(path = %self.state.current_path.display(), "Initial target file");

        loop {
            if let Err(e) = self.monitor_once().await {
                self.recover(&e).await;
            }
        }
    }

    /// Log a failed pass by kind, then pause one poll interval before the next
    async fn recover(&self, e: &MonitorError) {
        let path = e.path().display();
        match e {
            MonitorError::NotFound { .. } => {
                info!(%path, "File not found (may be rotating). Will retry")
            }
            MonitorError::PermissionDenied { .. } => {
                warn!(%path, error = %e, "Permission error opening file (locked?). Retrying")
            }
            MonitorError::Io { .. } => {
                error!(%path, error = %e, "Unexpected error while monitoring")
            }
        }
        tokio::time::sleep(self.config.poll_interval).await;
    }

    /// One pass through resolve, wait and tail.
    ///
    /// Returns `Ok(())` when the active path changes, so the caller starts over
    /// on the new file.
    pub async fn monitor_once(&mut self) -> Result<(), MonitorError> {
        self.refresh_path();
        let path = self.state.current_path.clone();

        if !self.wait_for_file(&path).await? {
            return Ok(());
        }

        let mut tail = LogTail::open(&path, self.config.start_from_beginning, self.config.encoding)
            .await
            .map_err(|e| MonitorError::from_io(&path, e))?;

        info!(
            path = %path.display(),
            start_from_beginning = self.config.start_from_beginning,
            "Monitoring file"
        );

        loop {
            let line = tail
                .try_next_line()
                .await
                .map_err(|e| MonitorError::from_io(&path, e))?;

            if self.refresh_path() {
                if let Some(line) = line {
                    debug!(line = line.trim(), "Dropping line read after rollover");
                }
                return Ok(());
            }

            match line {
                Some(line) => {
                    self.handle_line(&line).await;
                }
                None => tokio::time::sleep(self.config.poll_interval).await,
            }
        }
    }

    /// Extract, debounce and notify for one line
    pub async fn handle_line(&mut self, line: &str) -> LineOutcome {
        let Some(value) = extract_rightmost_float(line) else {
            debug!(line = line.trim(), "No numeric value found in line (skipped)");
            return LineOutcome::NoValue;
        };

        debug!(value, line = line.trim(), "Parsed value");

        let threshold = self.config.threshold;
        let now = Instant::now();

        match self.state.debouncer.evaluate(value, threshold, now) {
            Decision::BelowThreshold => LineOutcome::BelowThreshold { value },
            Decision::CoolingDown { remaining } => {
                info!(
                    value,
                    remaining_secs = format_args!("{:.1}", remaining.as_secs_f64()),
                    "Threshold exceeded but within cooldown"
                );
                LineOutcome::CoolingDown { value }
            }
            Decision::Alert => {
                warn!(value, threshold, "Threshold exceeded");

                let alert = Alert {
                    value,
                    threshold,
                    line: line.to_string(),
                    path: self.state.current_path.clone(),
                    detected_at: self.clock.now(),
                };

                match self.notifier.notify(&alert).await {
                    Ok(()) => {
                        self.state.debouncer.record_sent(now);
                        LineOutcome::Alerted { value }
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to send alert");
                        LineOutcome::DeliveryFailed { value }
                    }
                }
            }
        }
    }

    /// Re-resolve the active path; true if it changed
    fn refresh_path(&mut self) -> bool {
        let target = self.config.log_source.resolve(&self.clock.now());
        if target == self.state.current_path {
            return false;
        }

        info!(
            from = %self.state.current_path.display(),
            to = %target.display(),
            "Date rollover detected. Switching file"
        );
        self.state.current_path = target;
        true
    }

    /// Poll until `path` exists.
    ///
    /// Returns `Ok(false)` if the active path rolled over while waiting.
    async fn wait_for_file(&mut self, path: &Path) -> Result<bool, MonitorError> {
        let mut announced = false;

        loop {
            let exists = tokio::fs::try_exists(path)
                .await
                .map_err(|e| MonitorError::from_io(path, e))?;
            if exists {
                return Ok(true);
            }

            if !announced {
                info!(path = %path.display(), "Waiting for log file to appear");
                announced = true;
            } else {
                debug!(path = %path.display(), "Still waiting for log file");
            }

            tokio::time::sleep(self.config.poll_interval).await;

            if self.refresh_path() {
                return Ok(false);
            }
        }
    }

    pub fn current_path(&self) -> &Path {
        &self.state.current_path
    }

    pub(crate) fn state(&self) -> &MonitorState {
        &self.state
    }
}
