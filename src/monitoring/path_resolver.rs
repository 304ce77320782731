//! Resolution of the currently active log file path
//!
//! Dated mode watches `<base_dir>/YYYYMMDD/<filename>`; re-resolving with a
//! fresh timestamp is how midnight rollover is detected.

use chrono::{DateTime, Local, TimeZone};
use std::path::PathBuf;

use crate::config::ConfigError;

/// Default log file name inside each day folder
pub const DEFAULT_LOG_FILENAME: &str = "TempLog.txt";

/// Where the monitored log lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    /// A single file, never rotated
    Fixed(PathBuf),
    /// `<base_dir>/YYYYMMDD/<filename>`, rotated on the local calendar day
    Dated { base_dir: PathBuf, filename: String },
}

impl LogSource {
    /// Build a log source from the raw config fields.
    ///
    /// A non-empty `log_file` wins over `base_dir`; empty strings count as unset.
    pub fn from_parts(
        log_file: Option<&str>,
        base_dir: Option<&str>,
        filename: &str,
    ) -> Result<Self, ConfigError> {
        if let Some(file) = log_file.filter(|f| !f.trim().is_empty()) {
            return Ok(LogSource::Fixed(PathBuf::from(file)));
        }

        let base_dir = base_dir
            .filter(|d| !d.trim().is_empty())
            .ok_or(ConfigError::MissingLogLocation)?;

        let filename = if filename.trim().is_empty() {
            DEFAULT_LOG_FILENAME
        } else {
            filename
        };

        Ok(LogSource::Dated {
            base_dir: PathBuf::from(base_dir),
            filename: filename.to_string(),
        })
    }

    /// Path to watch at `now`
    pub fn resolve<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> PathBuf
    where
        Tz::Offset: std::fmt::Display,
    {
        match self {
            LogSource::Fixed(path) => path.clone(),
            LogSource::Dated { base_dir, filename } => base_dir
                .join(date_folder(now))
                .join(filename),
        }
    }

    /// Whether the path changes with the date
    pub fn is_dated(&self) -> bool {
        matches!(self, LogSource::Dated { .. })
    }
}

/// Resolve the active log path for the local time `now`
pub fn resolve_log_path(source: &LogSource, now: &DateTime<Local>) -> PathBuf {
    source.resolve(now)
}

/// 8-digit `YYYYMMDD` folder name for the calendar day of `now`
pub fn date_folder<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y%m%d").to_string()
}
