//! Log tailing and threshold alerting
//!
//! - Numeric extraction from log lines
//! - Dated log path resolution and rollover
//! - Incremental file tailing
//! - Cooldown-debounced alerting through a notifier

pub mod debounce;
pub mod extractor;
pub mod monitor;
pub mod notifier;
pub mod path_resolver;
pub mod tail;

pub use debounce::{should_alert, AlertDebouncer, Decision};
pub use extractor::extract_rightmost_float;
pub use monitor::{Clock, LineOutcome, Monitor, MonitorState, SystemClock};
pub use notifier::{Alert, Notifier, WebhookKind, WebhookNotifier};
pub use path_resolver::{resolve_log_path, LogSource};
pub use tail::{LogTail, TextEncoding};
