pub mod error;
pub mod logging;

pub use error::{AppError, MonitorError, NotifyError};
pub use logging::init_logging;
