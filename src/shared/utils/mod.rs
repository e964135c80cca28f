pub mod logger;
pub mod serde_helpers;

pub use logger::{init_logger, TimedOperation};
