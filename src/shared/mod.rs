// Shared kernel: errors, configuration, cache infrastructure and utilities
// used by every module.

pub mod config; // Engine configuration loaded from the environment
pub mod errors; // Shared error types
pub mod infrastructure; // Shared infrastructure (cache stores)
pub mod utils; // Shared utilities (logging, lenient serde helpers)

// Re-exports for convenience
pub use config::EngineConfig;
pub use errors::{AppError, AppResult};
