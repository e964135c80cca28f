pub mod provider;
pub mod streaming;
