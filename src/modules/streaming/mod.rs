pub mod application;
pub mod domain;

pub use application::{EpisodesResponse, StreamingService, StreamingServiceBuilder, VideoRequest};
pub use domain::TtlPolicy;
