pub mod builder;
pub mod dto;
pub mod service;

pub use builder::StreamingServiceBuilder;
pub use dto::{EpisodesResponse, VideoRequest};
pub use service::StreamingService;
