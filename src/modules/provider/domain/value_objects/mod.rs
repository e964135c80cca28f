pub mod canonical_id;
pub mod stream_provider;
pub mod subtype;

pub use canonical_id::CanonicalAnimeId;
pub use stream_provider::StreamProvider;
pub use subtype::Subtype;
