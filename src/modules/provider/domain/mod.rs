pub mod entities;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use services::{IdentifierResolver, ProviderRegistry, TitleMatcher};
pub use value_objects::{CanonicalAnimeId, StreamProvider, Subtype};
