pub mod domain;
pub mod infrastructure;
pub mod traits;

pub use domain::{CanonicalAnimeId, IdentifierResolver, ProviderRegistry, StreamProvider, Subtype};
pub use traits::{
    AlternateIdLookup, AnimeCatalog, ContentProviderClient, EpisodeMetadataSource,
    IdentifierLookup, LookupId, SearchableProvider, UniversalSourceClient, UniversalSourceQuery,
};
