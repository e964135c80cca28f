pub mod identifier_resolver;
pub mod provider_registry;
pub mod title_matcher;

pub use identifier_resolver::{IdentifierResolver, Resolution, ResolvedEpisodeId};
pub use provider_registry::ProviderRegistry;
pub use title_matcher::{MatchTarget, ScoredCandidate, TitleMatchConfig, TitleMatcher};
