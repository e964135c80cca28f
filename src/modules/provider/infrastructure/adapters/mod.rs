// Identifier lookups and catalogs
pub mod anilist;
pub mod anizip;
pub mod arm;
pub mod malsync;

// Content providers
pub mod anify;
pub mod animepahe;
pub mod consumet;
pub mod gogoanime;
pub mod hianime;

pub mod common;

pub use anify::AnifyAdapter;
pub use anilist::AniListAdapter;
pub use animepahe::AnimePaheAdapter;
pub use anizip::AniZipAdapter;
pub use arm::ArmAdapter;
pub use consumet::ConsumetMetaAdapter;
pub use gogoanime::GogoanimeAdapter;
pub use hianime::HiAnimeAdapter;
pub use malsync::MalSyncAdapter;
