pub mod adapter;
pub mod models;
pub mod queries;

pub use adapter::AniListAdapter;
