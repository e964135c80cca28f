//! AniList GraphQL queries

/// Catalog facts needed to drive title search on search-only providers
pub const MEDIA_INFO_QUERY: &str = r#"
query ($id: Int) {
  Media(id: $id, type: ANIME) {
    id
    title {
      romaji
      english
      userPreferred
    }
    format
    status
    seasonYear
    startDate {
      year
    }
  }
}
"#;
