use crate::shared::utils::serde_helpers::lenient_opt_string;
use serde::Deserialize;

/// `/api/v2/ids` answer; every catalog id may be missing or `null`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArmIdsResponse {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub anilist: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub myanimelist: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub anidb: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub kitsu: Option<String>,
}
