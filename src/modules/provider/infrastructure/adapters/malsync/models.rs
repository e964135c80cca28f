//! MALSync mapping payloads

use crate::shared::utils::serde_helpers::lenient_opt_string;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MalSyncResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub title: Option<String>,
    /// Site name -> entry key -> entry; anything that is not an object is ignored
    #[serde(default, rename = "Sites")]
    pub sites: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MalSyncSiteEntry {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub identifier: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub title: Option<String>,
}

impl MalSyncResponse {
    /// Parsed entries per site name, keyed and ordered by entry key
    pub fn site_entries(&self) -> BTreeMap<String, Vec<(String, MalSyncSiteEntry)>> {
        let mut result = BTreeMap::new();
        let Some(Value::Object(sites)) = &self.sites else {
            return result;
        };

        for (site, entries) in sites {
            let Value::Object(entries) = entries else {
                continue;
            };
            let parsed: Vec<(String, MalSyncSiteEntry)> = entries
                .iter()
                .filter_map(|(key, entry)| {
                    serde_json::from_value::<MalSyncSiteEntry>(entry.clone())
                        .ok()
                        .map(|entry| (key.clone(), entry))
                })
                .collect();
            result.insert(site.clone(), parsed);
        }

        result
    }
}
