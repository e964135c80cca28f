use crate::modules::provider::domain::entities::{EpisodeMeta, EpisodeRecord, ProviderEpisodeSet};
use crate::modules::provider::domain::value_objects::StreamProvider;
use std::collections::HashMap;

/// Combines per-provider listings with episode metadata
///
/// Listings stay distinct per provider. Metadata is joined by episode number:
/// its title, image and summary replace the provider's, and the provider's
/// values survive only where metadata has nothing.
pub struct EpisodeMerger;

impl EpisodeMerger {
    /// Non-empty sets in `order`, one per provider, with metadata applied
    pub fn assemble(
        sets: Vec<ProviderEpisodeSet>,
        metadata: &[EpisodeMeta],
        order: &[StreamProvider],
    ) -> Vec<ProviderEpisodeSet> {
        let rank = |provider: StreamProvider| {
            order
                .iter()
                .position(|p| *p == provider)
                .unwrap_or(order.len())
        };

        let mut sets: Vec<ProviderEpisodeSet> =
            sets.into_iter().filter(|set| !set.is_empty()).collect();
        sets.sort_by_key(|set| rank(set.provider_id));
        sets.dedup_by_key(|set| set.provider_id);

        let by_number = Self::index(metadata);
        for set in &mut sets {
            Self::apply(set, &by_number);
        }
        sets
    }

    fn index(metadata: &[EpisodeMeta]) -> HashMap<u32, &EpisodeMeta> {
        metadata
            .iter()
            .map(|meta| (meta.episode_number, meta))
            .collect()
    }

    fn apply(set: &mut ProviderEpisodeSet, by_number: &HashMap<u32, &EpisodeMeta>) {
        if by_number.is_empty() {
            return;
        }
        for record in set.episodes.iter_mut() {
            if let Some(meta) = by_number.get(&record.number) {
                Self::enrich(record, meta);
            }
        }
    }

    fn enrich(record: &mut EpisodeRecord, meta: &EpisodeMeta) {
        if let Some(title) = non_blank(&meta.title) {
            record.title = Some(title);
        }
        if let Some(image) = non_blank(&meta.image) {
            record.image = Some(image);
        }
        if let Some(summary) = non_blank(&meta.summary) {
            record.description = Some(summary);
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::provider::domain::entities::EpisodesShape;
    use std::collections::BTreeMap;

    fn meta(number: u32, title: Option<&str>) -> EpisodeMeta {
        EpisodeMeta {
            episode_number: number,
            title: title.map(str::to_string),
            image: Some(format!("https://img/{}.jpg", number)),
            summary: None,
        }
    }

    #[test]
    fn test_metadata_title_wins_and_provider_title_survives_gaps() {
        let mut set = ProviderEpisodeSet::flat(
            StreamProvider::Gogoanime,
            false,
            vec![
                EpisodeRecord::new("ep-1", 1).with_title("Episode 1"),
                EpisodeRecord::new("ep-2", 2).with_title("Episode 2"),
                EpisodeRecord::new("ep-3", 3).with_title("Episode 3"),
            ],
        );
        let metadata = vec![meta(1, Some("I'm Luffy!")), meta(2, Some("  "))];

        EpisodeMerger::apply(&mut set, &EpisodeMerger::index(&metadata));

        let records: Vec<&EpisodeRecord> = set.episodes.iter().collect();
        assert_eq!(records[0].title.as_deref(), Some("I'm Luffy!"));
        assert_eq!(records[1].title.as_deref(), Some("Episode 2"));
        assert_eq!(records[1].image.as_deref(), Some("https://img/2.jpg"));
        assert_eq!(records[2].title.as_deref(), Some("Episode 3"));
        assert_eq!(records[2].image, None);
    }

    #[test]
    fn test_metadata_reaches_every_subtype_bucket() {
        let mut buckets = BTreeMap::new();
        buckets.insert("sub".to_string(), vec![EpisodeRecord::new("s1", 1)]);
        buckets.insert("dub".to_string(), vec![EpisodeRecord::new("d1", 1)]);
        let mut set = ProviderEpisodeSet {
            provider_id: StreamProvider::Anify,
            supports_dub: true,
            episodes: EpisodesShape::BySubtype(buckets),
        };

        let metadata = [meta(1, Some("Romance Dawn"))];
        EpisodeMerger::apply(&mut set, &EpisodeMerger::index(&metadata));

        assert!(set
            .episodes
            .iter()
            .all(|record| record.title.as_deref() == Some("Romance Dawn")));
    }

    #[test]
    fn test_assemble_orders_and_drops_empty_sets() {
        let sets = vec![
            ProviderEpisodeSet::flat(
                StreamProvider::Consumet,
                false,
                vec![EpisodeRecord::new("c1", 1)],
            ),
            ProviderEpisodeSet::flat(StreamProvider::Gogoanime, false, vec![]),
            ProviderEpisodeSet::flat(
                StreamProvider::HiAnime,
                true,
                vec![EpisodeRecord::new("h?ep=1", 1)],
            ),
        ];

        let assembled = EpisodeMerger::assemble(sets, &[], &StreamProvider::ALL);
        let providers: Vec<StreamProvider> = assembled.iter().map(|s| s.provider_id).collect();
        assert_eq!(
            providers,
            vec![StreamProvider::HiAnime, StreamProvider::Consumet]
        );
    }
}
