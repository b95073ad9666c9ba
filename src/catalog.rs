//! In-memory filtering and sorting of loaded records

use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::models::PodcastRecord;

/// Fixed orderings for the record list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    HighestRated,
    Longest,
    Shortest,
}

impl SortOrder {
    pub const ALL: [SortOrder; 5] = [
        SortOrder::Newest,
        SortOrder::Oldest,
        SortOrder::HighestRated,
        SortOrder::Longest,
        SortOrder::Shortest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::HighestRated => "highest_rated",
            SortOrder::Longest => "longest",
            SortOrder::Shortest => "shortest",
        }
    }

    /// Sort records in place
    pub fn sort(&self, records: &mut [PodcastRecord]) {
        match self {
            SortOrder::Newest => records.sort_by_key(|r| Reverse(r.created_at)),
            SortOrder::Oldest => records.sort_by_key(|r| r.created_at),
            SortOrder::HighestRated => records.sort_by_key(|r| Reverse(r.rating)),
            SortOrder::Longest => records.sort_by_key(|r| Reverse(r.duration_minutes)),
            SortOrder::Shortest => records.sort_by_key(|r| r.duration_minutes),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|order| order.as_str() == s.trim())
            .ok_or_else(|| {
                format!(
                    "unknown sort order '{}', expected one of: newest, oldest, highest_rated, longest, shortest",
                    s
                )
            })
    }
}

/// List filters; empty values leave that filter off
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// Case-insensitive substring over title, show name and creator
    pub search: String,
    /// Exact show name
    pub podcast: String,
    /// Exact tag
    pub tag: String,
    /// A blank value means the default order
    #[serde(deserialize_with = "blank_as_default")]
    pub sort: SortOrder,
}

fn blank_as_default<'de, D>(deserializer: D) -> Result<SortOrder, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.trim().is_empty() {
        return Ok(SortOrder::default());
    }
    value.parse().map_err(serde::de::Error::custom)
}

impl ListQuery {
    pub fn has_filters(&self) -> bool {
        !self.search.trim().is_empty() || !self.podcast.is_empty() || !self.tag.is_empty()
    }

    pub fn matches(&self, record: &PodcastRecord) -> bool {
        let search = self.search.trim().to_lowercase();
        if !search.is_empty()
            && ![&record.title, &record.podcast_name, &record.creator]
                .iter()
                .any(|field| field.to_lowercase().contains(&search))
        {
            return false;
        }

        if !self.podcast.is_empty() && record.podcast_name != self.podcast {
            return false;
        }

        if !self.tag.is_empty() && !record.tags.iter().any(|t| t == &self.tag) {
            return false;
        }

        true
    }

    /// Filter then sort a copy of the collection
    pub fn apply(&self, records: &[PodcastRecord]) -> Vec<PodcastRecord> {
        let mut result: Vec<PodcastRecord> = records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();
        self.sort.sort(&mut result);
        result
    }
}

/// Distinct show names, sorted, for the show filter
pub fn podcast_names(records: &[PodcastRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.podcast_name.as_str())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Distinct tags, sorted, for the tag filter
pub fn all_tags(records: &[PodcastRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|r| r.tags.iter().map(String::as_str))
        .filter(|tag| !tag.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PodcastSummary;
    use chrono::{Duration, TimeZone, Utc};

    fn record(id: &str) -> PodcastRecord {
        PodcastRecord {
            id: id.to_string(),
            slug: format!("{}-abcde", id),
            title: String::new(),
            podcast_name: String::new(),
            creator: String::new(),
            source_link: String::new(),
            thumbnail_url: String::new(),
            duration_minutes: 0,
            rating: 3,
            tags: Vec::new(),
            summary: PodcastSummary::default(),
            key_takeaways: Vec::new(),
            actionable_advice: Vec::new(),
            resources: Vec::new(),
            user_id: "u".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn library() -> Vec<PodcastRecord> {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let mut a = record("a");
        a.title = "Why We Sleep".to_string();
        a.podcast_name = "Huberman Lab".to_string();
        a.creator = "Andrew Huberman".to_string();
        a.tags = vec!["health".to_string(), "sleep".to_string()];
        a.created_at = base;

        let mut b = record("b");
        b.title = "Building Startups".to_string();
        b.podcast_name = "Lex Fridman Podcast".to_string();
        b.creator = "Lex Fridman".to_string();
        b.tags = vec!["business".to_string()];
        b.created_at = base + Duration::days(2);

        let mut c = record("c");
        c.title = "Deep Sleep Protocols".to_string();
        c.podcast_name = "Huberman Lab".to_string();
        c.creator = "Andrew Huberman".to_string();
        c.tags = vec!["sleep".to_string()];
        c.created_at = base + Duration::days(1);

        vec![a, b, c]
    }

    fn ids(records: &[PodcastRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_sort_highest_rated() {
        let mut records: Vec<_> = [3u8, 5, 1]
            .iter()
            .map(|&rating| PodcastRecord { rating, ..record("r") })
            .collect();
        SortOrder::HighestRated.sort(&mut records);

        let ratings: Vec<u8> = records.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![5, 3, 1]);
    }

    #[test]
    fn test_sort_by_duration() {
        let mut records: Vec<_> = [40u32, 10, 25]
            .iter()
            .map(|&duration_minutes| PodcastRecord { duration_minutes, ..record("r") })
            .collect();

        SortOrder::Shortest.sort(&mut records);
        let durations: Vec<u32> = records.iter().map(|r| r.duration_minutes).collect();
        assert_eq!(durations, vec![10, 25, 40]);

        SortOrder::Longest.sort(&mut records);
        let durations: Vec<u32> = records.iter().map(|r| r.duration_minutes).collect();
        assert_eq!(durations, vec![40, 25, 10]);
    }

    #[test]
    fn test_sort_by_creation_time() {
        let records = library();

        let newest = ListQuery::default().apply(&records);
        assert_eq!(ids(&newest), vec!["b", "c", "a"]);

        let oldest = ListQuery {
            sort: SortOrder::Oldest,
            ..ListQuery::default()
        }
        .apply(&records);
        assert_eq!(ids(&oldest), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_empty_filters_keep_everything() {
        let records = library();
        let query = ListQuery {
            search: "   ".to_string(),
            ..ListQuery::default()
        };

        assert!(!query.has_filters());
        assert_eq!(ids(&query.apply(&records)), vec!["b", "c", "a"]);

        let oldest = ListQuery {
            sort: SortOrder::Oldest,
            ..query
        };
        assert_eq!(ids(&oldest.apply(&records)), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_blank_sort_uses_default_order() {
        let query: ListQuery = serde_json::from_str(r#"{"sort": "", "tag": "sleep"}"#).unwrap();
        assert_eq!(query.sort, SortOrder::Newest);

        let query: ListQuery = serde_json::from_str(r#"{"sort": "longest"}"#).unwrap();
        assert_eq!(query.sort, SortOrder::Longest);

        assert!(serde_json::from_str::<ListQuery>(r#"{"sort": "popular"}"#).is_err());
    }

    #[test]
    fn test_search_is_case_insensitive_over_three_fields() {
        let records = library();

        let by_title = ListQuery { search: "SLEEP".to_string(), ..ListQuery::default() };
        assert_eq!(ids(&by_title.apply(&records)), vec!["c", "a"]);

        let by_show = ListQuery { search: "fridman pod".to_string(), ..ListQuery::default() };
        assert_eq!(ids(&by_show.apply(&records)), vec!["b"]);

        let by_creator = ListQuery { search: "andrew".to_string(), ..ListQuery::default() };
        assert_eq!(by_creator.apply(&records).len(), 2);

        let no_match = ListQuery { search: "cooking".to_string(), ..ListQuery::default() };
        assert!(no_match.apply(&records).is_empty());
    }

    #[test]
    fn test_filters_combine_with_and() {
        let records = library();
        let query = ListQuery {
            search: "deep".to_string(),
            podcast: "Huberman Lab".to_string(),
            tag: "sleep".to_string(),
            sort: SortOrder::Newest,
        };
        assert_eq!(ids(&query.apply(&records)), vec!["c"]);

        let query = ListQuery {
            podcast: "Huberman Lab".to_string(),
            tag: "health".to_string(),
            ..ListQuery::default()
        };
        assert_eq!(ids(&query.apply(&records)), vec!["a"]);
    }

    #[test]
    fn test_show_filter_is_exact() {
        let records = library();
        let query = ListQuery {
            podcast: "huberman lab".to_string(),
            ..ListQuery::default()
        };
        assert!(query.apply(&records).is_empty());
    }

    #[test]
    fn test_facets() {
        let mut records = library();
        records.push(record("blank"));

        assert_eq!(podcast_names(&records), vec!["Huberman Lab", "Lex Fridman Podcast"]);
        assert_eq!(all_tags(&records), vec!["business", "health", "sleep"]);
    }

    #[test]
    fn test_sort_order_parsing() {
        for order in SortOrder::ALL {
            assert_eq!(order.as_str().parse::<SortOrder>().unwrap(), order);
        }
        assert!("popular".parse::<SortOrder>().is_err());
        assert_eq!(
            serde_json::from_str::<SortOrder>("\"highest_rated\"").unwrap(),
            SortOrder::HighestRated
        );
    }
}
