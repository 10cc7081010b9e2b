use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::sync::Arc;

// Algolia sends `null` for fields that don't apply to a record (e.g. `url` on Ask HN)
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One story record as returned by the search API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Hit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub num_comments: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Hit {
    // Host part of the story link, shown next to the title like on the site itself
    pub fn domain(&self) -> Option<String> {
        let parsed = reqwest::Url::parse(&self.url).ok()?;
        let host = parsed.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }

    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        let Some(created_at) = self.created_at else {
            return String::new();
        };

        let secs = (now - created_at).num_seconds().max(0);
        let (amount, unit) = match secs {
            s if s < 60 => return "just now".to_string(),
            s if s < 3_600 => (s / 60, "minute"),
            s if s < 86_400 => (s / 3_600, "hour"),
            s if s < 2_592_000 => (s / 86_400, "day"),
            s if s < 31_536_000 => (s / 2_592_000, "month"),
            s => (s / 31_536_000, "year"),
        };

        if amount == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", amount, unit)
        }
    }
}

/// Body of `GET /search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<Hit>,
    pub page: u32,
    #[serde(rename = "nbPages", default)]
    pub nb_pages: u32,
    #[serde(rename = "nbHits", default)]
    pub nb_hits: u64,
}

/// Everything fetched so far for one query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    pub hits: Vec<Hit>,
    // Highest page index merged into `hits`
    pub page: u32,
    // Last `nbPages` reported by the API, 0 if it never said
    pub total_pages: u32,
}

impl ResultPage {
    pub fn has_more(&self) -> bool {
        self.total_pages == 0 || self.page + 1 < self.total_pages
    }
}

pub type ResultCache = HashMap<String, Arc<ResultPage>>;

/// A single page request for one query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub query: String,
    pub page: u32,
    pub hits_per_page: u32,
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub request: FetchRequest,
    pub result: anyhow::Result<SearchResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub query: String,
    pub page: u32,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn decodes_hits_with_null_and_missing_fields() {
        let body = r#"{
            "hits": [
                {"objectID": "1", "title": "Rust 2.0", "url": "https://www.rust-lang.org/x",
                 "author": "steve", "num_comments": 12, "points": 300,
                 "created_at": "2024-05-01T10:00:00.000Z"},
                {"objectID": "2", "title": "Ask HN: anything?", "url": null,
                 "author": "pg", "num_comments": null}
            ],
            "page": 0,
            "nbPages": 50,
            "nbHits": 400
        }"#;

        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.page, 0);
        assert_eq!(response.nb_pages, 50);
        assert_eq!(response.hits.len(), 2);

        let first = &response.hits[0];
        assert_eq!(first.object_id, "1");
        assert_eq!(first.points, 300);
        assert!(first.created_at.is_some());

        let second = &response.hits[1];
        assert_eq!(second.url, "");
        assert_eq!(second.num_comments, 0);
        assert_eq!(second.points, 0);
        assert_eq!(second.created_at, None);
    }

    #[test]
    fn response_without_page_counts_still_decodes() {
        let response: SearchResponse = serde_json::from_str(r#"{"hits": [], "page": 3}"#).unwrap();
        assert_eq!(response.page, 3);
        assert_eq!(response.nb_pages, 0);
        assert_eq!(response.nb_hits, 0);
    }

    #[test]
    fn domain_strips_www_and_ignores_bad_urls() {
        let mut hit: Hit = serde_json::from_str(
            r#"{"objectID": "9", "url": "https://www.example.com/a/b?c=d"}"#,
        )
        .unwrap();
        assert_eq!(hit.domain().as_deref(), Some("example.com"));

        hit.url = "not a url".to_string();
        assert_eq!(hit.domain(), None);
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let mut hit: Hit = serde_json::from_str(r#"{"objectID": "1"}"#).unwrap();
        assert_eq!(hit.time_ago(now), "");

        hit.created_at = Some(Utc.with_ymd_and_hms(2024, 5, 2, 11, 0, 0).unwrap());
        assert_eq!(hit.time_ago(now), "1 hour ago");

        hit.created_at = Some(Utc.with_ymd_and_hms(2024, 4, 29, 12, 0, 0).unwrap());
        assert_eq!(hit.time_ago(now), "3 days ago");
    }

    #[test]
    fn has_more_uses_total_pages_when_known() {
        let page = ResultPage { hits: Vec::new(), page: 1, total_pages: 0 };
        assert!(page.has_more());

        let page = ResultPage { hits: Vec::new(), page: 1, total_pages: 3 };
        assert!(page.has_more());

        let page = ResultPage { hits: Vec::new(), page: 2, total_pages: 3 };
        assert!(!page.has_more());
    }
}
