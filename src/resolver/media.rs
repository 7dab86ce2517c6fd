use std::collections::HashMap;

use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::app::{QuireError, Result};
use crate::domain::id_value;
use crate::fetcher::Fetcher;
use crate::resolver::endpoints::Endpoints;

/// Raw media records of one item, keyed by media id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaIndex {
    records: HashMap<String, Map<String, Value>>,
}

impl MediaIndex {
    /// Index a media listing. Records without a string or integer `id` are skipped.
    pub fn from_listing(url: &str, listing: Value) -> Result<Self> {
        let Value::Array(entries) = listing else {
            return Err(QuireError::Payload {
                url: url.to_string(),
                expected: "a JSON array of media records",
            });
        };

        let mut records = HashMap::with_capacity(entries.len());
        for entry in entries {
            let Value::Object(record) = entry else {
                warn!(url, "Skipping media entry that is not an object");
                continue;
            };
            match record.get("id").and_then(id_value) {
                Some(id) => {
                    records.insert(id, record);
                }
                None => warn!(url, "Skipping media record without id"),
            }
        }

        Ok(Self { records })
    }

    pub fn get(&self, media_id: &str) -> Option<&Map<String, Value>> {
        self.records.get(media_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fetches and indexes the media listing of an item.
#[derive(Clone)]
pub struct MediaIndexResolver<'a> {
    fetcher: &'a (dyn Fetcher + Send + Sync),
    endpoints: &'a Endpoints,
}

impl<'a> MediaIndexResolver<'a> {
    pub fn new(fetcher: &'a (dyn Fetcher + Send + Sync), endpoints: &'a Endpoints) -> Self {
        Self { fetcher, endpoints }
    }

    /// One fetch of the item's media endpoint.
    ///
    /// `None` means the listing could not be obtained, as opposed to an
    /// empty index for an item that has no media.
    pub async fn resolve(&self, item_id: &str) -> Option<MediaIndex> {
        let url = self.endpoints.media(item_id);

        let index = match self.fetcher.fetch_json(&url).await {
            Ok(listing) => MediaIndex::from_listing(&url, listing),
            Err(e) => Err(e),
        };

        match index {
            Ok(index) => {
                debug!(item_id, records = index.len(), "Media index loaded");
                Some(index)
            }
            Err(e) => {
                warn!(item_id, error = %e, "Media index unavailable");
                None
            }
        }
    }
}

/// Resolve-once holder for the media index of a single item resolution.
///
/// The listing is fetched on the first [`get`](Self::get) and reused for
/// every later call, including when the fetch failed.
pub struct MediaIndexCell<'a> {
    resolver: MediaIndexResolver<'a>,
    item_id: &'a str,
    cell: OnceCell<Option<MediaIndex>>,
}

impl<'a> MediaIndexCell<'a> {
    pub fn new(resolver: MediaIndexResolver<'a>, item_id: &'a str) -> Self {
        Self {
            resolver,
            item_id,
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Option<&MediaIndex> {
        self.cell
            .get_or_init(|| self.resolver.resolve(self.item_id))
            .await
            .as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::scripted::ScriptedFetcher;
    use serde_json::json;

    const BASE: &str = "https://example.com/data";

    #[test]
    fn test_index_by_id() {
        let index = MediaIndex::from_listing(
            "u",
            json!([
                { "id": "m1", "type": "image", "url": "https://x/y.jpg" },
                { "id": "m2", "type": "media", "url": "https://x/z.mp4" },
                { "id": 3, "type": "image", "url": "https://x/3.jpg" },
                { "type": "image" },
                { "id": null, "type": "image" },
                "junk"
            ]),
        )
        .unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.get("m1").unwrap()["url"], json!("https://x/y.jpg"));
        assert_eq!(index.get("3").unwrap()["url"], json!("https://x/3.jpg"));
        assert!(index.get("m3").is_none());
    }

    #[test]
    fn test_non_array_listing_is_rejected() {
        let err = MediaIndex::from_listing("u", json!({ "id": "m1" })).unwrap_err();
        assert!(matches!(err, QuireError::Payload { .. }));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_none_not_empty() {
        let endpoints = Endpoints::new(BASE).unwrap();
        let fetcher = ScriptedFetcher::new();
        let resolver = MediaIndexResolver::new(&fetcher, &endpoints);

        assert_eq!(resolver.resolve("a1").await, None);
    }

    #[tokio::test]
    async fn test_empty_listing_is_empty_index() {
        let endpoints = Endpoints::new(BASE).unwrap();
        let fetcher = ScriptedFetcher::new().with(endpoints.media("a1"), json!([]));
        let resolver = MediaIndexResolver::new(&fetcher, &endpoints);

        let index = resolver.resolve("a1").await.unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_cell_fetches_once() {
        let endpoints = Endpoints::new(BASE).unwrap();
        let fetcher = ScriptedFetcher::new()
            .with(endpoints.media("a1"), json!([{ "id": "m1", "type": "image" }]));
        let cell = MediaIndexCell::new(MediaIndexResolver::new(&fetcher, &endpoints), "a1");

        assert!(!cell.is_resolved());
        assert!(cell.get().await.is_some());
        assert!(cell.get().await.is_some());
        assert!(cell.is_resolved());
        assert_eq!(fetcher.calls(&endpoints.media("a1")), 1);
    }

    #[tokio::test]
    async fn test_cell_remembers_failure() {
        let endpoints = Endpoints::new(BASE).unwrap();
        let fetcher = ScriptedFetcher::new();
        let cell = MediaIndexCell::new(MediaIndexResolver::new(&fetcher, &endpoints), "a1");

        assert!(cell.get().await.is_none());
        assert!(cell.get().await.is_none());
        assert_eq!(fetcher.calls(&endpoints.media("a1")), 1);
    }
}
