//! Item resolution: detail fetch, section mapping and media joins.
//!
//! ```text
//! Heading → detail payload → ItemMeta
//!                          → sections → SectionMapper (→ MediaIndexCell) → Item
//! ```

pub mod endpoints;
mod html;
pub mod mapper;
pub mod media;

pub use endpoints::Endpoints;
pub use html::strip_html;
pub use mapper::{SectionError, SectionMapper};
pub use media::{MediaIndex, MediaIndexCell, MediaIndexResolver};

use std::sync::Arc;

use chrono::Local;
use serde_json::Value;
use tracing::{debug, warn};

use crate::app::{QuireError, Result};
use crate::config::{Config, Disposition, SectionPolicy, TimestampConfig};
use crate::domain::{Heading, Item, ItemMeta, ValidationError};
use crate::fetcher::Fetcher;

/// Resolves catalog headings into validated items.
///
/// Holds no per-item state; every [`resolve`](Self::resolve) call builds
/// its own media index, so one resolver can serve concurrent resolutions.
pub struct ItemResolver {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    endpoints: Endpoints,
    mapper: SectionMapper,
    policy: SectionPolicy,
    timestamps: TimestampConfig,
}

impl ItemResolver {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        endpoints: Endpoints,
        timestamps: TimestampConfig,
        policy: SectionPolicy,
    ) -> Self {
        Self {
            fetcher,
            endpoints,
            mapper: SectionMapper::new(timestamps.media_separator),
            policy,
            timestamps,
        }
    }

    pub fn from_config(fetcher: Arc<dyn Fetcher + Send + Sync>, config: &Config) -> Result<Self> {
        let endpoints = Endpoints::new(&config.source.base_url)?;
        Ok(Self::new(fetcher, endpoints, config.timestamps, config.sections))
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetch and assemble one item.
    pub async fn resolve(&self, heading: &Heading) -> Result<Item> {
        let url = self.endpoints.article(&heading.id);
        let detail = match self.fetcher.fetch_json(&url).await? {
            Value::Object(detail) => detail,
            _ => {
                return Err(QuireError::Payload {
                    url,
                    expected: "a JSON object",
                })
            }
        };

        let invalid = |source| QuireError::Validation {
            item_id: heading.id.clone(),
            source,
        };

        // The payload's own id names the item from here on.
        let now = Local::now().naive_local();
        let meta = ItemMeta::from_detail(
            &detail,
            |id| self.endpoints.article(id),
            &self.timestamps,
            now,
        )
        .map_err(invalid)?;

        let raw_sections = match detail.get("sections") {
            Some(Value::Array(sections)) => sections,
            None | Some(Value::Null) => {
                return Err(invalid(ValidationError::MissingField("sections".into())))
            }
            Some(_) => {
                return Err(invalid(ValidationError::WrongType {
                    field: "sections".into(),
                    expected: "a list",
                }))
            }
        };

        let media = MediaIndexCell::new(
            MediaIndexResolver::new(self.fetcher.as_ref(), &self.endpoints),
            &meta.id,
        );

        let mut sections = Vec::with_capacity(raw_sections.len());
        for (index, raw) in raw_sections.iter().enumerate() {
            match self.mapper.map_section(raw, &media).await {
                Ok(section) => sections.push(section),
                Err(e) => match e.disposition(&self.policy) {
                    Disposition::Skip => {
                        warn!(item_id = %meta.id, section_index = index, error = %e, "Dropping section");
                    }
                    Disposition::Abort => {
                        return Err(QuireError::Section {
                            item_id: meta.id.clone(),
                            index,
                            source: e,
                        });
                    }
                },
            }
        }

        debug!(
            item_id = %meta.id,
            title = heading.display_title(),
            sections = sections.len(),
            dropped = raw_sections.len() - sections.len(),
            media_fetched = media.is_resolved(),
            "Item resolved"
        );

        Ok(meta.into_item(sections))
    }
}
