use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::config::TimestampConfig;
use crate::domain::section::Section;
use crate::domain::validation::{http_url, id_value, Fields, ValidationError};

/// Catalog entry naming an item to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl Heading {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    id_value(&value)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| de::Error::custom("id must be a non-empty string or an integer"))
}

/// A fully resolved content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub original_language: String,
    pub url: Url,
    pub thumbnail: Option<Url>,
    /// `None` when the provider gave no categories, never an empty set.
    pub categories: Option<BTreeSet<String>>,
    pub tags: Option<BTreeSet<String>>,
    pub author: Option<String>,
    pub publication_date: NaiveDateTime,
    pub modification_date: NaiveDateTime,
    pub sections: Vec<Section>,
}

impl Item {
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Validated top-level fields of an item, before its sections are mapped.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemMeta {
    pub id: String,
    pub original_language: String,
    pub url: Url,
    pub thumbnail: Option<Url>,
    pub categories: Option<BTreeSet<String>>,
    pub tags: Option<BTreeSet<String>>,
    pub author: Option<String>,
    pub publication_date: NaiveDateTime,
    pub modification_date: NaiveDateTime,
}

impl ItemMeta {
    /// Read the scalar fields of a raw detail payload.
    ///
    /// `url_for` maps the payload's own id to the canonical item URL and
    /// `now` is the fallback modification instant.
    pub fn from_detail(
        detail: &Map<String, Value>,
        url_for: impl FnOnce(&str) -> String,
        timestamps: &TimestampConfig,
        now: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        let fields = Fields::new(detail);
        let id = fields.id("id")?;
        let url = http_url("url", &url_for(&id))?;

        Ok(Self {
            original_language: fields.str("original_language")?.to_string(),
            url,
            thumbnail: fields.opt_url("thumbnail")?,
            categories: label_set(detail, "category")?,
            tags: label_set(detail, "tag")?,
            author: fields.opt_string("author")?,
            publication_date: fields.instant("pub_date", timestamps.detail_separator)?,
            modification_date: fields
                .opt_instant("mod_date", timestamps.modification_separator)?
                .unwrap_or(now),
            id,
        })
    }

    pub fn into_item(self, sections: Vec<Section>) -> Item {
        Item {
            id: self.id,
            original_language: self.original_language,
            url: self.url,
            thumbnail: self.thumbnail,
            categories: self.categories,
            tags: self.tags,
            author: self.author,
            publication_date: self.publication_date,
            modification_date: self.modification_date,
            sections,
        }
    }
}

/// A single label or a list of labels. Absent, null and empty all map to `None`.
fn label_set(
    detail: &Map<String, Value>,
    key: &str,
) -> Result<Option<BTreeSet<String>>, ValidationError> {
    let wrong_type = || ValidationError::WrongType {
        field: key.to_string(),
        expected: "a string or a list of strings",
    };

    let labels: BTreeSet<String> = match detail.get(key) {
        None | Some(Value::Null) => BTreeSet::new(),
        Some(Value::String(label)) => {
            std::iter::once(label.clone()).filter(|l| !l.is_empty()).collect()
        }
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| v.as_str().map(String::from).ok_or_else(wrong_type))
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(wrong_type()),
    };

    Ok((!labels.is_empty()).then_some(labels))
}
