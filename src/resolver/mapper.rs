use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{Disposition, SectionPolicy};
use crate::domain::{id_value, Fields, Section, SectionKind, ValidationError};
use crate::resolver::html::strip_html;
use crate::resolver::media::MediaIndexCell;

/// Why a raw section did not become a [`Section`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SectionError {
    #[error("section is not a JSON object")]
    NotAnObject,

    #[error("section has no `type` discriminator")]
    MissingDiscriminator,

    #[error("unknown section type `{0}`")]
    UnknownVariant(String),

    #[error("media index unavailable for {0} section")]
    MediaUnavailable(SectionKind),

    #[error("{0} section has no media `id`")]
    MissingMediaId(SectionKind),

    #[error("media record `{0}` not found")]
    MediaNotFound(String),

    #[error("invalid {kind} section: {source}")]
    Invalid {
        kind: SectionKind,
        source: ValidationError,
    },
}

impl SectionError {
    /// Whether this failure drops the section or rejects the item.
    pub fn disposition(&self, policy: &SectionPolicy) -> Disposition {
        match self {
            SectionError::UnknownVariant(_) => policy.on_unknown_type,
            SectionError::MediaUnavailable(_) | SectionError::MediaNotFound(_) => {
                Disposition::Skip
            }
            SectionError::NotAnObject
            | SectionError::MissingDiscriminator
            | SectionError::MissingMediaId(_)
            | SectionError::Invalid { .. } => policy.on_invalid,
        }
    }
}

/// A section field and the raw key it is read from.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub source: &'static str,
    pub required: bool,
}

const fn field(name: &'static str, required: bool) -> FieldSpec {
    FieldSpec {
        name,
        source: name,
        required,
    }
}

const TEXT_FIELDS: &[FieldSpec] = &[field("text", true)];

const HEADER_FIELDS: &[FieldSpec] = &[field("level", true), field("text", true)];

const IMAGE_FIELDS: &[FieldSpec] = &[
    field("url", true),
    field("alt", false),
    field("caption", false),
    field("source", false),
];

const MEDIA_FIELDS: &[FieldSpec] = &[
    field("id", true),
    field("url", true),
    field("thumbnail", false),
    field("caption", false),
    field("author", false),
    FieldSpec {
        name: "publication_date",
        source: "pub_date",
        required: true,
    },
    FieldSpec {
        name: "modification_date",
        source: "mod_date",
        required: false,
    },
    field("duration", false),
];

/// Field layout of each variant.
pub fn schema(kind: SectionKind) -> &'static [FieldSpec] {
    match kind {
        SectionKind::Header => HEADER_FIELDS,
        SectionKind::Title | SectionKind::Lead | SectionKind::Text => TEXT_FIELDS,
        SectionKind::Image => IMAGE_FIELDS,
        SectionKind::Media => MEDIA_FIELDS,
    }
}

/// Turns raw section descriptors into typed sections.
#[derive(Debug, Clone, Copy)]
pub struct SectionMapper {
    media_separator: char,
}

impl SectionMapper {
    pub fn new(media_separator: char) -> Self {
        Self { media_separator }
    }

    /// Map one raw descriptor.
    ///
    /// Image and media sections are joined with their record from the item's
    /// media index; the record wins on overlapping keys. The index is only
    /// fetched when the first such section is met.
    pub async fn map_section(
        &self,
        raw: &Value,
        media: &MediaIndexCell<'_>,
    ) -> Result<Section, SectionError> {
        let descriptor = raw.as_object().ok_or(SectionError::NotAnObject)?;
        let kind = discriminator(descriptor)?;

        if !kind.needs_media() {
            return self.build(kind, descriptor);
        }

        let index = media
            .get()
            .await
            .ok_or(SectionError::MediaUnavailable(kind))?;
        let media_id = descriptor
            .get("id")
            .and_then(id_value)
            .ok_or(SectionError::MissingMediaId(kind))?;
        let record = index
            .get(&media_id)
            .ok_or(SectionError::MediaNotFound(media_id))?;

        let mut merged = descriptor.clone();
        merged.extend(record.iter().map(|(k, v)| (k.clone(), v.clone())));

        // An image reference takes its concrete shape from the record.
        let kind = match kind {
            SectionKind::Image => discriminator(&merged)?,
            other => other,
        };

        self.build(kind, &merged)
    }

    /// Project `data` onto the schema of `kind` and construct the section.
    pub fn build(&self, kind: SectionKind, data: &Map<String, Value>) -> Result<Section, SectionError> {
        let invalid = |source| SectionError::Invalid { kind, source };

        let mut projected = Map::new();
        for spec in schema(kind) {
            match data.get(spec.source).filter(|v| !v.is_null()) {
                Some(value) => {
                    projected.insert(spec.name.to_string(), clean(spec.name, value));
                }
                None if spec.required => {
                    return Err(invalid(ValidationError::MissingField(spec.name.to_string())));
                }
                None => {}
            }
        }

        Section::from_fields(kind, &Fields::new(&projected), self.media_separator).map_err(invalid)
    }
}

fn discriminator(data: &Map<String, Value>) -> Result<SectionKind, SectionError> {
    let tag = data
        .get("type")
        .and_then(Value::as_str)
        .ok_or(SectionError::MissingDiscriminator)?;
    SectionKind::from_discriminator(tag).ok_or_else(|| SectionError::UnknownVariant(tag.to_string()))
}

/// Body text arrives as HTML.
fn clean(name: &str, value: &Value) -> Value {
    match (name, value) {
        ("text", Value::String(html)) => Value::String(strip_html(html)),
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HeaderSection, ImageSection, LeadSection, TextSection, TitleSection};
    use crate::fetcher::scripted::ScriptedFetcher;
    use crate::resolver::endpoints::Endpoints;
    use crate::resolver::media::MediaIndexResolver;
    use serde_json::json;
    use std::collections::HashSet;

    const BASE: &str = "https://example.com/data";

    fn endpoints() -> Endpoints {
        Endpoints::new(BASE).unwrap()
    }

    fn media_listing() -> Value {
        json!([
            { "id": "m1", "type": "image", "url": "https://x/y.jpg", "alt": "A" },
            {
                "id": "m2",
                "type": "media",
                "url": "https://x/clip.mp4",
                "caption": "Clip",
                "pub_date": "2020-07-08-20;50;43",
                "duration": 90
            },
            {
                "id": "m3",
                "type": "media",
                "url": "https://x/other.mp4",
                "pub_date": "2020-07-08-21;00;00"
            },
            { "id": 4, "type": "image", "url": "https://x/4.jpg" }
        ])
    }

    async fn map_with(fetcher: &ScriptedFetcher, raw: Value) -> Result<Section, SectionError> {
        let endpoints = endpoints();
        let cell = MediaIndexCell::new(MediaIndexResolver::new(fetcher, &endpoints), "a1");
        SectionMapper::new(';').map_section(&raw, &cell).await
    }

    fn with_media() -> ScriptedFetcher {
        ScriptedFetcher::new().with(endpoints().media("a1"), media_listing())
    }

    #[tokio::test]
    async fn test_text_variants() {
        let fetcher = ScriptedFetcher::new();

        let section = map_with(&fetcher, json!({ "type": "title", "text": "T" })).await;
        assert_eq!(section, Ok(Section::Title(TitleSection { text: "T".into() })));

        let section = map_with(&fetcher, json!({ "type": "lead", "text": "<b>L</b>" })).await;
        assert_eq!(section, Ok(Section::Lead(LeadSection { text: "L".into() })));

        let section = map_with(&fetcher, json!({ "type": "text", "text": "a &amp; b" })).await;
        assert_eq!(section, Ok(Section::Text(TextSection { text: "a & b".into() })));

        let section = map_with(&fetcher, json!({ "type": "header", "level": 1, "text": "H" })).await;
        assert_eq!(
            section,
            Ok(Section::Header(HeaderSection {
                level: 1,
                text: "H".into()
            }))
        );

        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_extra_fields_are_dropped() {
        let fetcher = ScriptedFetcher::new();
        let section = map_with(
            &fetcher,
            json!({ "type": "title", "text": "T", "level": 3, "colour": "red" }),
        )
        .await
        .unwrap();

        assert_eq!(
            serde_json::to_value(section).unwrap(),
            json!({ "type": "title", "text": "T" })
        );
    }

    #[tokio::test]
    async fn test_image_joined_with_record() {
        let fetcher = with_media();
        let section = map_with(&fetcher, json!({ "type": "image", "id": "m1" })).await;

        assert_eq!(
            section,
            Ok(Section::Image(ImageSection {
                url: "https://x/y.jpg".parse().unwrap(),
                alt: Some("A".into()),
                caption: None,
                source: None,
            }))
        );
    }

    #[tokio::test]
    async fn test_record_fields_take_precedence() {
        let fetcher = with_media();
        let section = map_with(
            &fetcher,
            json!({ "type": "image", "id": "m1", "alt": "stale", "caption": "kept" }),
        )
        .await
        .unwrap();

        let Section::Image(image) = section else {
            panic!("expected an image section");
        };
        assert_eq!(image.alt.as_deref(), Some("A"));
        assert_eq!(image.caption.as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn test_image_reference_resolving_to_media() {
        let fetcher = with_media();
        let section = map_with(&fetcher, json!({ "type": "image", "id": "m2" }))
            .await
            .unwrap();

        let Section::Media(media) = section else {
            panic!("expected a media section");
        };
        assert_eq!(media.id, "m2");
        assert_eq!(media.caption.as_deref(), Some("Clip"));
        assert_eq!(media.duration, Some(90));
        assert_eq!(media.modification_date, None);
    }

    #[tokio::test]
    async fn test_media_section() {
        let fetcher = with_media();
        let section = map_with(&fetcher, json!({ "type": "media", "id": "m3" }))
            .await
            .unwrap();

        assert_eq!(section.kind(), SectionKind::Media);
        assert_eq!(
            serde_json::to_value(section).unwrap(),
            json!({
                "type": "media",
                "id": "m3",
                "url": "https://x/other.mp4",
                "thumbnail": null,
                "caption": null,
                "author": null,
                "publication_date": "2020-07-08T21:00:00",
                "modification_date": null,
                "duration": null
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let fetcher = ScriptedFetcher::new();
        let err = map_with(&fetcher, json!({ "type": "quiz", "text": "?" }))
            .await
            .unwrap_err();
        assert_eq!(err, SectionError::UnknownVariant("quiz".into()));
    }

    #[tokio::test]
    async fn test_missing_discriminator() {
        let fetcher = ScriptedFetcher::new();
        let err = map_with(&fetcher, json!({ "text": "?" })).await.unwrap_err();
        assert_eq!(err, SectionError::MissingDiscriminator);

        let err = map_with(&fetcher, json!("text")).await.unwrap_err();
        assert_eq!(err, SectionError::NotAnObject);
    }

    #[tokio::test]
    async fn test_missing_required_field() {
        let fetcher = ScriptedFetcher::new();
        let err = map_with(&fetcher, json!({ "type": "header", "text": "H" }))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SectionError::Invalid {
                kind: SectionKind::Header,
                source: ValidationError::MissingField("level".into()),
            }
        );
    }

    #[tokio::test]
    async fn test_media_unavailable() {
        let fetcher = ScriptedFetcher::new();
        let err = map_with(&fetcher, json!({ "type": "image", "id": "m1" }))
            .await
            .unwrap_err();
        assert_eq!(err, SectionError::MediaUnavailable(SectionKind::Image));
    }

    #[tokio::test]
    async fn test_numeric_media_reference() {
        let fetcher = with_media();
        let section = map_with(&fetcher, json!({ "type": "image", "id": 4 }))
            .await
            .unwrap();
        let Section::Image(image) = section else {
            panic!("expected an image section");
        };
        assert_eq!(image.url.as_str(), "https://x/4.jpg");

        let err = map_with(&fetcher, json!({ "type": "image", "id": [4] }))
            .await
            .unwrap_err();
        assert_eq!(err, SectionError::MissingMediaId(SectionKind::Image));
    }

    #[tokio::test]
    async fn test_media_record_not_found() {
        let fetcher = with_media();
        let err = map_with(&fetcher, json!({ "type": "media", "id": "nope" }))
            .await
            .unwrap_err();
        assert_eq!(err, SectionError::MediaNotFound("nope".into()));
    }

    #[test]
    fn test_disposition_follows_policy() {
        let policy = SectionPolicy::default();
        assert_eq!(
            SectionError::UnknownVariant("x".into()).disposition(&policy),
            Disposition::Skip
        );
        assert_eq!(
            SectionError::MissingDiscriminator.disposition(&policy),
            Disposition::Abort
        );
        assert_eq!(
            SectionError::MediaUnavailable(SectionKind::Media).disposition(&SectionPolicy::strict()),
            Disposition::Skip
        );
        assert_eq!(
            SectionError::MediaNotFound("m".into()).disposition(&SectionPolicy::strict()),
            Disposition::Skip
        );
    }

    #[test]
    fn test_schema_lists_each_variant_field_once() {
        for kind in SectionKind::ALL {
            let names: Vec<_> = schema(kind).iter().map(|f| f.name).collect();
            let unique: HashSet<_> = names.iter().collect();
            assert_eq!(names.len(), unique.len(), "{kind}");
        }
        assert_eq!(schema(SectionKind::Media).len(), 8);
        assert_eq!(schema(SectionKind::Image).len(), 4);
    }
}
