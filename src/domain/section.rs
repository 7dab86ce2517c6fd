use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::domain::validation::{Fields, ValidationError};

/// Discriminator of a [`Section`], as written in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Header,
    Title,
    Lead,
    Text,
    Image,
    Media,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Header,
        SectionKind::Title,
        SectionKind::Lead,
        SectionKind::Text,
        SectionKind::Image,
        SectionKind::Media,
    ];

    /// Look up a variant by its discriminator. Unknown strings yield `None`.
    pub fn from_discriminator(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Header => "header",
            SectionKind::Title => "title",
            SectionKind::Lead => "lead",
            SectionKind::Text => "text",
            SectionKind::Image => "image",
            SectionKind::Media => "media",
        }
    }

    /// Whether the canonical content of this variant lives in the media index.
    pub fn needs_media(&self) -> bool {
        matches!(self, SectionKind::Image | SectionKind::Media)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed content block of an [`Item`](crate::domain::Item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Section {
    Header(HeaderSection),
    Title(TitleSection),
    Lead(LeadSection),
    Text(TextSection),
    Image(ImageSection),
    Media(MediaSection),
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        match self {
            Section::Header(_) => SectionKind::Header,
            Section::Title(_) => SectionKind::Title,
            Section::Lead(_) => SectionKind::Lead,
            Section::Text(_) => SectionKind::Text,
            Section::Image(_) => SectionKind::Image,
            Section::Media(_) => SectionKind::Media,
        }
    }

    /// Build the variant `kind` from already-projected field data.
    ///
    /// `sep` is the time separator for instant fields.
    pub fn from_fields(
        kind: SectionKind,
        fields: &Fields<'_>,
        sep: char,
    ) -> Result<Self, ValidationError> {
        let section = match kind {
            SectionKind::Header => Section::Header(HeaderSection {
                level: header_level(fields)?,
                text: fields.str("text")?.to_string(),
            }),
            SectionKind::Title => Section::Title(TitleSection {
                text: fields.str("text")?.to_string(),
            }),
            SectionKind::Lead => Section::Lead(LeadSection {
                text: fields.str("text")?.to_string(),
            }),
            SectionKind::Text => Section::Text(TextSection {
                text: fields.str("text")?.to_string(),
            }),
            SectionKind::Image => Section::Image(ImageSection {
                url: fields.url("url")?,
                alt: fields.opt_string("alt")?,
                caption: fields.opt_string("caption")?,
                source: fields.opt_string("source")?,
            }),
            SectionKind::Media => Section::Media(MediaSection {
                id: fields.id("id")?,
                url: fields.url("url")?,
                thumbnail: fields.opt_url("thumbnail")?,
                caption: fields.opt_string("caption")?,
                author: fields.opt_string("author")?,
                publication_date: fields.instant("publication_date", sep)?,
                modification_date: media_modification_date(fields, sep),
                duration: duration(fields)?,
            }),
        };
        Ok(section)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderSection {
    /// Higher numbers are less important.
    pub level: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleSection {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadSection {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSection {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSection {
    pub url: Url,
    pub alt: Option<String>,
    pub caption: Option<String>,
    /// Author or organization credited for the image.
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSection {
    /// Provider id of the media record.
    pub id: String,
    pub url: Url,
    pub thumbnail: Option<Url>,
    pub caption: Option<String>,
    pub author: Option<String>,
    pub publication_date: NaiveDateTime,
    pub modification_date: Option<NaiveDateTime>,
    /// Length in seconds.
    pub duration: Option<u64>,
}

/// A media record's modification instant is informational; a value that
/// does not parse is dropped rather than failing the section.
fn media_modification_date(fields: &Fields<'_>, sep: char) -> Option<NaiveDateTime> {
    fields
        .opt_instant("modification_date", sep)
        .unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring malformed media modification date");
            None
        })
}

fn header_level(fields: &Fields<'_>) -> Result<u32, ValidationError> {
    u32::try_from(fields.int("level")?).map_err(|_| ValidationError::WrongType {
        field: "level".into(),
        expected: "a non-negative integer",
    })
}

fn duration(fields: &Fields<'_>) -> Result<Option<u64>, ValidationError> {
    fields
        .opt_int("duration")?
        .map(|secs| {
            u64::try_from(secs).map_err(|_| ValidationError::WrongType {
                field: "duration".into(),
                expected: "a non-negative number of seconds",
            })
        })
        .transpose()
}
