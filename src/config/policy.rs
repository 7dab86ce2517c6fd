use serde::{Deserialize, Serialize};

/// What to do with a section that cannot be mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Drop the section and keep the rest of the item.
    Skip,
    /// Reject the whole item.
    Abort,
}

/// How section mapping failures affect the enclosing item.
///
/// Sections that depend on an unavailable media index are always skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionPolicy {
    /// Discriminator not recognised.
    pub on_unknown_type: Disposition,
    /// Missing or malformed field, including a missing discriminator.
    pub on_invalid: Disposition,
}

impl Default for SectionPolicy {
    fn default() -> Self {
        Self {
            on_unknown_type: Disposition::Skip,
            on_invalid: Disposition::Abort,
        }
    }
}

impl SectionPolicy {
    /// Drop every failing section, never reject an item because of one.
    pub fn lenient() -> Self {
        Self {
            on_unknown_type: Disposition::Skip,
            on_invalid: Disposition::Skip,
        }
    }

    /// Reject an item on any unknown or malformed section.
    pub fn strict() -> Self {
        Self {
            on_unknown_type: Disposition::Abort,
            on_invalid: Disposition::Abort,
        }
    }
}
