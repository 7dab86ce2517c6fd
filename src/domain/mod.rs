pub mod instant;
pub mod item;
pub mod section;
pub mod validation;

pub use instant::{parse_instant, InstantError};
pub use item::{Heading, Item, ItemMeta};
pub use section::{
    HeaderSection, ImageSection, LeadSection, MediaSection, Section, SectionKind, TextSection,
    TitleSection,
};
pub use validation::{id_value, Fields, ValidationError};
