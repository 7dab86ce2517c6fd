//! Provider date-time codec.
//!
//! The provider writes instants as `YYYY-MM-DD-HH?MM?SS`, where `?` is a
//! separator that differs between endpoints. There is no offset in the
//! source format, so values are kept as naive date-times.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Separator used by the detail and media payloads.
pub const DETAIL_SEPARATOR: char = ';';

/// Separator of an item's own `mod_date`.
pub const MODIFICATION_SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstantError {
    #[error("`{input}` does not match YYYY-MM-DD-HH{sep}MM{sep}SS")]
    Shape { input: String, sep: char },

    #[error("`{input}` is not a valid date-time: {source}")]
    Invalid {
        input: String,
        source: chrono::ParseError,
    },
}

/// Parse a provider instant using `sep` between the time components.
pub fn parse_instant(text: &str, sep: char) -> Result<NaiveDateTime, InstantError> {
    let shape_error = || InstantError::Shape {
        input: text.to_string(),
        sep,
    };

    let (date, time) = split_date_time(text).ok_or_else(shape_error)?;
    if !has_shape(date, '-', [4, 2, 2]) || !has_shape(time, sep, [2, 2, 2]) {
        return Err(shape_error());
    }

    // chrono reads `%` as a directive marker
    let sep = if sep == '%' {
        "%%".to_string()
    } else {
        sep.to_string()
    };
    let format = format!("%Y-%m-%d-%H{sep}%M{sep}%S");

    NaiveDateTime::parse_from_str(text, &format).map_err(|source| InstantError::Invalid {
        input: text.to_string(),
        source,
    })
}

/// Split `YYYY-MM-DD-rest` into the date part and the time part.
fn split_date_time(text: &str) -> Option<(&str, &str)> {
    let mut dashes = text.match_indices('-').map(|(i, _)| i);
    let third = dashes.nth(2)?;
    Some((&text[..third], &text[third + 1..]))
}

fn has_shape(part: &str, sep: char, widths: [usize; 3]) -> bool {
    let fields: Vec<&str> = part.split(sep).collect();
    fields.len() == widths.len()
        && fields
            .iter()
            .zip(widths)
            .all(|(field, width)| field.len() == width && field.bytes().all(|b| b.is_ascii_digit()))
}
