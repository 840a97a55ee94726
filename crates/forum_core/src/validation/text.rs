//! Free-text normalization.
//!
//! Sanitizing removes markup tags and every control character other than
//! newline and tab. A tag starts at `<` followed by a non-whitespace character
//! and runs to the next `>` (or to the end of input when unterminated). A `<`
//! followed by whitespace and a lone `>` are ordinary text. Quotes are kept:
//! all values reach storage through bound parameters.

use super::{RawValue, ValidationError, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^\s>][^>]*(?:>|$)").expect("valid markup tag regex"));

/// Strips markup and non-printable characters from `value`.
pub fn sanitize_text(value: &str) -> String {
    MARKUP_TAG
        .replace_all(value, "")
        .chars()
        .filter(|ch| !ch.is_control() || *ch == '\n' || *ch == '\t')
        .collect()
}

/// Normalizes a free-text field bounded to `max_chars` characters.
///
/// # Errors
/// - `InvalidType` for timestamps and binary values.
/// - `InvalidInput` when the value is null or empty after trimming/sanitizing.
/// - `OutOfRange` when the normalized value exceeds `max_chars` characters.
pub fn bounded_text(raw: &RawValue, max_chars: usize) -> ValidationResult<String> {
    let text = match raw {
        RawValue::Null => String::new(),
        RawValue::Text(value) => value.clone(),
        RawValue::Integer(value) => value.to_string(),
        RawValue::Float(value) => value.to_string(),
        RawValue::Timestamp(_) | RawValue::Bytes(_) => {
            return Err(ValidationError::InvalidType {
                expected: "text",
                found: raw.describe(),
            });
        }
    };

    let normalized = sanitize_text(text.trim()).trim().to_string();
    if normalized.is_empty() {
        return Err(ValidationError::InvalidInput(
            "text is empty or insecure".to_string(),
        ));
    }

    let length = normalized.chars().count();
    if length > max_chars {
        return Err(ValidationError::OutOfRange(format!(
            "text has {length} characters, limit is {max_chars}"
        )));
    }

    Ok(normalized)
}
