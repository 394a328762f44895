//! Text normalization and number formatting helpers.

use crate::types::NormalizedValue;

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::new();
    let mut seen_space = false;
    for ch in text.as_ref().chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.push(ch);
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}

/// Whitespace-collapsed, lowercased form used for status and category matching.
pub fn normalize_key<T: AsRef<str>>(text: T) -> NormalizedValue {
    normalize_inline_whitespace(text).to_lowercase()
}

/// Strip currency symbols and digit separators from a numeric string.
pub fn strip_numeric_decorations(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | '_') && !ch.is_whitespace())
        .collect()
}

/// Render a whole number with `,` thousands separators.
pub fn format_with_commas(value: u64) -> String {
    let raw = value.to_string();
    let mut grouped_reversed = String::with_capacity(raw.len() + (raw.len() / 3));
    for (idx, ch) in raw.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            grouped_reversed.push(',');
        }
        grouped_reversed.push(ch);
    }
    grouped_reversed.chars().rev().collect()
}
