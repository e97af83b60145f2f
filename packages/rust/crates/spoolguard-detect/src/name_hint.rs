//! Multiplicity markers in descriptive job names.
//!
//! Lowest-confidence signal. Callers must not feed it an identity composite
//! (`"<queue>, <id>"`): the trailing number there is an id.

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static TIMES_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,4})\s*x\b").expect("valid times regex"));

#[allow(clippy::expect_used)]
static PAREN_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\(\s*(\d{1,4})\s*(?:copies|copie|copia|copy)\s*\)").expect("valid paren regex")
});

#[allow(clippy::expect_used)]
static COPY_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:copies|copie|copia|copy)\b|\bcop\.").expect("valid keyword regex")
});

#[allow(clippy::expect_used)]
static TRAILING_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,4})\s*$").expect("valid trailing regex"));

/// Extract a copy count from a free-text job name.
///
/// Explicit markers (`3x`, `3 x`, `(3 copies)`) win. Otherwise, only when the
/// name carries a copy keyword, a numeric suffix after the last comma or any
/// trailing digits are taken as the count.
#[must_use]
pub fn parse_name_hint(name: &str) -> Option<u32> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    if let Some(value) = capture(&TIMES_MARKER, name).or_else(|| capture(&PAREN_MARKER, name)) {
        return Some(value);
    }

    if !COPY_KEYWORD.is_match(name) {
        return None;
    }

    if let Some((_, suffix)) = name.rsplit_once(',') {
        let suffix = suffix.trim();
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            return positive(suffix);
        }
    }
    capture(&TRAILING_DIGITS, name)
}

fn capture(pattern: &Regex, text: &str) -> Option<u32> {
    pattern
        .captures_iter(text)
        .find_map(|caps| caps.get(1).and_then(|value| positive(value.as_str())))
}

fn positive(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|value| *value > 0)
}
