//! Copy-count extraction from embedded print tickets.
//!
//! Tickets arrive as XML or XML-ish text of unknown schema. Rather than
//! validating them, the scanner probes for copy indicators in a fixed order:
//!
//! 1. tag-delimited values whose tag name mentions copies
//! 2. attributes whose name mentions copies
//! 3. a loose `copy(count)?=N` pattern
//! 4. Print Schema style `name="...Copies..."` parameters with a nested value
//!
//! The first positive integer wins.

use once_cell::sync::Lazy;
use regex::Regex;

/// Tag-name fragments that mark a copy-count element.
const TAG_KEYWORDS: &[&str] = &["copy", "copies", "jobcopies", "copycount"];

#[allow(clippy::expect_used)]
static OPEN_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<\s*([A-Za-z_][\w:.\-]*)([^<>]*)>").expect("valid open-tag regex")
});

#[allow(clippy::expect_used)]
static COPY_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)([\w:.\-]*cop(?:y|ies)[\w:.\-]*)\s*=\s*["']?\s*(\d+)\s*["']?"#)
        .expect("valid attribute regex")
});

#[allow(clippy::expect_used)]
static COPY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)copy(?:count|-count)?\s*=\s*"?(\d+)"?"#).expect("valid pattern regex")
});

#[allow(clippy::expect_used)]
static NAMED_PARAMETER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)name\s*=\s*["'][^"']*copies[^"']*["'][^>]*>.*?<[^>]*value[^>]*>\s*(\d+)"#)
        .expect("valid named-parameter regex")
});

#[allow(clippy::expect_used)]
static DIGITS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+").expect("valid digits regex")
});

/// Scan a ticket blob for a positive copy count.
#[must_use]
pub fn parse_ticket_copies(ticket: &str) -> Option<u32> {
    if ticket.trim().is_empty() {
        return None;
    }
    tag_value(ticket)
        .or_else(|| attribute_value(ticket))
        .or_else(|| first_capture(&COPY_PATTERN, ticket))
        .or_else(|| first_capture(&NAMED_PARAMETER, ticket))
}

fn tag_value(ticket: &str) -> Option<u32> {
    let lowered = ticket.to_ascii_lowercase();
    for caps in OPEN_TAG.captures_iter(ticket) {
        let (Some(whole), Some(name), attrs) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if attrs.is_some_and(|attrs| attrs.as_str().trim_end().ends_with('/')) {
            continue;
        }
        let name = name.as_str().to_ascii_lowercase();
        let local = name.rsplit(':').next().unwrap_or(&name);
        if !TAG_KEYWORDS.iter().any(|keyword| local.contains(keyword)) {
            continue;
        }
        let body_start = whole.end();
        let closing = format!("</{name}");
        let Some(body_len) = lowered[body_start..].find(&closing) else {
            continue;
        };
        let body = &ticket[body_start..body_start + body_len];
        if let Some(value) = DIGITS
            .find(body)
            .and_then(|digits| positive(digits.as_str()))
        {
            return Some(value);
        }
    }
    None
}

fn attribute_value(ticket: &str) -> Option<u32> {
    OPEN_TAG
        .captures_iter(ticket)
        .filter_map(|caps| caps.get(2))
        .flat_map(|attrs| COPY_ATTRIBUTE.captures_iter(attrs.as_str()))
        .find_map(|caps| caps.get(2).and_then(|value| positive(value.as_str())))
}

fn first_capture(pattern: &Regex, ticket: &str) -> Option<u32> {
    pattern
        .captures_iter(ticket)
        .find_map(|caps| caps.get(1).and_then(|value| positive(value.as_str())))
}

fn positive(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|value| *value > 0)
}
