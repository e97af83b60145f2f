//! Attribute bag capability.
//!
//! Spoolers expose job metadata under driver-specific field names with no
//! fixed schema. Consumers query fields by name through [`AttributeSource`]
//! and get a defined "absent" result instead of probing types at runtime.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Well-known field names reported by spoolers.
pub mod fields {
    /// Composite job name, usually `"<queue>, <id>"`.
    pub const NAME: &str = "Name";
    /// Requested copies.
    pub const COPIES: &str = "Copies";
    /// Total pages spooled for the whole job.
    pub const TOTAL_PAGES: &str = "TotalPages";
    /// Per-document page count candidates, probed in order.
    pub const PAGE_COUNT_CANDIDATES: &[&str] = &["Pages", "NumberOfPages", "PageCount"];
    /// Embedded print ticket candidates, probed in order.
    pub const TICKET_CANDIDATES: &[&str] = &["PrintTicket", "PrintTicketXML", "PrintTicketData"];
    /// Document title.
    pub const DOCUMENT: &str = "Document";
    /// Submitting user.
    pub const OWNER: &str = "Owner";
    /// User to notify (often equal to the owner).
    pub const NOTIFY: &str = "Notify";
    /// Opaque native locator of the job object.
    pub const NATIVE_PATH: &str = "__PATH";
    /// Host queue, either `\\server\printer` or a bare printer name.
    pub const HOST_PRINT_QUEUE: &str = "HostPrintQueue";
    /// Numeric job identifier when reported separately from the name.
    pub const JOB_ID: &str = "JobId";
    /// Submission timestamp (RFC 3339).
    pub const TIME_SUBMITTED: &str = "TimeSubmitted";
}

/// A scalar attribute value as reported by a spooler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Integral number.
    Integer(i64),
    /// Free text (already trimmed).
    Text(String),
    /// Boolean flag.
    Bool(bool),
}

/// Errors produced when a present attribute cannot be read as requested.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttributeError {
    /// The field exists but does not hold an integer.
    #[error("field {field} is not an integer: {value}")]
    NotAnInteger {
        /// Field name as requested.
        field: String,
        /// Raw value rendered as text.
        value: String,
    },
}

/// Named lookups over a job's attribute bag.
///
/// Implementors only provide [`AttributeSource::get`]; typed accessors are
/// derived from it.
pub trait AttributeSource {
    /// Look up a field; `None` means the field is absent.
    fn get(&self, field: &str) -> Option<AttributeValue>;

    /// Field rendered as text, `None` when absent or empty.
    fn text(&self, field: &str) -> Option<String> {
        let rendered = match self.get(field)? {
            AttributeValue::Integer(value) => value.to_string(),
            AttributeValue::Text(value) => value,
            AttributeValue::Bool(value) => value.to_string(),
        };
        if rendered.is_empty() {
            None
        } else {
            Some(rendered)
        }
    }

    /// Field parsed as an integer.
    ///
    /// `Ok(None)` when absent, `Err` when present but not integral.
    fn integer(&self, field: &str) -> Result<Option<i64>, AttributeError> {
        match self.get(field) {
            None => Ok(None),
            Some(AttributeValue::Integer(value)) => Ok(Some(value)),
            Some(AttributeValue::Text(value)) => {
                value
                    .trim()
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| AttributeError::NotAnInteger {
                        field: field.to_string(),
                        value,
                    })
            }
            Some(AttributeValue::Bool(value)) => Err(AttributeError::NotAnInteger {
                field: field.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

impl<T: AttributeSource + ?Sized> AttributeSource for &T {
    fn get(&self, field: &str) -> Option<AttributeValue> {
        (**self).get(field)
    }
}

/// Attribute bag backed by a JSON object.
///
/// Used for event payloads, polled records and test fixtures alike. Field
/// lookups try an exact match first, then fall back to ASCII
/// case-insensitive matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap {
    inner: Map<String, Value>,
}

impl AttributeMap {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value; non-object values yield an empty bag.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(inner) => Self { inner },
            _ => Self::default(),
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, field: &str, value: impl Into<Value>) {
        self.inner.insert(field.to_string(), value.into());
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the bag has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Borrow the raw JSON object.
    #[must_use]
    pub fn as_json(&self) -> &Map<String, Value> {
        &self.inner
    }

    /// Consume into a JSON value.
    #[must_use]
    pub fn into_json(self) -> Value {
        Value::Object(self.inner)
    }

    fn raw(&self, field: &str) -> Option<&Value> {
        self.inner.get(field).or_else(|| {
            self.inner
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(field))
                .map(|(_, value)| value)
        })
    }
}

impl From<Map<String, Value>> for AttributeMap {
    fn from(inner: Map<String, Value>) -> Self {
        Self { inner }
    }
}

impl AttributeSource for AttributeMap {
    fn get(&self, field: &str) -> Option<AttributeValue> {
        match self.raw(field)? {
            Value::Null => None,
            Value::Bool(flag) => Some(AttributeValue::Bool(*flag)),
            Value::Number(number) => {
                if let Some(value) = number.as_i64() {
                    return Some(AttributeValue::Integer(value));
                }
                match number.as_f64() {
                    #[allow(clippy::cast_possible_truncation)]
                    Some(value) if value.fract() == 0.0 && value.abs() < 9.0e15 => {
                        Some(AttributeValue::Integer(value as i64))
                    }
                    _ => Some(AttributeValue::Text(number.to_string())),
                }
            }
            Value::String(text) => Some(AttributeValue::Text(text.trim().to_string())),
            other => Some(AttributeValue::Text(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let attrs = AttributeMap::from_json(json!({ "copies": 3 }));
        assert_eq!(attrs.integer("Copies"), Ok(Some(3)));
    }

    #[test]
    fn test_numeric_strings_parse() {
        let attrs = AttributeMap::new().with("TotalPages", " 12 ");
        assert_eq!(attrs.integer(fields::TOTAL_PAGES), Ok(Some(12)));
    }

    #[test]
    fn test_absent_and_errored_are_distinct() {
        let attrs = AttributeMap::new().with("Copies", "many");
        assert_eq!(attrs.integer("TotalPages"), Ok(None));
        assert!(attrs.integer("Copies").is_err());
    }

    #[test]
    fn test_null_is_absent() {
        let attrs = AttributeMap::from_json(json!({ "Document": null, "Owner": "" }));
        assert_eq!(attrs.get("Document"), None);
        assert_eq!(attrs.text("Owner"), None);
    }
}
