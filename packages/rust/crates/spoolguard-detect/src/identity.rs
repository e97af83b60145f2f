//! Job identity resolution from vendor composite names.
//!
//! Drivers report a job's name as `"<queue>, <id>"`. The split uses the last
//! comma so queue names that contain commas survive.

use uuid::Uuid;

/// Output of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// Job identifier; never empty.
    pub job_id: String,
    /// Queue identity; empty when the name carried none.
    pub queue_name: String,
    /// The name was a `"<queue>, <digits>"` composite, so its trailing number
    /// is an identifier and not a copy count.
    pub composite: bool,
    /// `job_id` is a generated token rather than a parsed one.
    pub generated: bool,
}

impl ResolvedIdentity {
    fn generated() -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            queue_name: String::new(),
            composite: false,
            generated: true,
        }
    }

    /// Job id as an integer, when it is one.
    #[must_use]
    pub fn numeric_job_id(&self) -> Option<u32> {
        if self.generated {
            return None;
        }
        self.job_id.parse().ok()
    }
}

/// Resolve a raw job name into a job id and queue name.
///
/// Never fails: absent, blank, or unparseable input gets a fresh UUID v4 as
/// its id.
#[must_use]
pub fn resolve(raw_name: Option<&str>) -> ResolvedIdentity {
    let Some(raw) = raw_name.filter(|raw| !raw.trim().is_empty()) else {
        return ResolvedIdentity::generated();
    };

    if let Some(idx) = raw.rfind(',') {
        let (queue, rest) = raw.split_at(idx);
        let id = rest[1..].trim();
        if !rest[1..].is_empty() {
            if id.is_empty() {
                let mut identity = ResolvedIdentity::generated();
                identity.queue_name = queue.trim().to_string();
                return identity;
            }
            return ResolvedIdentity {
                job_id: id.to_string(),
                queue_name: queue.trim().to_string(),
                composite: id.bytes().all(|b| b.is_ascii_digit()),
                generated: false,
            };
        }
    }

    ResolvedIdentity {
        job_id: raw.trim().to_string(),
        queue_name: String::new(),
        composite: false,
        generated: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_comma_keeps_whole_name() {
        let identity = resolve(Some("Office,"));
        assert_eq!(identity.job_id, "Office,");
        assert!(identity.queue_name.is_empty());
        assert!(!identity.generated);
    }

    #[test]
    fn test_whitespace_after_comma_generates_token() {
        let identity = resolve(Some("Office,   "));
        assert!(identity.generated);
        assert_eq!(identity.queue_name, "Office");
        assert_eq!(identity.numeric_job_id(), None);
    }
}
