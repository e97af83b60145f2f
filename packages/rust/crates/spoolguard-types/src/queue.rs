//! Host queue parsing.

use serde::{Deserialize, Serialize};

/// Parsed host queue: `\\server\printer`, `\\server`, or a bare printer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueLocation {
    /// Print server, present for UNC-style queues.
    pub server: Option<String>,
    /// Printer (queue) name; empty when only a server was given.
    pub printer: String,
}

impl QueueLocation {
    /// Parse a host queue string. Never fails; empty input gives an empty
    /// location.
    #[must_use]
    pub fn parse(host_queue: &str) -> Self {
        let trimmed = host_queue.trim();
        let Some(unc) = trimmed.strip_prefix("\\\\") else {
            return Self {
                server: None,
                printer: trimmed.to_string(),
            };
        };
        let unc = unc.trim_start_matches('\\');
        match unc.split_once('\\') {
            Some((server, printer)) => Self {
                server: non_empty(server),
                printer: printer.trim().to_string(),
            },
            None => Self {
                server: non_empty(unc),
                printer: String::new(),
            },
        }
    }

    /// Whether the queue lives on a remote print server.
    #[must_use]
    pub fn is_network(&self) -> bool {
        self.server.is_some()
    }

    /// Last `\`-separated segment of a queue name (`\\srv\q` → `q`).
    #[must_use]
    pub fn last_segment(queue_name: &str) -> &str {
        match queue_name.rfind('\\') {
            Some(idx) if idx + 1 < queue_name.len() => &queue_name[idx + 1..],
            _ => queue_name,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
