//! User-facing notifications.
//!
//! The desktop toast of a native deployment is out of reach here; the default
//! notifier writes a localized `warn` record that log shipping surfaces to
//! administrators.

use spoolguard_types::JobObservation;

use crate::config::Language;

/// Delivers the "multiple copies detected" notice.
pub trait Notifier: Send + Sync {
    /// Notify about a detected multi-copy job.
    ///
    /// # Errors
    ///
    /// Delivery failed; the caller logs and carries on.
    fn notify(&self, observation: &JobObservation) -> anyhow::Result<()>;
}

/// Render the notice in `language`.
#[must_use]
pub fn render_notice(language: Language, observation: &JobObservation) -> String {
    let document = display_or(&observation.document, language, "document");
    let owner = display_or(&observation.owner, language, "owner");
    match language {
        Language::Italian => format!(
            "COPIE MULTIPLE RILEVATE - Lavoro {}: \"{}\" ({} copie) di {}. \
             Il lavoro viene annullato automaticamente: stampare una copia alla volta.",
            observation.job_id, document, observation.copies, owner
        ),
        Language::English => format!(
            "MULTIPLE COPIES DETECTED - Job {}: \"{}\" ({} copies) by {}. \
             The job is being cancelled automatically: print one copy at a time.",
            observation.job_id, document, observation.copies, owner
        ),
    }
}

fn display_or<'a>(value: &'a str, language: Language, field: &str) -> &'a str {
    if !value.is_empty() {
        return value;
    }
    match (language, field) {
        (Language::Italian, "owner") => "utente sconosciuto",
        (Language::Italian, _) => "documento senza nome",
        (Language::English, "owner") => "unknown user",
        (Language::English, _) => "untitled document",
    }
}

/// Notifier that logs the localized notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier {
    language: Language,
}

impl LogNotifier {
    #[must_use]
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, observation: &JobObservation) -> anyhow::Result<()> {
        let message = render_notice(self.language, observation);
        tracing::warn!(
            job_id = %observation.job_id,
            document = %observation.document,
            owner = %observation.owner,
            copies = observation.copies,
            language = self.language.as_str(),
            "{message}"
        );
        Ok(())
    }
}
