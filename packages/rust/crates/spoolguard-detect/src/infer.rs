//! Copy-count inference.
//!
//! An ordered chain of strategies runs over an [`AttributeSource`]; the first
//! confident signal wins and `1` is the fallback. Strategy errors are logged
//! and treated as silence, but stay observable through
//! [`CopyInference::evaluate`].

use spoolguard_types::{AttributeSource, CopyBasis, fields};

use crate::error::InferError;
use crate::identity::{ResolvedIdentity, resolve};
use crate::name_hint::parse_name_hint;
use crate::ticket::parse_ticket_copies;

/// Cap applied when `TotalPages` alone stands in for the copy count.
pub const MAX_TOTAL_PAGES_AS_COPIES: u32 = 1000;

/// Result of one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// Confident copy count.
    Found(u32),
    /// No usable signal.
    Silent,
    /// The signal was present but broken; treated like `Silent`.
    Failed(InferError),
}

/// Inference strategies, highest confidence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `Copies` field.
    Explicit,
    /// `ceil(TotalPages / per-document pages)`.
    PageRatio,
    /// `TotalPages` alone, capped.
    TotalPages,
    /// Embedded print ticket.
    Ticket,
    /// Multiplicity marker in a descriptive `Name`.
    NameHint,
}

impl Strategy {
    /// Chain order.
    pub const ORDER: [Self; 5] = [
        Self::Explicit,
        Self::PageRatio,
        Self::TotalPages,
        Self::Ticket,
        Self::NameHint,
    ];

    /// Basis recorded when this strategy wins.
    #[must_use]
    pub fn basis(self) -> CopyBasis {
        match self {
            Self::Explicit => CopyBasis::Explicit,
            Self::PageRatio => CopyBasis::PageRatio,
            Self::TotalPages => CopyBasis::TotalPages,
            Self::Ticket => CopyBasis::Ticket,
            Self::NameHint => CopyBasis::NameHint,
        }
    }
}

/// Final inference result; `copies` is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inference {
    /// Resolved copy count.
    pub copies: u32,
    /// Strategy that produced it.
    pub basis: CopyBasis,
}

impl Inference {
    /// The "unknown / normal job" result.
    pub const SINGLE: Self = Self {
        copies: 1,
        basis: CopyBasis::Default,
    };
}

/// Facts about the job that guard individual strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InferenceContext {
    /// Numeric job id; a `Copies` value equal to it is a leaked id.
    pub job_id: Option<u32>,
    /// `Name` is a `"<queue>, <id>"` composite; disables the name heuristic.
    pub name_is_identity: bool,
}

impl InferenceContext {
    /// Context from an already resolved identity.
    #[must_use]
    pub fn from_identity(identity: &ResolvedIdentity) -> Self {
        Self {
            job_id: identity.numeric_job_id(),
            name_is_identity: identity.composite,
        }
    }

    /// Context derived from the bag itself (`Name`, then `JobId`).
    #[must_use]
    pub fn from_attributes(attrs: &impl AttributeSource) -> Self {
        let identity = resolve(attrs.text(fields::NAME).as_deref());
        let mut context = Self::from_identity(&identity);
        if context.job_id.is_none() {
            context.job_id = attrs
                .integer(fields::JOB_ID)
                .ok()
                .flatten()
                .and_then(|id| u32::try_from(id).ok());
        }
        context
    }
}

/// The strategy chain.
pub struct CopyInference;

impl CopyInference {
    /// Run the whole chain.
    pub fn infer(attrs: &impl AttributeSource, context: &InferenceContext) -> Inference {
        for strategy in Strategy::ORDER {
            match Self::evaluate(strategy, attrs, context) {
                StrategyOutcome::Found(copies) => {
                    return Inference {
                        copies: copies.max(1),
                        basis: strategy.basis(),
                    };
                }
                StrategyOutcome::Silent => {}
                StrategyOutcome::Failed(error) => {
                    tracing::debug!(
                        strategy = ?strategy,
                        error = %error,
                        "copy inference strategy failed"
                    );
                }
            }
        }
        Inference::SINGLE
    }

    /// Run a single strategy.
    pub fn evaluate(
        strategy: Strategy,
        attrs: &impl AttributeSource,
        context: &InferenceContext,
    ) -> StrategyOutcome {
        match strategy {
            Strategy::Explicit => explicit(attrs, context),
            Strategy::PageRatio => page_ratio(attrs),
            Strategy::TotalPages => total_pages(attrs),
            Strategy::Ticket => ticket(attrs),
            Strategy::NameHint => name_hint(attrs, context),
        }
    }
}

/// Best-effort copy count for an attribute bag; never below 1.
pub fn infer_copies(attrs: &impl AttributeSource) -> u32 {
    CopyInference::infer(attrs, &InferenceContext::from_attributes(attrs)).copies
}

fn explicit(attrs: &impl AttributeSource, context: &InferenceContext) -> StrategyOutcome {
    match attrs.integer(fields::COPIES) {
        Err(error) => StrategyOutcome::Failed(error.into()),
        Ok(None) => StrategyOutcome::Silent,
        Ok(Some(value)) if context.job_id.is_some_and(|id| i64::from(id) == value) => {
            tracing::debug!(copies = value, "copies field equals job id, ignoring");
            StrategyOutcome::Silent
        }
        Ok(Some(value)) => count(fields::COPIES, value),
    }
}

fn page_ratio(attrs: &impl AttributeSource) -> StrategyOutcome {
    let total = match attrs.integer(fields::TOTAL_PAGES) {
        Err(error) => return StrategyOutcome::Failed(error.into()),
        Ok(Some(total)) if total > 0 => total,
        Ok(_) => return StrategyOutcome::Silent,
    };
    let per_document = fields::PAGE_COUNT_CANDIDATES.iter().find_map(|field| {
        attrs
            .integer(field)
            .ok()
            .flatten()
            .filter(|pages| *pages > 0)
    });
    let Some(per_document) = per_document else {
        return StrategyOutcome::Silent;
    };
    let (Ok(total), Ok(per_document)) = (u64::try_from(total), u64::try_from(per_document)) else {
        return StrategyOutcome::Silent;
    };
    let copies = total.div_ceil(per_document).max(1);
    u32::try_from(copies).map_or(
        StrategyOutcome::Failed(InferError::OutOfRange {
            field: fields::TOTAL_PAGES,
            value: i64::try_from(copies).unwrap_or(i64::MAX),
        }),
        StrategyOutcome::Found,
    )
}

fn total_pages(attrs: &impl AttributeSource) -> StrategyOutcome {
    match attrs.integer(fields::TOTAL_PAGES) {
        Err(error) => StrategyOutcome::Failed(error.into()),
        Ok(Some(total)) if total > 1 => {
            let capped = total.min(i64::from(MAX_TOTAL_PAGES_AS_COPIES));
            count(fields::TOTAL_PAGES, capped)
        }
        Ok(_) => StrategyOutcome::Silent,
    }
}

fn ticket(attrs: &impl AttributeSource) -> StrategyOutcome {
    fields::TICKET_CANDIDATES
        .iter()
        .find_map(|field| attrs.text(field))
        .and_then(|ticket| parse_ticket_copies(&ticket))
        .map_or(StrategyOutcome::Silent, StrategyOutcome::Found)
}

fn name_hint(attrs: &impl AttributeSource, context: &InferenceContext) -> StrategyOutcome {
    if context.name_is_identity {
        return StrategyOutcome::Silent;
    }
    attrs
        .text(fields::NAME)
        .and_then(|name| parse_name_hint(&name))
        .map_or(StrategyOutcome::Silent, StrategyOutcome::Found)
}

fn count(field: &'static str, value: i64) -> StrategyOutcome {
    if value <= 0 {
        return StrategyOutcome::Silent;
    }
    u32::try_from(value).map_or(
        StrategyOutcome::Failed(InferError::OutOfRange { field, value }),
        StrategyOutcome::Found,
    )
}
