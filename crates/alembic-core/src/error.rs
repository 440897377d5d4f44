//! Resolution-phase errors.
//!
//! Everything here aborts before any execution step runs: the plan is
//! all-or-nothing to compose.

use alembic_schema::ConditionError;
use thiserror::Error;

/// Errors produced while resolving a recipe into a plan.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// More than one variant matched the caller's intent. A well-formed
    /// recipe never triggers this; it is a fatal configuration error, not a
    /// tie to break.
    #[error("variant selection for {intent} is ambiguous: candidates {candidates:?}")]
    AmbiguousVariant {
        /// Rendered caller intent.
        intent: String,
        /// Names of the variants that matched.
        candidates: Vec<String>,
    },

    /// The caller requested an alternate the recipe does not define, or the
    /// recipe designates no default at all.
    #[error("no variant available for request '{requested}'")]
    NoVariantAvailable {
        /// Rendered caller intent.
        requested: String,
    },

    /// A condition could not be decided from the supplied facts. Malformed
    /// facts are fatal, never a silent skip.
    #[error("condition evaluation failed: {0}")]
    Condition(#[from] ConditionError),

    /// A file placement referenced a resource the recipe does not declare.
    #[error("placement references undeclared resource '{name}'")]
    UnknownResource {
        /// The missing resource name.
        name: String,
    },
}
