//! Variant selection.
//!
//! Selection is total over well-formed recipes: exactly one variant per
//! (recipe, intent) pair, with no implicit fallback between variants.

use alembic_schema::{Recipe, Variant};

use crate::error::ResolveError;

/// Caller intent: take the recipe's designated default, or a named
/// alternate (for example `head`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantRequest {
    /// Use the variant flagged as default.
    Default,
    /// Use the named variant, failing if it is not declared.
    Named(String),
}

impl std::fmt::Display for VariantRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Named(name) => write!(f, "'{name}'"),
        }
    }
}

/// Select exactly one variant for the caller's intent.
///
/// # Errors
///
/// Returns [`ResolveError::NoVariantAvailable`] when nothing matches and
/// [`ResolveError::AmbiguousVariant`] when more than one variant matches:
/// two variants with the same name, or two flagged default.
pub fn select_variant<'a>(
    recipe: &'a Recipe,
    request: &VariantRequest,
) -> Result<&'a Variant, ResolveError> {
    let matches: Vec<&Variant> = match request {
        VariantRequest::Default => recipe.variants.iter().filter(|v| v.default).collect(),
        VariantRequest::Named(name) => {
            recipe.variants.iter().filter(|v| v.name == *name).collect()
        }
    };

    match matches.as_slice() {
        [variant] => Ok(variant),
        [] => Err(ResolveError::NoVariantAvailable {
            requested: request.to_string(),
        }),
        many => Err(ResolveError::AmbiguousVariant {
            intent: request.to_string(),
            candidates: many.iter().map(|v| v.name.clone()).collect(),
        }),
    }
}
