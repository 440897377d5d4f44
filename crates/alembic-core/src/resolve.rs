//! Top-level resolution: recipe + facts + intent -> one deterministic plan.

use alembic_schema::{EnvironmentFacts, Patch, Recipe, SourceSpec};
use serde::Serialize;

use crate::deps::{ResolvedDependency, resolve_dependencies};
use crate::error::ResolveError;
use crate::patch::sequence_patches;
use crate::paths::Layout;
use crate::plan::{InstallPlan, compose_plan};
use crate::select::{VariantRequest, select_variant};

/// Everything a host runtime needs to build and install the package:
/// the chosen source, the ordered dependency set, the patch sequence, and
/// the executable plan.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Name of the selected variant.
    pub variant: String,
    /// Where the source comes from.
    pub source: SourceSpec,
    /// Ordered dependencies, each tagged with its phase.
    pub dependencies: Vec<ResolvedDependency>,
    /// Applicable patches, in application order.
    pub patches: Vec<Patch>,
    /// The composed install plan.
    pub plan: InstallPlan,
}

/// Resolve a recipe into a single deterministic [`Resolution`].
///
/// Pure and synchronous: no filesystem, network, or process side effects
/// happen here. Any error aborts the whole resolution before a plan exists,
/// so execution never starts from a partially composed plan.
///
/// # Errors
///
/// Returns [`ResolveError`] for variant-selection failures, undecidable
/// conditions, and dangling resource references.
pub fn resolve(
    recipe: &Recipe,
    facts: &EnvironmentFacts,
    request: &VariantRequest,
    layout: &Layout,
) -> Result<Resolution, ResolveError> {
    let variant = select_variant(recipe, request)?;
    tracing::debug!(recipe = %recipe.name, variant = %variant.name, "variant selected");

    let dependencies = resolve_dependencies(recipe, variant, facts)?;

    let upstream = match &variant.source {
        SourceSpec::Archive { .. } => Some(&recipe.version),
        SourceSpec::Repository { .. } => None,
    };
    let patches = sequence_patches(variant, upstream);

    let plan = compose_plan(recipe, variant, facts, layout)?;

    Ok(Resolution {
        variant: variant.name.clone(),
        source: variant.source.clone(),
        dependencies,
        patches,
        plan,
    })
}
