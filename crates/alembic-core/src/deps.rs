//! Dependency graph building.
//!
//! This recipe class declares an external dependency *set*, not a graph
//! among them, so ordering is declaration order rather than a topological
//! sort. The order is still part of the reproducible plan.

use alembic_schema::{Dependency, EnvironmentFacts, Phase, Recipe, Variant};
use serde::Serialize;

use crate::error::ResolveError;

/// A dependency that survived condition filtering, tagged with its phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
    /// Package name.
    pub name: String,
    /// Phase in which it is required.
    pub phase: Phase,
}

impl std::fmt::Display for ResolvedDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.phase)
    }
}

/// Assemble the ordered dependency sequence for the selected variant.
///
/// Order is fixed: recipe-global build-time dependencies, then the
/// variant's own dependencies, then recipe-global run-time dependencies,
/// preserving declaration order within each group. Build-time-only
/// dependencies therefore never leak into the run-time tail.
///
/// # Errors
///
/// A dependency whose condition cannot be evaluated against the facts is a
/// fatal configuration error, never a silent skip.
pub fn resolve_dependencies(
    recipe: &Recipe,
    variant: &Variant,
    facts: &EnvironmentFacts,
) -> Result<Vec<ResolvedDependency>, ResolveError> {
    let mut out = Vec::new();

    let global_build = recipe
        .dependencies
        .iter()
        .filter(|d| d.phase == Phase::Build);
    collect(global_build, facts, &mut out)?;

    collect(variant.dependencies.iter(), facts, &mut out)?;

    let global_runtime = recipe
        .dependencies
        .iter()
        .filter(|d| d.phase == Phase::Runtime);
    collect(global_runtime, facts, &mut out)?;

    Ok(out)
}

fn collect<'a>(
    deps: impl Iterator<Item = &'a Dependency>,
    facts: &EnvironmentFacts,
    out: &mut Vec<ResolvedDependency>,
) -> Result<(), ResolveError> {
    for dep in deps {
        let included = match &dep.condition {
            Some(cond) => cond.eval(facts)?,
            None => true,
        };
        if included {
            out.push(ResolvedDependency {
                name: dep.name.clone(),
                phase: dep.phase,
            });
        } else {
            tracing::debug!(name = %dep.name, "dependency excluded by condition");
        }
    }
    Ok(())
}
