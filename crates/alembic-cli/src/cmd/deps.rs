//! Deps command

use alembic_core::deps::resolve_dependencies;
use alembic_core::select::{VariantRequest, select_variant};
use alembic_schema::{EnvironmentFacts, Recipe};
use anyhow::Result;

/// Print the dependency set resolved for the target environment.
pub fn deps(recipe: &Recipe, facts: &EnvironmentFacts, request: &VariantRequest) -> Result<()> {
    let variant = select_variant(recipe, request)?;
    let resolved = resolve_dependencies(recipe, variant, facts)?;

    if resolved.is_empty() {
        println!("no dependencies");
        return Ok(());
    }
    for dep in resolved {
        println!("{dep}");
    }
    Ok(())
}
