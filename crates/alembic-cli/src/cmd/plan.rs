//! Plan command

use alembic_core::paths::Layout;
use alembic_core::resolve::resolve;
use alembic_core::select::VariantRequest;
use alembic_schema::{EnvironmentFacts, Recipe, SourceSpec};
use anyhow::Result;

/// Resolve the recipe and print the install plan.
pub fn plan(
    recipe: &Recipe,
    facts: &EnvironmentFacts,
    request: &VariantRequest,
    layout: &Layout,
    json: bool,
) -> Result<()> {
    let resolution = resolve(recipe, facts, request, layout)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    println!("{} {} ({})", recipe.name, recipe.version, resolution.variant);
    match &resolution.source {
        SourceSpec::Archive { url, .. } => println!("source: {url}"),
        SourceSpec::Repository { url, reference } => println!("source: {url} @ {reference}"),
    }
    if !resolution.patches.is_empty() {
        println!("patches:");
        for patch in &resolution.patches {
            println!("  {}", patch.url);
        }
    }
    println!();
    print!("{}", resolution.plan.render());
    Ok(())
}
