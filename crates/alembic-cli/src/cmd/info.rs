//! Info command

use alembic_core::paths::Layout;
use alembic_schema::{Recipe, SourceSpec};
use anyhow::Result;

use crate::render_caveats;

/// Show recipe metadata.
pub fn info(recipe: &Recipe, layout: &Layout) -> Result<()> {
    let lw = 12;

    println!();
    println!("  {} {}", recipe.name, recipe.version);
    if !recipe.description.is_empty() {
        println!("  {}", recipe.description);
    }
    println!();
    if !recipe.homepage.is_empty() {
        println!("  {:<lw$}{}", "homepage", recipe.homepage);
    }
    if !recipe.license.is_empty() {
        println!("  {:<lw$}{}", "license", recipe.license);
    }
    if recipe.revision > 0 {
        println!("  {:<lw$}{}", "revision", recipe.revision);
    }

    let variants: Vec<String> = recipe
        .variants
        .iter()
        .map(|v| {
            if v.default {
                format!("{} (default)", v.name)
            } else {
                v.name.clone()
            }
        })
        .collect();
    println!("  {:<lw$}{}", "variants", variants.join(", "));

    for variant in &recipe.variants {
        if let SourceSpec::Archive { url, .. } = &variant.source {
            println!("  {:<lw$}{}", "archive", url);
        }
        if !variant.patches.is_empty() {
            println!("  {:<lw$}{} ({})", "patches", variant.patches.len(), variant.name);
        }
    }

    if let Some(caveats) = &recipe.caveats {
        println!();
        for line in render_caveats(caveats, layout).lines() {
            println!("  {line}");
        }
    }
    println!();
    Ok(())
}
