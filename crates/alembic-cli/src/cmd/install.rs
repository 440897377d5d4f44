//! Install command

use std::path::Path;

use alembic_core::execute::{ProcessExecutor, StepExecutor, execute_plan};
use alembic_core::fetch::{FetchItem, fetch_all};
use alembic_core::paths::{Layout, filename_from_url};
use alembic_core::resolve::Resolution;
use alembic_schema::Recipe;
use anyhow::{Context, Result};

use crate::render_caveats;

/// Execute the resolved plan against a prepared source tree in `build_dir`.
///
/// Patches and placed resources are fetched into the layout's cache first,
/// then patches are applied in sequence before the plan runs.
pub async fn install(
    recipe: &Recipe,
    resolution: &Resolution,
    layout: &Layout,
    build_dir: &Path,
) -> Result<()> {
    let cache = layout.cache();

    let mut items: Vec<FetchItem> = resolution
        .patches
        .iter()
        .map(|p| FetchItem {
            url: p.url.clone(),
            sha256: p.sha256.clone(),
        })
        .collect();
    for resource in &recipe.resources {
        items.push(FetchItem {
            url: resource.url.clone(),
            sha256: resource.sha256.clone(),
        });
    }
    if !items.is_empty() {
        let client = reqwest::Client::new();
        fetch_all(&client, &items, &cache)
            .await
            .context("failed to fetch build inputs")?;
    }

    let mut executor = ProcessExecutor::new(build_dir, &cache);

    // Patches apply in declaration order before anything else runs.
    for patch in &resolution.patches {
        let file = cache.join(filename_from_url(&patch.url));
        tracing::info!(patch = %patch.url, "applying");
        executor
            .run(
                "patch",
                &[
                    "-p1".to_string(),
                    "-i".to_string(),
                    file.display().to_string(),
                ],
            )
            .with_context(|| format!("failed to apply patch {}", patch.url))?;
    }

    execute_plan(&resolution.plan, &mut executor)?;

    println!("installed {} to {}", recipe.name, layout.prefix().display());
    if let Some(caveats) = &recipe.caveats {
        println!();
        println!("{}", render_caveats(caveats, layout));
    }
    Ok(())
}
