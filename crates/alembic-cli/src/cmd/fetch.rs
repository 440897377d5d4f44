//! Fetch command

use std::path::Path;

use alembic_core::fetch::{FetchItem, fetch_all};
use alembic_core::resolve::Resolution;
use alembic_schema::{Recipe, SourceSpec};
use anyhow::Result;

/// Every fetchable item of a resolution: the source archive (when the
/// variant builds from one), its patches, and the auxiliary resources.
pub fn items(recipe: &Recipe, resolution: &Resolution) -> Vec<FetchItem> {
    let mut items = Vec::new();
    if let SourceSpec::Archive { url, sha256 } = &resolution.source {
        items.push(FetchItem {
            url: url.clone(),
            sha256: sha256.clone(),
        });
    }
    for patch in &resolution.patches {
        items.push(FetchItem {
            url: patch.url.clone(),
            sha256: patch.sha256.clone(),
        });
    }
    for resource in &recipe.resources {
        items.push(FetchItem {
            url: resource.url.clone(),
            sha256: resource.sha256.clone(),
        });
    }
    items
}

/// Download and verify everything the resolution needs.
pub async fn fetch(recipe: &Recipe, resolution: &Resolution, dest: &Path) -> Result<()> {
    let items = items(recipe, resolution);
    if items.is_empty() {
        println!("nothing to fetch for variant '{}'", resolution.variant);
        return Ok(());
    }

    let client = reqwest::Client::new();
    let paths = fetch_all(&client, &items, dest).await?;
    for path in paths {
        println!("fetched {}", path.display());
    }
    Ok(())
}
