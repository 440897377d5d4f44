//! Test command

use std::path::PathBuf;

use alembic_core::paths::Layout;
use alembic_core::verify::{SystemHost, run_smoke_test};
use alembic_schema::Recipe;
use anyhow::{Context, Result, bail};

/// Run the recipe's post-install smoke test.
pub fn test(recipe: &Recipe, layout: &Layout, binary: Option<PathBuf>) -> Result<()> {
    let binary = binary.unwrap_or_else(|| layout.bin().join(&recipe.name));

    // A fresh directory guarantees the control socket cannot collide with a
    // live server.
    let socket_dir = tempfile::tempdir().context("failed to create socket directory")?;
    let socket = socket_dir.path().join("default");

    let mut host = SystemHost::default();
    let report = run_smoke_test(&mut host, &binary, &recipe.test, &socket);

    if report.passed() {
        println!("ok: {} passed its smoke test", binary.display());
        return Ok(());
    }
    for failure in &report.failures {
        eprintln!("failed ({:?}): {}", failure.kind, failure.message);
    }
    bail!("{} smoke-test failure(s)", report.failures.len());
}
