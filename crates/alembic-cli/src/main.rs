//! alembic CLI entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use alembic_cli::cmd;
use alembic_cli::{Cli, Commands, layout_for, load_recipe, resolve};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Completions need no recipe or layout.
    if let Commands::Completions { shell } = cli.command {
        cmd::completions::completions(shell);
        return Ok(());
    }

    let recipe = load_recipe(cli.recipe.as_deref())?;
    let layout = layout_for(cli.root.clone(), &recipe.name)?;
    let facts = cli.facts.facts();
    let request = cli.facts.request();

    match cli.command {
        Commands::Plan { json } => cmd::plan::plan(&recipe, &facts, &request, &layout, json),
        Commands::Deps => cmd::deps::deps(&recipe, &facts, &request),
        Commands::Info => cmd::info::info(&recipe, &layout),
        Commands::Fetch { dest } => {
            let resolution = resolve(&recipe, &facts, &request, &layout)?;
            let dest = dest.unwrap_or_else(|| layout.cache());
            cmd::fetch::fetch(&recipe, &resolution, &dest).await
        }
        Commands::Install { build_dir } => {
            let resolution = resolve(&recipe, &facts, &request, &layout)?;
            cmd::install::install(&recipe, &resolution, &layout, &build_dir).await
        }
        Commands::Test { binary } => cmd::test::test(&recipe, &layout, binary),
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}
