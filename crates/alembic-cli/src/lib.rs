//! alembic - recipe-driven source builds
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
//!
//! Resolves a declarative build recipe against the target environment into
//! a deterministic install plan, then optionally fetches, executes, and
//! smoke-tests the result.
//!
//! # Overview
//!
//! Everything branchy lives in the recipe as data: variants, conditional
//! dependencies, version-windowed patches, gated configure flags.
//! Resolution is pure; only `fetch`, `install`, and `test` touch the
//! network, filesystem, or processes.

pub mod cmd;

pub use alembic_core::builtin;
pub use alembic_core::load;
pub use alembic_core::paths::{Layout, try_default_root};
pub use alembic_core::resolve::{Resolution, resolve};
pub use alembic_core::select::VariantRequest;

use std::path::{Path, PathBuf};

use alembic_schema::{BuildMode, EnvironmentFacts, OsFamily, Recipe, Version};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "alembic")]
#[command(author, version, about = "alembic - recipe-driven build and install resolver")]
pub struct Cli {
    /// Recipe TOML file (the built-in tmux recipe when omitted)
    #[arg(long, global = true)]
    pub recipe: Option<PathBuf>,

    /// Installation root (defaults to $ALEMBIC_ROOT or ~/.alembic)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub facts: FactsArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Target-environment overrides shared by every subcommand.
#[derive(Debug, Args)]
pub struct FactsArgs {
    /// Target OS family (defaults to the host OS)
    #[arg(long, global = true)]
    pub os: Option<OsFamily>,

    /// Target OS version, e.g. 10.13 (required by version-gated conditions)
    #[arg(long, global = true)]
    pub os_version: Option<Version>,

    /// Build from the development head instead of the released version
    #[arg(long, global = true)]
    pub head: bool,

    /// Variant to resolve (defaults to the recipe's default variant)
    #[arg(long, global = true)]
    pub variant: Option<String>,
}

impl FactsArgs {
    /// Environment facts for this invocation, host-detected then overridden
    /// by the explicit flags.
    pub fn facts(&self) -> EnvironmentFacts {
        let mut facts = EnvironmentFacts::current();
        if let Some(os) = self.os {
            facts.os = os;
        }
        if let Some(version) = &self.os_version {
            facts.os_version = Some(version.clone());
        }
        if self.head || self.variant.as_deref() == Some("head") {
            facts.build_mode = BuildMode::Head;
        }
        facts
    }

    /// The variant selection this invocation asks for.
    pub fn request(&self) -> VariantRequest {
        match (&self.variant, self.head) {
            (Some(name), _) => VariantRequest::Named(name.clone()),
            (None, true) => VariantRequest::Named("head".into()),
            (None, false) => VariantRequest::Default,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve the recipe and print the install plan
    Plan {
        /// Print the full resolution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the resolved dependency set
    Deps,
    /// Show recipe metadata
    Info,
    /// Download and verify the source, patches, and resources
    Fetch {
        /// Destination directory (defaults to the root's cache directory)
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// Execute the install plan against a prepared source tree
    Install {
        /// Directory containing the unpacked source tree
        #[arg(long)]
        build_dir: PathBuf,
    },
    /// Run the recipe's post-install smoke test
    Test {
        /// Binary to test (defaults to the installed one under the root)
        binary: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Load the recipe named on the command line, or the built-in one.
pub fn load_recipe(path: Option<&Path>) -> Result<Recipe> {
    match path {
        Some(path) => load::from_file(path)
            .with_context(|| format!("failed to load recipe {}", path.display())),
        None => Ok(builtin::tmux()),
    }
}

/// Installation layout for this invocation.
pub fn layout_for(root: Option<PathBuf>, package: &str) -> Result<Layout> {
    let root = root
        .or_else(try_default_root)
        .context("cannot determine installation root; set --root or $ALEMBIC_ROOT")?;
    Ok(Layout::new(root, package))
}

/// Expand layout placeholders in a caveats message.
pub fn render_caveats(caveats: &str, layout: &Layout) -> String {
    caveats
        .replace("{pkgshare}", &layout.pkgshare().display().to_string())
        .replace("{prefix}", &layout.prefix().display().to_string())
        .replace("{etc}", &layout.etc().display().to_string())
}
