//! Install plan composition.
//!
//! The composer merges environment deltas, the configure invocation, the
//! build commands, and auxiliary placements into one ordered, fully
//! resolved plan. Composition is pure: the same (variant, facts, layout)
//! always yields a byte-identical plan, which is what makes the plan
//! inspectable and testable before anything external runs.

use std::path::PathBuf;

use alembic_schema::{
    EnvironmentFacts, InstallDir, PlacementSource, Recipe, Resource, Variant,
};
use serde::Serialize;

use crate::error::ResolveError;
use crate::paths::Layout;

/// A placement whose resource reference has been resolved against the
/// recipe, so the executor needs no recipe access.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedSource {
    /// A file produced in the build tree, by relative path.
    BuildTree(String),
    /// A fetched resource, carried with its URL and digest so the executor
    /// can locate and re-verify it.
    Fetched(Resource),
}

impl ResolvedSource {
    /// Filename of the placed file.
    pub fn filename(&self) -> &str {
        match self {
            Self::BuildTree(rel) => crate::paths::filename_from_url(rel),
            Self::Fetched(resource) => crate::paths::filename_from_url(&resource.url),
        }
    }
}

/// One step of an install plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStep {
    /// Append `append` to environment variable `var` for subsequent steps.
    /// Never overwrites a caller-inherited value.
    Env {
        /// Variable name.
        var: String,
        /// Appended value.
        append: String,
    },
    /// Run an external tool with composed arguments.
    Run {
        /// Program to run.
        program: String,
        /// Arguments, fully substituted.
        args: Vec<String>,
    },
    /// Place a file into an installation directory.
    Place {
        /// Where the file comes from.
        source: ResolvedSource,
        /// Destination directory.
        dest: PathBuf,
    },
}

impl std::fmt::Display for PlanStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env { var, append } => write!(f, "env {var} += {append}"),
            Self::Run { program, args } => {
                write!(f, "run {program}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
            Self::Place { source, dest } => match source {
                ResolvedSource::BuildTree(rel) => {
                    write!(f, "place build-tree:{rel} -> {}", dest.display())
                }
                ResolvedSource::Fetched(resource) => write!(
                    f,
                    "place resource:{} ({}) -> {}",
                    resource.name,
                    resource.sha256,
                    dest.display()
                ),
            },
        }
    }
}

/// The fully resolved, ordered, executable sequence produced by the
/// composer. Freshly constructed per resolution and discarded after
/// execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallPlan {
    /// Ordered steps.
    pub steps: Vec<PlanStep>,
}

impl InstallPlan {
    /// Deterministic text rendering, one line per step.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            out.push_str(&step.to_string());
            out.push('\n');
        }
        out
    }
}

/// Compose the install plan for the selected variant.
///
/// Step order is fixed: environment deltas, preparation commands whose
/// condition holds, the configure invocation (fixed args with `{prefix}` /
/// `{etc}` substituted, then condition-gated args in declaration order),
/// build commands, then auxiliary placements.
///
/// # Errors
///
/// Propagates condition-evaluation failures and rejects placements that
/// reference a resource the recipe does not declare.
pub fn compose_plan(
    recipe: &Recipe,
    variant: &Variant,
    facts: &EnvironmentFacts,
    layout: &Layout,
) -> Result<InstallPlan, ResolveError> {
    let install = &recipe.install;
    let prefix = layout.prefix().display().to_string();
    let etc = layout.etc().display().to_string();
    let substitute =
        |arg: &str| -> String { arg.replace("{prefix}", &prefix).replace("{etc}", &etc) };

    let mut steps = Vec::new();

    for delta in &install.env {
        steps.push(PlanStep::Env {
            var: delta.var.clone(),
            append: delta.append.clone(),
        });
    }

    for prep in &install.prepare {
        if prep.when.eval(facts)? {
            steps.push(PlanStep::Run {
                program: prep.value.program.clone(),
                args: prep.value.args.iter().map(|a| substitute(a)).collect(),
            });
        }
    }

    let mut configure_args: Vec<String> =
        install.configure.args.iter().map(|a| substitute(a)).collect();
    for gated in &install.configure.conditional_args {
        if gated.when.eval(facts)? {
            configure_args.push(substitute(&gated.value));
        }
    }
    steps.push(PlanStep::Run {
        program: install.configure.program.clone(),
        args: configure_args,
    });

    for command in &install.build {
        steps.push(PlanStep::Run {
            program: command.program.clone(),
            args: command.args.iter().map(|a| substitute(a)).collect(),
        });
    }

    for placement in &install.artifacts {
        let source = match &placement.source {
            PlacementSource::BuildTree(rel) => ResolvedSource::BuildTree(rel.clone()),
            PlacementSource::Resource(name) => {
                let resource =
                    recipe
                        .resource(name)
                        .ok_or_else(|| ResolveError::UnknownResource {
                            name: name.clone(),
                        })?;
                ResolvedSource::Fetched(resource.clone())
            }
        };
        steps.push(PlanStep::Place {
            source,
            dest: install_dir(placement.dest, layout),
        });
    }

    tracing::debug!(variant = %variant.name, steps = steps.len(), "plan composed");
    Ok(InstallPlan { steps })
}

fn install_dir(dir: InstallDir, layout: &Layout) -> PathBuf {
    match dir {
        InstallDir::PkgShare => layout.pkgshare(),
        InstallDir::BashCompletion => layout.bash_completion(),
        InstallDir::Etc => layout.etc(),
        InstallDir::Bin => layout.bin(),
    }
}
