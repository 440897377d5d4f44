//! Plan execution through an executor seam.
//!
//! The core never performs process or filesystem operations itself; it
//! walks the plan and hands each step to a [`StepExecutor`]. Execution is
//! strictly sequential: a failing step aborts the remaining plan with the
//! failing step identified, and nothing is retried.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::paths::filename_from_url;
use crate::plan::{InstallPlan, PlanStep, ResolvedSource};

/// Failure of one plan step.
#[derive(Error, Debug)]
pub enum StepError {
    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An external invocation returned nonzero.
    #[error("exited with status {code:?}")]
    Failed {
        /// Exit code, when the process was not killed by a signal.
        code: Option<i32>,
    },

    /// A fetched file no longer matches its declared digest. Fetched
    /// content is never trusted from cache without a re-hash.
    #[error("cached file for {url} failed re-verification")]
    HashMismatch {
        /// URL the stale file was fetched from.
        url: String,
    },
}

/// Execution-phase failure: the failing step, identified, plus its cause.
#[derive(Error, Debug)]
#[error("plan step {index} ({step}) failed: {source}")]
pub struct PlanExecutionError {
    /// Zero-based index of the failing step.
    pub index: usize,
    /// Rendered form of the failing step.
    pub step: String,
    /// Underlying failure.
    #[source]
    pub source: StepError,
}

/// Host-runtime seam that performs the actual side effects of a plan.
pub trait StepExecutor {
    /// Append `append` to the environment variable `var` for subsequent
    /// invocations. Must never overwrite an inherited value.
    fn apply_env(&mut self, var: &str, append: &str) -> Result<(), StepError>;

    /// Run an external tool and wait for it to finish.
    fn run(&mut self, program: &str, args: &[String]) -> Result<(), StepError>;

    /// Place a file into `dest`.
    fn place(&mut self, source: &ResolvedSource, dest: &Path) -> Result<(), StepError>;
}

/// Execute the plan sequentially, aborting on the first failure.
///
/// # Errors
///
/// Returns [`PlanExecutionError`] naming the failing step; later steps do
/// not run.
pub fn execute_plan(
    plan: &InstallPlan,
    executor: &mut impl StepExecutor,
) -> Result<(), PlanExecutionError> {
    for (index, step) in plan.steps.iter().enumerate() {
        tracing::info!(%step, "executing");
        let result = match step {
            PlanStep::Env { var, append } => executor.apply_env(var, append),
            PlanStep::Run { program, args } => executor.run(program, args),
            PlanStep::Place { source, dest } => executor.place(source, dest),
        };
        result.map_err(|source| PlanExecutionError {
            index,
            step: step.to_string(),
            source,
        })?;
    }
    Ok(())
}

/// Executor backed by `std::process` and the local filesystem.
///
/// Commands run inside the prepared build tree; placements of fetched
/// resources read from the fetch cache and re-verify before copying.
#[derive(Debug)]
pub struct ProcessExecutor {
    build_dir: PathBuf,
    cache_dir: PathBuf,
    env: HashMap<String, String>,
}

impl ProcessExecutor {
    /// Executor rooted at the prepared source tree, with fetched files in
    /// `cache_dir`.
    pub fn new(build_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
            cache_dir: cache_dir.into(),
            env: HashMap::new(),
        }
    }
}

impl StepExecutor for ProcessExecutor {
    fn apply_env(&mut self, var: &str, append: &str) -> Result<(), StepError> {
        let merged = match self.env.get(var).cloned().or_else(|| std::env::var(var).ok()) {
            Some(existing) if !existing.is_empty() => format!("{existing} {append}"),
            _ => append.to_string(),
        };
        self.env.insert(var.to_string(), merged);
        Ok(())
    }

    fn run(&mut self, program: &str, args: &[String]) -> Result<(), StepError> {
        let status = Command::new(program)
            .args(args)
            .current_dir(&self.build_dir)
            .envs(&self.env)
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(StepError::Failed {
                code: status.code(),
            })
        }
    }

    fn place(&mut self, source: &ResolvedSource, dest: &Path) -> Result<(), StepError> {
        std::fs::create_dir_all(dest)?;
        match source {
            ResolvedSource::BuildTree(rel) => {
                let from = self.build_dir.join(rel);
                std::fs::copy(&from, dest.join(source.filename()))?;
            }
            ResolvedSource::Fetched(resource) => {
                let from = self.cache_dir.join(filename_from_url(&resource.url));
                let bytes = std::fs::read(&from)?;
                if !resource.sha256.matches(&bytes) {
                    return Err(StepError::HashMismatch {
                        url: resource.url.clone(),
                    });
                }
                std::fs::write(dest.join(source.filename()), bytes)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alembic_schema::{Resource, ResourceKind, Sha256Digest};

    /// Records calls; fails every `run` after `fail_from` runs succeeded.
    #[derive(Default)]
    struct RecordingExecutor {
        calls: Vec<String>,
        fail_from: Option<usize>,
        runs: usize,
    }

    impl StepExecutor for RecordingExecutor {
        fn apply_env(&mut self, var: &str, append: &str) -> Result<(), StepError> {
            self.calls.push(format!("env {var}+={append}"));
            Ok(())
        }

        fn run(&mut self, program: &str, _args: &[String]) -> Result<(), StepError> {
            if self.fail_from.is_some_and(|n| self.runs >= n) {
                return Err(StepError::Failed { code: Some(1) });
            }
            self.runs += 1;
            self.calls.push(format!("run {program}"));
            Ok(())
        }

        fn place(&mut self, source: &ResolvedSource, _dest: &Path) -> Result<(), StepError> {
            self.calls.push(format!("place {}", source.filename()));
            Ok(())
        }
    }

    fn sample_plan() -> InstallPlan {
        InstallPlan {
            steps: vec![
                PlanStep::Env {
                    var: "LDFLAGS".into(),
                    append: "-lresolv".into(),
                },
                PlanStep::Run {
                    program: "./configure".into(),
                    args: vec![],
                },
                PlanStep::Run {
                    program: "make".into(),
                    args: vec!["install".into()],
                },
                PlanStep::Place {
                    source: ResolvedSource::BuildTree("example_tmux.conf".into()),
                    dest: PathBuf::from("/tmp/share"),
                },
            ],
        }
    }

    #[test]
    fn steps_run_in_order() {
        let mut exec = RecordingExecutor::default();
        execute_plan(&sample_plan(), &mut exec).unwrap();
        assert_eq!(
            exec.calls,
            [
                "env LDFLAGS+=-lresolv",
                "run ./configure",
                "run make",
                "place example_tmux.conf"
            ]
        );
    }

    #[test]
    fn failure_aborts_remaining_plan() {
        let mut exec = RecordingExecutor {
            fail_from: Some(1),
            ..Default::default()
        };
        let err = execute_plan(&sample_plan(), &mut exec).unwrap_err();
        assert_eq!(err.index, 2);
        assert!(err.step.contains("make"));
        // The placement after the failing step never ran.
        assert_eq!(exec.calls.len(), 2);
    }

    #[test]
    fn env_appends_never_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut exec = ProcessExecutor::new(dir.path(), dir.path());
        exec.env.insert("LDFLAGS".into(), "-L/inherited".into());
        exec.apply_env("LDFLAGS", "-lresolv").unwrap();
        assert_eq!(exec.env["LDFLAGS"], "-L/inherited -lresolv");
    }

    #[test]
    fn stale_cached_resource_fails_placement() {
        let build = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        std::fs::write(cache.path().join("tmux"), b"tampered").unwrap();

        let resource = Resource {
            name: "completion".into(),
            url: "https://example.com/completions/tmux".into(),
            sha256: Sha256Digest::compute(b"original"),
            kind: ResourceKind::Completion,
        };
        let mut exec = ProcessExecutor::new(build.path(), cache.path());
        let dest = build.path().join("out");
        let err = exec
            .place(&ResolvedSource::Fetched(resource), &dest)
            .unwrap_err();
        assert!(matches!(err, StepError::HashMismatch { .. }));
        assert!(!dest.join("tmux").exists());
    }
}
