//! Installation layout conventions.

use std::path::{Path, PathBuf};

/// Returns the primary installation root, or None if the user's home cannot
/// be resolved.
pub fn try_default_root() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("ALEMBIC_ROOT") {
        return Some(PathBuf::from(val));
    }
    dirs::home_dir().map(|h| h.join(".alembic"))
}

/// Fixed installation-root conventions for one package.
///
/// Every path flag and placement destination in a plan derives from here,
/// so two compositions against the same layout agree byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    package: String,
}

impl Layout {
    /// Layout rooted at `root` for the named package.
    pub fn new(root: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            package: package.into(),
        }
    }

    /// Installation root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Package install prefix: `<root>/opt/<package>`.
    pub fn prefix(&self) -> PathBuf {
        self.root.join("opt").join(&self.package)
    }

    /// Executable directory inside the prefix.
    pub fn bin(&self) -> PathBuf {
        self.prefix().join("bin")
    }

    /// System configuration directory: `<root>/etc`.
    pub fn etc(&self) -> PathBuf {
        self.root.join("etc")
    }

    /// Package shared-data directory: `<root>/share/<package>`.
    pub fn pkgshare(&self) -> PathBuf {
        self.root.join("share").join(&self.package)
    }

    /// Bash completion scripts directory: `<root>/etc/bash_completion.d`.
    pub fn bash_completion(&self) -> PathBuf {
        self.root.join("etc").join("bash_completion.d")
    }

    /// Download cache directory: `<root>/cache`.
    pub fn cache(&self) -> PathBuf {
        self.root.join("cache")
    }
}

/// Extract the filename from a URL.
pub fn filename_from_url(url: &str) -> &str {
    url.split('/').next_back().unwrap_or("")
}
