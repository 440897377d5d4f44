//! Declarative recipe definitions.
//!
//! A recipe describes how to build and install one package across its
//! selectable variants. Everything a resolution can branch on is data here:
//! conditional dependencies, version-windowed patches, condition-gated
//! configure flags. The stable/head duality of the original formula is the
//! [`Variant`] list plus the [`SourceSpec`] sum type, not duplicated blocks.

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::hash::Sha256Digest;
use crate::version::Version;

/// When a dependency is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Required only while building; never part of the installed artifact's
    /// run-time closure.
    Build,
    /// Required by the installed artifact at run time.
    #[default]
    Runtime,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Build => write!(f, "build"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

/// A package this recipe depends on, optionally gated by a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    /// Name of the depended-on package.
    pub name: String,
    /// Phase in which the dependency is required.
    #[serde(default)]
    pub phase: Phase,
    /// Inclusion gate; an absent condition always includes the dependency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Dependency {
    /// Unconditional dependency.
    pub fn new(name: impl Into<String>, phase: Phase) -> Self {
        Self {
            name: name.into(),
            phase,
            condition: None,
        }
    }

    /// Dependency included only where `condition` holds.
    pub fn gated(name: impl Into<String>, phase: Phase, condition: Condition) -> Self {
        Self {
            name: name.into(),
            phase,
            condition: Some(condition),
        }
    }
}

/// What role a fetched artifact plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// The package source archive.
    #[default]
    Source,
    /// A patch applied to the source tree.
    Patch,
    /// A shell-completion script.
    Completion,
    /// An example or default configuration file.
    Config,
}

/// An immutable descriptor of a fetchable, content-addressed artifact.
///
/// The hash is mandatory: resources arrive over non-authenticated channels
/// and must be re-verified on every fetch, never trusted from a cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Name other recipe parts use to reference this resource.
    pub name: String,
    /// Download URL.
    pub url: String,
    /// Expected SHA-256 digest of the fetched bytes.
    pub sha256: Sha256Digest,
    /// Role of the artifact.
    #[serde(default)]
    pub kind: ResourceKind,
}

/// Where a variant's source comes from.
///
/// The two cases are mutually exclusive by construction: an archive always
/// carries a content hash, a version-control checkout never does (hash
/// verification is inapplicable to a moving reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceSpec {
    /// A hashed source archive.
    Archive {
        /// Download URL of the archive.
        url: String,
        /// Expected SHA-256 digest of the archive bytes.
        sha256: Sha256Digest,
    },
    /// A version-control checkout.
    Repository {
        /// Clone URL.
        url: String,
        /// Branch, tag, or revision to check out.
        reference: String,
    },
}

/// Inclusive version range bounding a patch's applicability.
///
/// "Remove in next release" markers become an upper bound: once the
/// recipe's upstream version advances past `max`, the patch silently drops
/// out of the sequence with no code change.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VersionWindow {
    /// Lowest upstream version (inclusive) the patch applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Version>,
    /// Highest upstream version (inclusive) the patch applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Version>,
}

impl VersionWindow {
    /// Window covering exactly one upstream version.
    pub fn only(version: Version) -> Self {
        Self {
            min: Some(version.clone()),
            max: Some(version),
        }
    }

    /// Whether any bound is declared.
    pub fn is_bounded(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Whether `version` falls inside the window.
    pub fn contains(&self, version: &Version) -> bool {
        if let Some(min) = &self.min {
            if version < min {
                return false;
            }
        }
        if let Some(max) = &self.max {
            if version > max {
                return false;
            }
        }
        true
    }
}

/// A source patch scoped to its declaring variant and a version window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Download URL of the patch file.
    pub url: String,
    /// Expected SHA-256 digest of the patch bytes.
    pub sha256: Sha256Digest,
    /// Applicability window over the recipe's upstream version. Unbounded
    /// by default.
    #[serde(default)]
    pub window: VersionWindow,
}

/// One selectable build configuration within a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant name (for example `stable` or `head`).
    pub name: String,
    /// Whether this variant is selected when the caller states no explicit
    /// preference. At most one variant per recipe may set this.
    #[serde(default)]
    pub default: bool,
    /// Where this variant's source comes from.
    pub source: SourceSpec,
    /// Patches applied to this variant's source tree, in application order.
    /// Order is significant: later patches may depend textually on earlier
    /// ones.
    #[serde(default)]
    pub patches: Vec<Patch>,
    /// Dependencies scoped to this variant, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// An append-only environment mutation required for the build.
///
/// Appends never overwrite caller-inherited values; the executor applies
/// them as an explicit delta, keeping plan composition pure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvMutation {
    /// Variable name (for example `LDFLAGS`).
    pub var: String,
    /// Value appended to the variable.
    pub append: String,
}

/// An external tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Program to run.
    pub program: String,
    /// Arguments, in order.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Command {
    /// Convenience constructor from string slices.
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
        }
    }
}

/// A value included in the plan only where its condition holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional<T> {
    /// The gated value.
    pub value: T,
    /// Gate evaluated against the environment facts.
    pub when: Condition,
}

/// The configure-style invocation of the install procedure.
///
/// `args` may contain `{prefix}` and `{etc}` placeholders, substituted from
/// the install layout at composition time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configure {
    /// Program to run (for example `./configure`).
    pub program: String,
    /// Flags always passed, in order.
    #[serde(default)]
    pub args: Vec<String>,
    /// Flags passed only where their condition holds, in declaration order.
    #[serde(default)]
    pub conditional_args: Vec<Conditional<String>>,
}

/// A named installation location, resolved against the install layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallDir {
    /// Package's shared-data directory (`share/<name>`).
    PkgShare,
    /// Bash completion scripts directory.
    BashCompletion,
    /// System configuration directory.
    Etc,
    /// Executable directory.
    Bin,
}

/// Where a placed file comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementSource {
    /// A file produced in the build tree, by relative path.
    BuildTree(String),
    /// A fetched [`Resource`], referenced by name.
    Resource(String),
}

/// An auxiliary file placement into a named installation location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// File to place.
    pub source: PlacementSource,
    /// Target location.
    pub dest: InstallDir,
}

/// Ordered description of how the package is configured, built, installed,
/// and decorated with auxiliary files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallProcedure {
    /// Environment deltas applied before any invocation.
    #[serde(default)]
    pub env: Vec<EnvMutation>,
    /// Condition-gated preparation commands run before configure (for
    /// example bootstrapping autotools on a head checkout).
    #[serde(default)]
    pub prepare: Vec<Conditional<Command>>,
    /// The configure invocation.
    pub configure: Configure,
    /// Build and install commands, in order.
    #[serde(default)]
    pub build: Vec<Command>,
    /// Auxiliary file placements, in order.
    #[serde(default)]
    pub artifacts: Vec<Placement>,
}

/// Post-install smoke test description.
///
/// `server_args`, `client_args`, and `expected_diagnostic` may contain a
/// `{socket}` placeholder, substituted with a fresh control-socket path at
/// run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestProcedure {
    /// Arguments asking the produced binary to report its version.
    pub version_args: Vec<String>,
    /// Arguments spawning the binary in server mode on `{socket}`.
    pub server_args: Vec<String>,
    /// Arguments for a client query against `{socket}`.
    pub client_args: Vec<String>,
    /// Exact diagnostic the client must print when no server is serving.
    pub expected_diagnostic: String,
    /// Bound, in seconds, on waiting for the socket to materialize.
    #[serde(default = "default_socket_timeout")]
    pub socket_timeout_secs: u64,
}

fn default_socket_timeout() -> u64 {
    10
}

/// Top-level immutable definition of how to build one package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Package name.
    pub name: String,
    /// Short human-readable summary.
    #[serde(default)]
    pub description: String,
    /// Project homepage URL.
    #[serde(default)]
    pub homepage: String,
    /// SPDX license identifier.
    #[serde(default)]
    pub license: String,
    /// Upstream version of the released source.
    pub version: Version,
    /// Packaging revision on top of the upstream version.
    #[serde(default)]
    pub revision: u32,
    /// Message surfaced to the user after installation.
    ///
    /// Declared before the table-valued fields so the TOML form stays
    /// serializable (values must precede tables).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caveats: Option<String>,
    /// Selectable build variants, in declaration order.
    pub variants: Vec<Variant>,
    /// Recipe-global dependencies, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Auxiliary fetchable resources.
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// How the package is configured, built, and installed.
    pub install: InstallProcedure,
    /// Post-install smoke test.
    pub test: TestProcedure,
}

impl Recipe {
    /// Look up an auxiliary resource by name.
    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_contains() {
        let v33a: Version = "3.3a".parse().unwrap();
        let only = VersionWindow::only(v33a.clone());
        assert!(only.contains(&v33a));
        assert!(!only.contains(&"3.4".parse().unwrap()));
        assert!(!only.contains(&"3.3".parse().unwrap()));
        assert!(VersionWindow::default().contains(&v33a));
        assert!(!VersionWindow::default().is_bounded());
    }

    #[test]
    fn source_spec_toml_round_trip() {
        let archive = SourceSpec::Archive {
            url: "https://example.com/pkg-1.0.tar.gz".into(),
            sha256: Sha256Digest::compute(b"archive"),
        };
        let text = toml::to_string(&archive).unwrap();
        assert!(text.contains("kind = \"archive\""));
        let back: SourceSpec = toml::from_str(&text).unwrap();
        assert_eq!(back, archive);

        let repo = SourceSpec::Repository {
            url: "https://example.com/pkg.git".into(),
            reference: "master".into(),
        };
        let text = toml::to_string(&repo).unwrap();
        let back: SourceSpec = toml::from_str(&text).unwrap();
        assert_eq!(back, repo);
    }

    #[test]
    fn dependency_defaults_to_runtime_unconditional() {
        let dep: Dependency = toml::from_str("name = \"libevent\"").unwrap();
        assert_eq!(dep.phase, Phase::Runtime);
        assert!(dep.condition.is_none());
    }
}
