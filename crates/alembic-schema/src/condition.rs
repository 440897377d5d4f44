//! Environment predicates gating dependencies, patches, and flags.
//!
//! The original recipe scattered OS and version checks across its install
//! logic; here every gate is a single declarative [`Condition`] value
//! evaluated uniformly against immutable [`EnvironmentFacts`].

use serde::{Deserialize, Serialize};

use crate::version::Version;

/// Operating system family of the target environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    /// Apple macOS.
    Macos,
    /// Linux distributions.
    Linux,
    /// Any OS family the recipe does not know about. Conditions targeting a
    /// known family evaluate `false` against it rather than failing.
    Unknown,
}

// Deserialized through `FromStr` so unrecognized families map to `Unknown`
// instead of rejecting the whole document.
impl<'de> Deserialize<'de> for OsFamily {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(Self::Unknown))
    }
}

impl std::str::FromStr for OsFamily {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "macos" | "darwin" => Self::Macos,
            "linux" => Self::Linux,
            _ => Self::Unknown,
        })
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Macos => write!(f, "macos"),
            Self::Linux => write!(f, "linux"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Whether the caller wants the released package or the development head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Build the released (stable) package.
    #[default]
    Stable,
    /// Build from the development head.
    Head,
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stable => write!(f, "stable"),
            Self::Head => write!(f, "head"),
        }
    }
}

/// Caller-supplied snapshot of the target environment.
///
/// Immutable for the duration of one resolution; two resolutions with equal
/// facts produce identical results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentFacts {
    /// Target operating system family.
    pub os: OsFamily,
    /// Target OS version, when known. Required only by version-gated
    /// conditions that target the same family.
    #[serde(default)]
    pub os_version: Option<Version>,
    /// Requested build mode.
    #[serde(default)]
    pub build_mode: BuildMode,
}

impl EnvironmentFacts {
    /// Facts for the host this process runs on. The OS version is left
    /// unset; callers that need version-gated conditions supply it
    /// explicitly.
    pub fn current() -> Self {
        let os = if cfg!(target_os = "macos") {
            OsFamily::Macos
        } else if cfg!(target_os = "linux") {
            OsFamily::Linux
        } else {
            OsFamily::Unknown
        };
        Self {
            os,
            os_version: None,
            build_mode: BuildMode::Stable,
        }
    }
}

/// Error raised when a condition cannot be decided from the given facts.
///
/// This is a fatal configuration error for the whole resolution, never a
/// silent skip.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConditionError {
    /// A version-gated condition targeted the facts' OS family, but the
    /// facts carry no OS version.
    #[error("environment facts carry no OS version, required by `{condition}`")]
    MissingOsVersion {
        /// Rendered form of the condition that needed the version.
        condition: String,
    },
}

/// A pure predicate over [`EnvironmentFacts`].
///
/// Combinators allow the recipe's compound gates (for example
/// "linux, or macOS sierra or newer") to stay declarative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Exact OS family match.
    Os(OsFamily),
    /// OS version lower bound, scoped to one family. Evaluates `false` for
    /// any other family without consulting the version.
    OsAtLeast {
        /// Family the bound applies to.
        os: OsFamily,
        /// Minimum (inclusive) OS version.
        min: Version,
    },
    /// Build-mode equality.
    Mode(BuildMode),
    /// True if any inner condition is true. Empty list is `false`.
    AnyOf(Vec<Condition>),
    /// True if all inner conditions are true. Empty list is `true`.
    AllOf(Vec<Condition>),
}

impl Condition {
    /// Evaluate this condition against the facts.
    ///
    /// Deterministic and side-effect free: equal inputs always produce the
    /// same answer. An unknown OS family in the facts makes family-scoped
    /// conditions `false`.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::MissingOsVersion`] when a version bound
    /// applies to the facts' family but the facts carry no version.
    pub fn eval(&self, facts: &EnvironmentFacts) -> Result<bool, ConditionError> {
        match self {
            Self::Os(family) => Ok(facts.os == *family),
            Self::OsAtLeast { os, min } => {
                if facts.os != *os {
                    return Ok(false);
                }
                match &facts.os_version {
                    Some(v) => Ok(v >= min),
                    None => Err(ConditionError::MissingOsVersion {
                        condition: self.to_string(),
                    }),
                }
            }
            Self::Mode(mode) => Ok(facts.build_mode == *mode),
            Self::AnyOf(inner) => {
                for cond in inner {
                    if cond.eval(facts)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::AllOf(inner) => {
                for cond in inner {
                    if !cond.eval(facts)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Os(family) => write!(f, "os == {family}"),
            Self::OsAtLeast { os, min } => write!(f, "{os} >= {min}"),
            Self::Mode(mode) => write!(f, "mode == {mode}"),
            Self::AnyOf(inner) => {
                write!(f, "any(")?;
                for (i, c) in inner.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
            Self::AllOf(inner) => {
                write!(f, "all(")?;
                for (i, c) in inner.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn macos(version: &str) -> EnvironmentFacts {
        EnvironmentFacts {
            os: OsFamily::Macos,
            os_version: Some(version.parse().unwrap()),
            build_mode: BuildMode::Stable,
        }
    }

    fn linux() -> EnvironmentFacts {
        EnvironmentFacts {
            os: OsFamily::Linux,
            os_version: None,
            build_mode: BuildMode::Stable,
        }
    }

    #[test]
    fn family_match() {
        assert!(Condition::Os(OsFamily::Linux).eval(&linux()).unwrap());
        assert!(!Condition::Os(OsFamily::Macos).eval(&linux()).unwrap());
    }

    #[test]
    fn unknown_family_is_false_not_error() {
        let facts = EnvironmentFacts {
            os: OsFamily::Unknown,
            os_version: None,
            build_mode: BuildMode::Stable,
        };
        assert!(!Condition::Os(OsFamily::Macos).eval(&facts).unwrap());
        // Version bound scoped to macos never consults the missing version.
        let gated = Condition::OsAtLeast {
            os: OsFamily::Macos,
            min: "10.12".parse().unwrap(),
        };
        assert!(!gated.eval(&facts).unwrap());
    }

    #[test]
    fn version_lower_bound() {
        let sierra_or_newer = Condition::OsAtLeast {
            os: OsFamily::Macos,
            min: "10.12".parse().unwrap(),
        };
        assert!(sierra_or_newer.eval(&macos("10.13")).unwrap());
        assert!(sierra_or_newer.eval(&macos("10.12")).unwrap());
        assert!(!sierra_or_newer.eval(&macos("10.11.6")).unwrap());
    }

    #[test]
    fn missing_version_is_fatal_for_matching_family() {
        let gated = Condition::OsAtLeast {
            os: OsFamily::Macos,
            min: "10.13".parse().unwrap(),
        };
        let facts = EnvironmentFacts {
            os: OsFamily::Macos,
            os_version: None,
            build_mode: BuildMode::Stable,
        };
        assert!(matches!(
            gated.eval(&facts),
            Err(ConditionError::MissingOsVersion { .. })
        ));
    }

    #[test]
    fn linux_or_macos_sierra_combinator() {
        // The recipe's `on_system :linux, macos: :sierra_or_newer` gate.
        let gate = Condition::AnyOf(vec![
            Condition::Os(OsFamily::Linux),
            Condition::OsAtLeast {
                os: OsFamily::Macos,
                min: "10.12".parse().unwrap(),
            },
        ]);
        assert!(gate.eval(&linux()).unwrap());
        assert!(gate.eval(&macos("10.13")).unwrap());
        assert!(!gate.eval(&macos("10.11")).unwrap());
    }

    #[test]
    fn mode_equality() {
        let head_only = Condition::Mode(BuildMode::Head);
        let mut facts = linux();
        assert!(!head_only.eval(&facts).unwrap());
        facts.build_mode = BuildMode::Head;
        assert!(head_only.eval(&facts).unwrap());
    }

    #[test]
    fn eval_is_deterministic() {
        let gate = Condition::AllOf(vec![
            Condition::Os(OsFamily::Macos),
            Condition::Mode(BuildMode::Stable),
        ]);
        let facts = macos("10.13");
        let first = gate.eval(&facts).unwrap();
        for _ in 0..10 {
            assert_eq!(gate.eval(&facts).unwrap(), first);
        }
    }

    #[test]
    fn toml_round_trip() {
        let gate = Condition::OsAtLeast {
            os: OsFamily::Macos,
            min: "10.13".parse().unwrap(),
        };
        let text = toml::to_string(&gate).unwrap();
        let back: Condition = toml::from_str(&text).unwrap();
        assert_eq!(back, gate);
    }
}
