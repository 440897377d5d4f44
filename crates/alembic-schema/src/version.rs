//! Upstream version identifiers with point-release suffixes.
//!
//! Upstream releases of the kind this resolver targets are not semver:
//! `3.3a` is the point release after `3.3`, and macOS versions like `10.13`
//! have no patch component. Versions are therefore ordered as tuples of
//! numeric components, each with an optional alphabetic suffix, so that
//! `3.3 < 3.3a < 3.4` and `10.12.6 < 10.13`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::str::FromStr;

/// Errors produced while parsing a [`Version`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum VersionError {
    /// The version string was empty.
    #[error("empty version string")]
    Empty,

    /// A dot-separated component did not start with a digit.
    #[error("invalid version component '{0}': must start with a digit")]
    InvalidComponent(String),
}

/// One dot-separated component: a number plus an optional suffix (`3a`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Component {
    num: u64,
    suffix: String,
}

/// An ordered upstream version identifier (`3.3a`, `10.13`, `2.6`).
///
/// Ordering compares components numerically, then by suffix; a component
/// with no suffix sorts before the same number with one, and missing
/// trailing components compare as zero (`3.3 == 3.3.0`).
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<Component>,
}

impl Version {
    /// Parse a version string.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError`] if the string is empty or a component does
    /// not begin with a digit.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        s.parse()
    }

    fn component(&self, idx: usize) -> Component {
        self.components.get(idx).cloned().unwrap_or(Component {
            num: 0,
            suffix: String::new(),
        })
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionError::Empty);
        }

        let mut components = Vec::new();
        for part in s.split('.') {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                return Err(VersionError::InvalidComponent(part.to_string()));
            }
            let num = digits
                .parse()
                .map_err(|_| VersionError::InvalidComponent(part.to_string()))?;
            let suffix = part[digits.len()..].to_string();
            components.push(Component { num, suffix });
        }

        Ok(Self { components })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            match self.component(i).cmp(&other.component(i)) {
                Ordering::Equal => {}
                non_eq => return non_eq,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// PartialEq must agree with Ord: `3.3` and `3.3.0` are the same version.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, c) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}{}", c.num, c.suffix)?;
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
