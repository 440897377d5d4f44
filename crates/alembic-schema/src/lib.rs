//! Shared data model for alembic recipes.
//!
//! A [`Recipe`] is the declarative description of how to build and install
//! one software package: its selectable [`Variant`]s, conditional
//! dependencies and patches, fetchable [`Resource`]s, and the install/test
//! procedures. Everything here is plain data; resolution logic lives in
//! `alembic-core`.

pub mod condition;
pub mod hash;
pub mod recipe;
pub mod version;

pub use condition::{BuildMode, Condition, ConditionError, EnvironmentFacts, OsFamily};
pub use hash::{DigestError, Sha256Digest};
pub use recipe::{
    Command, Conditional, Configure, Dependency, EnvMutation, InstallDir, InstallProcedure,
    Patch, Phase, Placement, PlacementSource, Recipe, Resource, ResourceKind, SourceSpec,
    TestProcedure, Variant, VersionWindow,
};
pub use version::{Version, VersionError};
