//! Core library for alembic - recipe resolution, plan composition, fetch,
//! and verification.
//!
//! Resolution is pure: [`resolve::resolve`] turns a recipe plus environment
//! facts into an inspectable [`plan::InstallPlan`] without touching the
//! filesystem or spawning anything. Side effects live behind the
//! [`execute::StepExecutor`] and [`verify::TestHost`] seams.

pub mod builtin;
pub mod deps;
pub mod error;
pub mod execute;
pub mod fetch;
pub mod load;
pub mod patch;
pub mod paths;
pub mod plan;
pub mod resolve;
pub mod select;
pub mod verify;

pub use error::ResolveError;
pub use paths::Layout;
pub use plan::{InstallPlan, PlanStep};
pub use resolve::{Resolution, resolve};
pub use select::VariantRequest;

/// User agent sent with every fetch.
pub const USER_AGENT: &str = concat!("alembic/", env!("CARGO_PKG_VERSION"));
