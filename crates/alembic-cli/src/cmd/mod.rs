//! Subcommand implementations.

pub mod completions;
pub mod deps;
pub mod fetch;
pub mod info;
pub mod install;
pub mod plan;
pub mod test;
