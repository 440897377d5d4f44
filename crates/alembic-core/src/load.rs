//! TOML recipe loading.
//!
//! Recipes are human-readable TOML documents that deserialize into
//! [`Recipe`]. The schema types carry all structural validation; this
//! module only bridges files and strings into them.

use std::fs;
use std::path::Path;

use alembic_schema::Recipe;
use thiserror::Error;

/// Errors that can occur when loading or parsing a recipe file.
#[derive(Error, Debug)]
pub enum RecipeError {
    /// An I/O error occurred while reading a recipe file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be deserialized into a valid recipe.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Parse a recipe from a TOML file on disk.
///
/// # Errors
///
/// Returns [`RecipeError::Io`] if the file cannot be read, or
/// [`RecipeError::Parse`] if the TOML content is invalid.
pub fn from_file(path: &Path) -> Result<Recipe, RecipeError> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}

/// Parse a recipe from a TOML string.
///
/// # Errors
///
/// Returns [`RecipeError::Parse`] if the TOML content is invalid or does
/// not match the schema.
pub fn parse(content: &str) -> Result<Recipe, RecipeError> {
    Ok(toml::from_str(content)?)
}
