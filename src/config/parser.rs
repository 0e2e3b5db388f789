//! TOML file parsing with file path context.
//!
//! ```rust,no_run
//! use stencil_cli::config::parse_config;
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Deserialize)]
//! struct MyConfig {
//!     name: String,
//! }
//!
//! # fn example() -> anyhow::Result<()> {
//! let config: MyConfig = parse_config(Path::new("stencil.toml"))?;
//! println!("{}", config.name);
//! # Ok(())
//! # }
//! ```
//!
//! A missing file is reported as [`StencilError::ConfigNotFound`] and a syntax or
//! schema error as [`StencilError::ConfigParseError`], so the CLI can attach the
//! matching suggestion.

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::StencilError;

/// Reads and deserializes a TOML file.
///
/// # Errors
///
/// - [`StencilError::ConfigNotFound`] if `path` does not exist
/// - [`StencilError::ConfigParseError`] if the content is not valid for `T`
/// - an I/O error with the path in its context if the file cannot be read
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    if !path.exists() {
        return Err(StencilError::ConfigNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&content).map_err(|e| {
        StencilError::ConfigParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct TestConfig {
        name: String,
        value: i32,
    }

    #[test]
    fn test_parse_config() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join("test.toml");
        std::fs::write(&config_path, "name = \"test\"\nvalue = 42\n").unwrap();

        let config: TestConfig = parse_config(&config_path).unwrap();
        assert_eq!(config.name, "test");
        assert_eq!(config.value, 42);
    }

    #[test]
    fn test_parse_config_syntax_error() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join("invalid.toml");
        std::fs::write(&config_path, "invalid = toml {").unwrap();

        let err = parse_config::<TestConfig>(&config_path).err().unwrap();
        assert!(matches!(err.downcast_ref::<StencilError>(), Some(StencilError::ConfigParseError { .. })));
    }

    #[test]
    fn test_parse_config_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let err = parse_config::<TestConfig>(&temp.path().join("nope.toml")).err().unwrap();
        assert!(matches!(err.downcast_ref::<StencilError>(), Some(StencilError::ConfigNotFound { .. })));
    }
}
