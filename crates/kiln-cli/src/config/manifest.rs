//! Package metadata read from a Cargo manifest.

use crate::error::{ConfigError, Result};
use std::path::Path;
use toml::{Table, Value};

/// The `[package]` fields kiln uses. Workspace-inherited fields
/// (`version.workspace = true`) are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    /// `homepage`, falling back to `repository`
    pub homepage: Option<String>,
    /// First entry of `authors`
    pub author: Option<String>,
}

impl PackageInfo {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|message| {
            ConfigError::Manifest {
                path: path.to_path_buf(),
                message,
            }
            .into()
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let manifest: Table = toml::from_str(content).map_err(|e| e.message().to_string())?;
        let Some(package) = manifest.get("package").and_then(Value::as_table) else {
            return Err("no [package] table".to_string());
        };

        let text = |key: &str| {
            package
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            name: text("name"),
            version: text("version"),
            homepage: text("homepage").or_else(|| text("repository")),
            author: package
                .get("authors")
                .and_then(Value::as_array)
                .and_then(|authors| authors.first())
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}
