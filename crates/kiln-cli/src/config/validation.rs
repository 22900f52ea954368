use crate::config::{KilnConfig, ResolvedProject};
use crate::error::{ConfigError, Result};

/// Validate the UMD global name. Any non-blank single-line string works
/// since it is assigned with bracket notation.
pub fn validate_global_name(name: &str) -> Result<()> {
    crate::cli::parse_global(name).map(drop).map_err(|hint| {
        ConfigError::InvalidValue {
            field: "globalName".to_string(),
            value: name.to_string(),
            hint,
        }
        .into()
    })
}

impl KilnConfig {
    /// Validate configuration values that do not depend on the manifest.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = self.name.as_ref().filter(|n| n.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "name".to_string(),
                value: name.clone(),
                hint: "Project name cannot be empty".to_string(),
            }
            .into());
        }

        if self.init_export.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "initExport".to_string(),
                value: self.init_export.clone(),
                hint: "Name the function the glue uses to instantiate the binary".to_string(),
            }
            .into());
        }

        if let Some(year) = self.year {
            crate::cli::parse_year(&year.to_string()).map_err(|hint| ConfigError::InvalidValue {
                field: "year".to_string(),
                value: year.to_string(),
                hint,
            })?;
        }

        if let Some(global_name) = &self.global_name {
            validate_global_name(global_name)?;
        }

        if self.out_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "outDir".to_string(),
                value: String::new(),
                hint: "Use \"dist\" or another directory".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl ResolvedProject {
    /// Banner targets need every banner field; a blank one would ship a
    /// malformed header.
    pub fn validate(&self) -> Result<()> {
        if !self.wants_banner() {
            return Ok(());
        }
        let fields = [
            ("metadata.homepage", &self.metadata.homepage, "Set package.homepage or package.repository in Cargo.toml"),
            ("metadata.version", &self.metadata.version, "Set package.version in Cargo.toml"),
            ("metadata.author", &self.metadata.author, "Set package.authors in Cargo.toml"),
        ];
        for (field, value, hint) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                    hint: hint.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}
