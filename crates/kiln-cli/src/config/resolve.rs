//! Resolution of a loaded configuration into pipeline inputs.

use crate::commands::resolve_path;
use crate::config::{KilnConfig, PackageInfo, default_binary, default_entry, default_manifest};
use crate::error::{ConfigError, Result};
use kiln_bundler::{Pipeline, ProjectMetadata, ProvenanceBanner, TargetSpec, default_targets};
use std::path::{Path, PathBuf};

/// Everything a build needs, with paths made absolute against `cwd`.
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    pub metadata: ProjectMetadata,
    pub entry: PathBuf,
    pub binary: PathBuf,
    pub out_dir: PathBuf,
    pub init_export: String,
    pub year: Option<i32>,
    pub global_name: Option<String>,
    pub targets: Vec<TargetSpec>,
    pub sequential: bool,
    pub clean: bool,
}

impl KilnConfig {
    /// Fill gaps from the manifest and derive default paths.
    ///
    /// An explicit `manifest` must exist; the implicit `Cargo.toml` is only
    /// read when present.
    pub fn resolve(&self, cwd: &Path) -> Result<ResolvedProject> {
        let package = match &self.manifest {
            Some(path) => PackageInfo::read(&resolve_path(path, cwd))?,
            None => {
                let path = cwd.join(default_manifest());
                if path.exists() {
                    PackageInfo::read(&path)?
                } else {
                    PackageInfo::default()
                }
            }
        };

        let name = self
            .name
            .clone()
            .or(package.name)
            .ok_or_else(|| ConfigError::MissingField {
                field: "name".to_string(),
                hint: "Set 'name' in kiln.config.json or run kiln next to Cargo.toml".to_string(),
            })?;

        let metadata = ProjectMetadata {
            homepage: self
                .metadata
                .homepage
                .clone()
                .or(package.homepage)
                .unwrap_or_default(),
            version: self
                .metadata
                .version
                .clone()
                .or(package.version)
                .unwrap_or_default(),
            author: self
                .metadata
                .author
                .clone()
                .or(package.author)
                .unwrap_or_default(),
            name,
        };

        let entry = self
            .entry
            .clone()
            .unwrap_or_else(|| default_entry(&metadata.name));
        let binary = self
            .binary
            .clone()
            .unwrap_or_else(|| default_binary(&metadata.name));
        let targets = self
            .targets
            .clone()
            .unwrap_or_else(|| default_targets(&metadata.name));

        Ok(ResolvedProject {
            entry: resolve_path(&entry, cwd),
            binary: resolve_path(&binary, cwd),
            out_dir: resolve_path(&self.out_dir, cwd),
            init_export: self.init_export.clone(),
            year: self.year,
            global_name: self.global_name.clone(),
            targets,
            sequential: self.sequential,
            clean: self.clean,
            metadata,
        })
    }
}

impl ResolvedProject {
    /// Whether any declared target asks for the provenance banner.
    pub fn wants_banner(&self) -> bool {
        self.targets
            .iter()
            .any(|t| t.banner.unwrap_or(t.minify))
    }

    pub fn pipeline(&self) -> Pipeline {
        let mut pipeline = Pipeline::new(&self.metadata, &self.entry, &self.binary)
            .out_dir(&self.out_dir)
            .targets(self.targets.clone())
            .init_export(&self.init_export)
            .parallel(!self.sequential);
        if let Some(year) = self.year {
            pipeline = pipeline.banner(ProvenanceBanner::new(&self.metadata, year));
        }
        if let Some(global_name) = &self.global_name {
            pipeline = pipeline.global_name(global_name);
        }
        pipeline
    }
}
