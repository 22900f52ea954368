//! Configuration system for kiln with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and config files.
//! Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;
mod manifest;
mod resolve;
mod validation;

use kiln_bundler::TargetSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use defaults::*;
pub use loading::{CONFIG_FILE_NAME, ENV_PREFIX, env_key};
pub use manifest::PackageInfo;
pub use resolve::ResolvedProject;
pub use validation::*;

/// kiln configuration - loaded from kiln.config.json, `KILN_*` and CLI args.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KilnConfig {
    /// Project name; defaults to the manifest's package name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// wasm-bindgen glue script; defaults to `pkg/<crate>.js`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<PathBuf>,

    /// Compiled binary; defaults to `pkg/<crate>_bg.wasm`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<PathBuf>,

    /// Name of the glue's init function
    #[serde(default = "default_init_export")]
    pub init_export: String,

    /// Output directory
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Cargo manifest supplying metadata; `Cargo.toml` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,

    /// Explicit metadata; wins over the manifest
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Banner copyright year; defaults to the current year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Browser global for UMD targets; defaults to the project name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,

    /// Target table; the three default targets when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<TargetSpec>>,

    /// Build targets in declaration order instead of in parallel
    #[serde(default)]
    pub sequential: bool,

    /// Empty the output directory before building
    #[serde(default)]
    pub clean: bool,
}

/// Banner metadata set directly in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MetadataConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// `Name <email>` or just a name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}
