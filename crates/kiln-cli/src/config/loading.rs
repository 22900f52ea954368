use crate::config::KilnConfig;
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory.
pub const CONFIG_FILE_NAME: &str = "kiln.config.json";

/// Prefix of environment overrides (`KILN_OUT_DIR`, `KILN_METADATA__VERSION`).
pub const ENV_PREFIX: &str = "KILN_";

/// Fields the build command can override. Unset fields leave lower layers alone.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    entry: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    binary: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    global_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequential: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clean: Option<bool>,
}

impl From<&crate::cli::BuildArgs> for CliOverrides {
    fn from(args: &crate::cli::BuildArgs) -> Self {
        Self {
            entry: args.entry.clone(),
            binary: args.binary.clone(),
            out_dir: args.out_dir.clone(),
            global_name: args.global_name.clone(),
            year: args.year,
            sequential: args.sequential.then_some(true),
            clean: args.clean.then_some(true),
        }
    }
}

/// Map an environment variable name (prefix stripped) to a config key.
///
/// Single underscores separate words, double underscores nest:
/// `OUT_DIR` becomes `outDir`, `METADATA__VERSION` becomes `metadata.version`.
pub fn env_key(raw: &str) -> String {
    raw.split("__")
        .map(|segment| {
            let mut key = String::with_capacity(segment.len());
            for (i, word) in segment
                .split('_')
                .filter(|w| !w.is_empty())
                .enumerate()
            {
                let word = word.to_ascii_lowercase();
                if i == 0 {
                    key.push_str(&word);
                } else {
                    let mut chars = word.chars();
                    if let Some(first) = chars.next() {
                        key.push(first.to_ascii_uppercase());
                        key.push_str(chars.as_str());
                    }
                }
            }
            key
        })
        .collect::<Vec<_>>()
        .join(".")
}

impl KilnConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    ///
    /// `config_path` must exist when given; otherwise `kiln.config.json` in
    /// `cwd` is used if present.
    pub fn load(args: &crate::cli::BuildArgs, cwd: &Path) -> Result<Self> {
        Self::load_layers(args.config.as_deref(), cwd, Some(CliOverrides::from(args)))
    }

    /// Load without CLI overrides (used by `kiln targets`).
    pub fn load_file_and_env(config_path: Option<&Path>, cwd: &Path) -> Result<Self> {
        Self::load_layers(config_path, cwd, None)
    }

    fn load_layers(
        config_path: Option<&Path>,
        cwd: &Path,
        overrides: Option<CliOverrides>,
    ) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default_config()));

        let config_file = match config_path {
            Some(path) => {
                let path = crate::commands::resolve_path(path, cwd);
                if !path.exists() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => {
                let default_path = cwd.join(CONFIG_FILE_NAME);
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(path) = &config_file {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Json::file(path));
        }

        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .map(|key| env_key(key.as_str()).into())
                .lowercase(false),
        );

        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        figment
            .extract::<Self>()
            .map_err(|e| ConfigError::Invalid(e.to_string()).into())
    }

    /// Get default configuration values.
    pub(crate) fn default_config() -> Self {
        use crate::config::defaults::*;

        Self {
            name: None,
            entry: None,
            binary: None,
            init_export: default_init_export(),
            out_dir: default_out_dir(),
            manifest: None,
            metadata: Default::default(),
            year: None,
            global_name: None,
            targets: None,
            sequential: false,
            clean: false,
        }
    }
}
