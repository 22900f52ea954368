use std::path::{Path, PathBuf};

use kiln_bundler::pipeline::DEFAULT_INIT_EXPORT;

pub fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

pub fn default_init_export() -> String {
    DEFAULT_INIT_EXPORT.to_string()
}

pub fn default_manifest() -> PathBuf {
    PathBuf::from("Cargo.toml")
}

/// Glue path wasm-pack writes for `name`.
pub fn default_entry(name: &str) -> PathBuf {
    Path::new("pkg").join(format!("{}.js", crate_stem(name)))
}

/// Binary path wasm-pack writes for `name`.
pub fn default_binary(name: &str) -> PathBuf {
    Path::new("pkg").join(format!("{}_bg.wasm", crate_stem(name)))
}

fn crate_stem(name: &str) -> String {
    name.replace('-', "_")
}
