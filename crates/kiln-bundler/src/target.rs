//! Build target declarations.
//!
//! A target is plain data: output format, inlining policy, minification policy
//! and file name. The pipeline runs one generic stage chain over the table, so
//! near-identical targets never drift apart.
//!
//! - [`TargetSpec`]: raw, deserializable declaration (format kept as a string)
//! - [`BuildTarget`]: validated, immutable target consumed by one build
//! - [`default_targets`]: the standard / CommonJS / minified table

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Module wrapper emitted around the glue code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Universal module definition: AMD, CommonJS or a browser global.
    Umd,
    /// CommonJS for Node-style module loaders.
    Cjs,
}

impl OutputFormat {
    /// Parse a format name (case-insensitive).
    ///
    /// ```
    /// use kiln_bundler::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::parse("UMD"), Some(OutputFormat::Umd));
    /// assert_eq!(OutputFormat::parse("commonjs"), Some(OutputFormat::Cjs));
    /// assert_eq!(OutputFormat::parse("esm"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "umd" => Some(Self::Umd),
            "cjs" | "commonjs" => Some(Self::Cjs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Umd => "umd",
            Self::Cjs => "cjs",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Naming variant of a default target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `{name}.js`
    Standard,
    /// `{name}.cjs.js`
    CommonJs,
    /// `{name}.min.js`
    Minified,
}

impl Variant {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::CommonJs => "commonjs",
            Self::Minified => "minified",
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            Self::Standard => "",
            Self::CommonJs => ".cjs",
            Self::Minified => ".min",
        }
    }

    /// Output file name for a project `name`.
    pub fn file_name(&self, name: &str) -> String {
        format!("{}{}.js", name, self.suffix())
    }
}

fn default_true() -> bool {
    true
}

/// Raw target declaration as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSpec {
    /// Unique target identifier, used in logs and error messages.
    pub id: String,

    /// Output format name (`umd` or `cjs`).
    pub format: String,

    /// Output file name relative to the distribution directory.
    pub output: String,

    /// Emit a `.map` companion file.
    #[serde(default = "default_true")]
    pub sourcemap: bool,

    /// Embed the binary as base64 instead of shipping a companion file.
    #[serde(default)]
    pub inline_binary: bool,

    /// Run the minification stage.
    #[serde(default)]
    pub minify: bool,

    /// Prepend the provenance banner. Defaults to `minify`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<bool>,
}

impl TargetSpec {
    /// Validate the declaration into an immutable [`BuildTarget`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the target id when the format is
    /// unknown or the output path is not a relative `.js` file.
    pub fn resolve(&self) -> Result<BuildTarget> {
        if self.id.trim().is_empty() {
            return Err(Error::config("<unnamed>", "target id must not be empty"));
        }
        let id = self.id.clone();

        let format = OutputFormat::parse(&self.format).ok_or_else(|| {
            Error::config(
                &id,
                format!(
                    "unknown output format '{}'. Expected: umd, cjs",
                    self.format
                ),
            )
        })?;

        let output_path = validate_output(&self.output).map_err(|msg| Error::config(&id, msg))?;

        Ok(BuildTarget {
            id,
            format,
            output_path,
            sourcemap: self.sourcemap,
            inline_binary: self.inline_binary,
            minify: self.minify,
            banner: self.banner.unwrap_or(self.minify),
        })
    }

    /// Every file this declaration may write, relative to the output directory.
    fn claimed_files(&self) -> Vec<PathBuf> {
        let output: PathBuf = Path::new(&self.output)
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        let mut files = vec![output.clone()];
        if self.sourcemap {
            files.push(sourcemap_file(&output));
        }
        if !self.inline_binary {
            files.push(binary_file(&output));
        }
        files
    }
}

fn validate_output(output: &str) -> std::result::Result<PathBuf, String> {
    if output.is_empty() {
        return Err("output file name must not be empty".to_string());
    }
    if !output.ends_with(".js") || output.len() <= 3 {
        return Err(format!("output '{}' must be a .js file", output));
    }
    let path = Path::new(output);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(format!(
            "output '{}' must be relative to the output directory",
            output
        ));
    }
    Ok(path.to_path_buf())
}

/// `{output}.map`
pub(crate) fn sourcemap_file(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".map");
    PathBuf::from(name)
}

/// `{stem}_bg.wasm`, where `stem` is the output file name without `.js`.
pub(crate) fn binary_file(output: &Path) -> PathBuf {
    let file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(".js").unwrap_or(&file_name);
    output.with_file_name(format!("{}_bg.wasm", stem))
}

/// A validated build target. Immutable once declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTarget {
    pub id: String,
    pub format: OutputFormat,
    pub output_path: PathBuf,
    pub sourcemap: bool,
    pub inline_binary: bool,
    pub minify: bool,
    pub banner: bool,
}

impl BuildTarget {
    /// Production targets are the minified ones.
    pub fn is_production(&self) -> bool {
        self.minify
    }

    /// File name of the generated code (last path component).
    pub fn file_name(&self) -> String {
        self.output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Companion `.map` path, when sourcemaps are enabled.
    pub fn sourcemap_path(&self) -> Option<PathBuf> {
        self.sourcemap.then(|| sourcemap_file(&self.output_path))
    }

    /// Companion binary path, for targets that do not inline the payload.
    pub fn binary_path(&self) -> Option<PathBuf> {
        (!self.inline_binary).then(|| binary_file(&self.output_path))
    }
}

/// The three targets shipped for every project: browser global, Node
/// CommonJS, and a minified browser global with the payload inlined.
///
/// ```
/// use kiln_bundler::default_targets;
///
/// let targets = default_targets("mbd-wasm");
/// let outputs: Vec<_> = targets.iter().map(|t| t.output.as_str()).collect();
/// assert_eq!(outputs, ["mbd-wasm.js", "mbd-wasm.cjs.js", "mbd-wasm.min.js"]);
/// ```
pub fn default_targets(name: &str) -> Vec<TargetSpec> {
    [
        (Variant::Standard, OutputFormat::Umd, false, false),
        (Variant::CommonJs, OutputFormat::Cjs, false, false),
        (Variant::Minified, OutputFormat::Umd, true, true),
    ]
    .into_iter()
    .map(|(variant, format, inline_binary, minify)| TargetSpec {
        id: variant.id().to_string(),
        format: format.as_str().to_string(),
        output: variant.file_name(name),
        sourcemap: true,
        inline_binary,
        minify,
        banner: None,
    })
    .collect()
}

/// Reject tables whose targets would clash: duplicate ids or two targets
/// claiming the same file. Runs before any target is built.
pub fn validate_table(specs: &[TargetSpec]) -> Result<()> {
    if specs.is_empty() {
        return Err(Error::InvalidTargetTable(
            "at least one target must be declared".to_string(),
        ));
    }

    let mut ids = HashSet::new();
    for spec in specs {
        if !ids.insert(spec.id.as_str()) {
            return Err(Error::InvalidTargetTable(format!(
                "duplicate target id '{}'",
                spec.id
            )));
        }
    }

    let mut claimed: Vec<(PathBuf, &str)> = Vec::new();
    for spec in specs {
        for file in spec.claimed_files() {
            if let Some((_, owner)) = claimed.iter().find(|(f, _)| *f == file) {
                return Err(Error::InvalidTargetTable(format!(
                    "targets '{}' and '{}' both write '{}'",
                    owner,
                    spec.id,
                    file.display()
                )));
            }
            claimed.push((file, spec.id.as_str()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, format: &str, output: &str) -> TargetSpec {
        TargetSpec {
            id: id.to_string(),
            format: format.to_string(),
            output: output.to_string(),
            sourcemap: true,
            inline_binary: false,
            minify: false,
            banner: None,
        }
    }

    #[test]
    fn test_default_table_shape() {
        let targets: Vec<BuildTarget> = default_targets("mbd-wasm")
            .iter()
            .map(|s| s.resolve().unwrap())
            .collect();

        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0].format, OutputFormat::Umd);
        assert!(!targets[0].inline_binary && !targets[0].minify && !targets[0].banner);
        assert_eq!(targets[1].format, OutputFormat::Cjs);
        assert_eq!(targets[1].output_path, PathBuf::from("mbd-wasm.cjs.js"));
        assert!(targets[2].inline_binary && targets[2].minify && targets[2].banner);
        assert!(targets.iter().all(|t| t.sourcemap));
        assert_eq!(targets.iter().filter(|t| t.is_production()).count(), 1);
    }

    #[test]
    fn test_companion_paths() {
        let standard = spec("standard", "umd", "mbd-wasm.js").resolve().unwrap();
        assert_eq!(
            standard.sourcemap_path(),
            Some(PathBuf::from("mbd-wasm.js.map"))
        );
        assert_eq!(
            standard.binary_path(),
            Some(PathBuf::from("mbd-wasm_bg.wasm"))
        );

        let cjs = spec("commonjs", "cjs", "lib/mbd-wasm.cjs.js").resolve().unwrap();
        assert_eq!(
            cjs.binary_path(),
            Some(PathBuf::from("lib/mbd-wasm.cjs_bg.wasm"))
        );
        assert_eq!(cjs.file_name(), "mbd-wasm.cjs.js");
    }

    #[test]
    fn test_inline_target_has_no_binary_path() {
        let mut s = spec("minified", "umd", "mbd-wasm.min.js");
        s.inline_binary = true;
        s.sourcemap = false;
        let target = s.resolve().unwrap();
        assert_eq!(target.binary_path(), None);
        assert_eq!(target.sourcemap_path(), None);
    }

    #[test]
    fn test_unknown_format_names_target() {
        let err = spec("modern", "esm", "x.js").resolve().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref target, .. } if target == "modern"));
        assert!(err.to_string().contains("esm"));
    }

    #[test]
    fn test_output_must_stay_inside_dist() {
        assert!(spec("a", "umd", "../escape.js").resolve().is_err());
        assert!(spec("a", "umd", "/abs/path.js").resolve().is_err());
        assert!(spec("a", "umd", "bundle.mjs").resolve().is_err());
        assert!(spec("a", "umd", "").resolve().is_err());
        assert!(spec("a", "umd", "./nested/ok.js").resolve().is_ok());
    }

    #[test]
    fn test_banner_defaults_to_minify() {
        let mut s = spec("prod", "umd", "p.js");
        s.minify = true;
        assert!(s.resolve().unwrap().banner);
        s.banner = Some(false);
        assert!(!s.resolve().unwrap().banner);
    }

    #[test]
    fn test_validate_table_rejects_duplicates() {
        let table = vec![spec("a", "umd", "a.js"), spec("a", "cjs", "b.js")];
        assert!(matches!(
            validate_table(&table),
            Err(Error::InvalidTargetTable(_))
        ));
    }

    #[test]
    fn test_validate_table_rejects_colliding_outputs() {
        let table = vec![spec("a", "umd", "x.js"), spec("b", "cjs", "x.js")];
        assert!(validate_table(&table).is_err());

        let table = vec![spec("a", "umd", "x.js"), spec("b", "cjs", "./x.js")];
        assert!(validate_table(&table).is_err());
    }

    #[test]
    fn test_validate_default_table() {
        assert!(validate_table(&default_targets("mbd-wasm")).is_ok());
        assert!(validate_table(&[]).is_err());
    }

    #[test]
    fn test_format_parse_and_display() {
        assert_eq!(OutputFormat::parse(" cjs "), Some(OutputFormat::Cjs));
        assert_eq!(OutputFormat::Umd.to_string(), "umd");
        assert_eq!(OutputFormat::parse("iife"), None);
    }
}
