//! Binary integration: external companion file or inlined payload.
//!
//! Both strategies produce the same thing for the wrapper, a block of loader
//! statements defining `__kiln_load()`, which returns the module bytes (or a
//! promise of them). Only the strategy decides where the bytes come from:
//!
//! - [`BinaryStrategy::External`] reads `{stem}_bg.wasm` next to the bundle at
//!   runtime. A missing file is a rejected promise for the consumer, never a
//!   build failure.
//! - [`BinaryStrategy::Inline`] reads the artifact at build time and embeds it
//!   as base64. A missing artifact fails the target.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::target::{BuildTarget, OutputFormat};
use crate::wrapper::js_string;
use crate::{Error, Result};

/// Where the binary payload lives at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryStrategy {
    External,
    Inline,
}

impl BinaryStrategy {
    pub fn for_target(target: &BuildTarget) -> Self {
        if target.inline_binary {
            Self::Inline
        } else {
            Self::External
        }
    }
}

/// The binary as resolved for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinarySource {
    /// Loaded at runtime from `file_name`, relative to the bundle.
    External {
        /// Companion path relative to the output directory.
        path: PathBuf,
        file_name: String,
        /// Artifact bytes to ship, `None` if the artifact was missing at build time.
        bytes: Option<Vec<u8>>,
    },
    /// Embedded base64 payload.
    Inline { encoded: String },
}

impl BinarySource {
    /// Loader statements for `format`. Defines `__kiln_load()`.
    pub fn loader(&self, format: OutputFormat) -> String {
        match self {
            BinarySource::External { file_name, .. } => external_loader(file_name, format),
            BinarySource::Inline { encoded } => inline_loader(encoded),
        }
    }
}

/// Resolves the compiled module for a target according to its strategy.
#[derive(Debug, Clone)]
pub struct BinaryAdapter<'a> {
    artifact: &'a Path,
    strategy: BinaryStrategy,
}

impl<'a> BinaryAdapter<'a> {
    pub fn new(artifact: &'a Path, strategy: BinaryStrategy) -> Self {
        Self { artifact, strategy }
    }

    pub fn strategy(&self) -> BinaryStrategy {
        self.strategy
    }

    /// Resolve the artifact for `target`.
    ///
    /// # Errors
    ///
    /// [`Error::AssetNotFound`] with the artifact path when the strategy is
    /// inline and the artifact cannot be read.
    pub fn resolve(&self, target: &BuildTarget) -> Result<BinarySource> {
        match self.strategy {
            BinaryStrategy::Inline => {
                let bytes = std::fs::read(self.artifact).map_err(|source| Error::AssetNotFound {
                    path: self.artifact.to_path_buf(),
                    source,
                })?;
                tracing::debug!(
                    artifact = %self.artifact.display(),
                    bytes = bytes.len(),
                    "inlining binary payload"
                );
                Ok(BinarySource::Inline {
                    encoded: STANDARD.encode(&bytes),
                })
            }
            BinaryStrategy::External => {
                let path = crate::target::binary_file(&target.output_path);
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let bytes = match std::fs::read(self.artifact) {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        tracing::warn!(
                            artifact = %self.artifact.display(),
                            error = %e,
                            "binary artifact missing; '{}' will fail to load at runtime",
                            file_name
                        );
                        None
                    }
                };
                Ok(BinarySource::External {
                    path,
                    file_name,
                    bytes,
                })
            }
        }
    }
}

const NODE_READ: &str = r#"require('fs').promises.readFile(require('path').join(__dirname, __kiln_binary)).then(function (bytes) {
            return new Uint8Array(bytes);
        });"#;

fn external_loader(file_name: &str, format: OutputFormat) -> String {
    let mut out = format!("var __kiln_binary = {};\n", js_string(file_name));
    match format {
        OutputFormat::Cjs => {
            out.push_str("function __kiln_load() {\n");
            out.push_str("    return ");
            out.push_str(&NODE_READ.replace("\n        ", "\n    "));
            out.push_str("\n}");
        }
        OutputFormat::Umd => {
            out.push_str(
                "var __kiln_script = typeof document !== 'undefined' && document.currentScript ? document.currentScript.src : undefined;\n",
            );
            out.push_str("function __kiln_load() {\n");
            out.push_str(
                "    if (typeof process !== 'undefined' && process.versions != null && process.versions.node != null) {\n",
            );
            out.push_str("        return ");
            out.push_str(NODE_READ);
            out.push_str("\n    }\n");
            out.push_str(
                r#"    var base = __kiln_script || (typeof location !== 'undefined' ? location.href : undefined);
    return fetch(new URL(__kiln_binary, base)).then(function (response) {
        if (!response.ok) {
            throw new Error('failed to load ' + __kiln_binary + ': ' + response.status);
        }
        return response.arrayBuffer();
    }).then(function (buffer) {
        return new Uint8Array(buffer);
    });
}"#,
            );
        }
    }
    out
}

fn inline_loader(encoded: &str) -> String {
    format!(
        r#"var __kiln_payload = {payload};
function __kiln_decode(encoded) {{
    if (typeof Buffer === 'function') {{
        return new Uint8Array(Buffer.from(encoded, 'base64'));
    }}
    var raw = atob(encoded);
    var bytes = new Uint8Array(raw.length);
    for (var i = 0; i < raw.length; i++) {{
        bytes[i] = raw.charCodeAt(i);
    }}
    return bytes;
}}
function __kiln_load() {{
    return __kiln_decode(__kiln_payload);
}}"#,
        payload = js_string(encoded)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetSpec;
    use std::fs;
    use tempfile::TempDir;

    fn target(inline: bool, format: &str, output: &str) -> BuildTarget {
        TargetSpec {
            id: "t".to_string(),
            format: format.to_string(),
            output: output.to_string(),
            sourcemap: true,
            inline_binary: inline,
            minify: false,
            banner: None,
        }
        .resolve()
        .unwrap()
    }

    #[test]
    fn test_strategy_follows_flag() {
        assert_eq!(
            BinaryStrategy::for_target(&target(true, "umd", "a.js")),
            BinaryStrategy::Inline
        );
        assert_eq!(
            BinaryStrategy::for_target(&target(false, "umd", "a.js")),
            BinaryStrategy::External
        );
    }

    #[test]
    fn test_inline_encodes_payload() {
        let dir = TempDir::new().unwrap();
        let wasm = dir.path().join("m.wasm");
        fs::write(&wasm, [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00]).unwrap();

        let adapter = BinaryAdapter::new(&wasm, BinaryStrategy::Inline);
        let source = adapter.resolve(&target(true, "umd", "a.min.js")).unwrap();
        assert_eq!(
            source,
            BinarySource::Inline {
                encoded: "AGFzbQEAAAA=".to_string()
            }
        );

        let loader = source.loader(OutputFormat::Umd);
        assert!(loader.contains("\"AGFzbQEAAAA=\""));
        assert!(!loader.contains(".wasm"));
        assert!(loader.contains("function __kiln_load()"));
    }

    #[test]
    fn test_inline_missing_artifact_is_fatal() {
        let dir = TempDir::new().unwrap();
        let wasm = dir.path().join("missing.wasm");
        let adapter = BinaryAdapter::new(&wasm, BinaryStrategy::Inline);
        let err = adapter.resolve(&target(true, "umd", "a.js")).unwrap_err();
        assert!(matches!(err, Error::AssetNotFound { ref path, .. } if *path == wasm));
    }

    #[test]
    fn test_external_missing_artifact_is_deferred() {
        let dir = TempDir::new().unwrap();
        let wasm = dir.path().join("missing.wasm");
        let adapter = BinaryAdapter::new(&wasm, BinaryStrategy::External);
        let source = adapter.resolve(&target(false, "cjs", "a.cjs.js")).unwrap();
        match source {
            BinarySource::External {
                file_name, bytes, ..
            } => {
                assert_eq!(file_name, "a.cjs_bg.wasm");
                assert!(bytes.is_none());
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_external_loader_references_file_once() {
        for format in [OutputFormat::Umd, OutputFormat::Cjs] {
            let loader = external_loader("mbd-wasm_bg.wasm", format);
            assert_eq!(loader.matches("mbd-wasm_bg.wasm").count(), 1);
            assert!(loader.contains("function __kiln_load()"));
        }
    }

    #[test]
    fn test_cjs_loader_is_node_only() {
        let loader = external_loader("x_bg.wasm", OutputFormat::Cjs);
        assert!(loader.contains("__dirname"));
        assert!(!loader.contains("fetch("));

        let umd = external_loader("x_bg.wasm", OutputFormat::Umd);
        assert!(umd.contains("fetch("));
        assert!(umd.contains("__dirname"));
    }
}
