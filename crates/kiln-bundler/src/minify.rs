//! Size-reduction transform applied to production targets.
//!
//! The pipeline treats the minifier as an opaque [`Transform`]: code and an
//! optional map go in, smaller code and a map back to the same sources come
//! out. [`OxcMinifier`] is the default implementation.

use std::path::PathBuf;

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_sourcemap::SourceMap;
use oxc_span::SourceType;

use crate::sourcemap::compose;

/// A transform stage failure. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransformError(pub String);

/// An opaque code-to-code transform.
///
/// When `map` is given, the returned map must describe the returned code in
/// terms of the sources of `map`, not in terms of `code`.
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;

    fn transform(
        &self,
        code: &str,
        map: Option<&SourceMap>,
    ) -> Result<(String, Option<SourceMap>), TransformError>;
}

/// Compress and mangle with the oxc minifier.
#[derive(Debug, Clone, Copy)]
pub struct OxcMinifier {
    /// Rename local bindings. Top-level names of a script are never renamed.
    pub mangle: bool,
}

impl Default for OxcMinifier {
    fn default() -> Self {
        Self { mangle: true }
    }
}

impl OxcMinifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_mangle() -> Self {
        Self { mangle: false }
    }
}

// Path recorded as the single source of the minifier's own map; replaced by
// the incoming map's sources during composition.
const INTERMEDIATE_SOURCE: &str = "bundle.js";

impl Transform for OxcMinifier {
    fn name(&self) -> &'static str {
        "oxc-minifier"
    }

    fn transform(
        &self,
        code: &str,
        map: Option<&SourceMap>,
    ) -> Result<(String, Option<SourceMap>), TransformError> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, code, SourceType::cjs()).parse();
        if ret.panicked || !ret.errors.is_empty() {
            let message = ret
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(TransformError(format!(
                "generated code does not parse: {}",
                message
            )));
        }
        let mut program = ret.program;

        let options = MinifierOptions {
            mangle: self.mangle.then(MangleOptions::default),
            compress: Some(CompressOptions::default()),
        };
        let minified = Minifier::new(options).minify(&allocator, &mut program);

        let codegen_options = CodegenOptions {
            source_map_path: map.map(|_| PathBuf::from(INTERMEDIATE_SOURCE)),
            ..CodegenOptions::minify()
        };
        let printed = Codegen::new()
            .with_options(codegen_options)
            .with_scoping(minified.scoping)
            .build(&program);

        if printed.code.trim().is_empty() {
            return Err(TransformError(
                "minifier produced empty output".to_string(),
            ));
        }

        let composed = match (map, printed.map) {
            (Some(inner), Some(outer)) => Some(compose(&outer, inner)),
            (Some(_), None) => {
                return Err(TransformError(
                    "minifier did not produce a source map".to_string(),
                ));
            }
            (None, _) => None,
        };

        tracing::debug!(
            transform = self.name(),
            before = code.len(),
            after = printed.code.len(),
            "minified"
        );

        Ok((printed.code, composed))
    }
}
