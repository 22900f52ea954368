//! Module wrappers around the glue script.
//!
//! The glue produced by the binding generator is a classic script that declares
//! an init function taking the raw module bytes. This module validates that
//! contract ([`EntryPoint`]) and emits the UMD / CommonJS boilerplate around it,
//! recording one source map token per non-blank glue line. Wrapper lines carry
//! no mapping.
//!
//! The glue is embedded verbatim at column zero, so a generated column on a
//! glue line is also the original column.

use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_ast::ast::Statement;
use oxc_parser::Parser;
use oxc_sourcemap::{SourceMap, SourceMapBuilder};
use oxc_span::SourceType;

use crate::target::OutputFormat;
use crate::{Error, Result};

/// Identifier of the uniform default export in every bundle.
pub const DEFAULT_EXPORT: &str = "__kiln_default";

/// A validated glue entry point, shared read-only by every target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub path: PathBuf,
    pub source: String,
    /// Top-level function that turns module bytes into the exports.
    pub init_export: String,
}

impl EntryPoint {
    /// Read and validate the glue script at `path`.
    pub fn load(path: impl AsRef<Path>, init_export: &str) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::InvalidEntry {
            path: path.to_path_buf(),
            message: format!("cannot read entry point: {}", e),
        })?;
        Self::from_source(path, source, init_export)
    }

    /// Validate in-memory glue source.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidEntry`] when the source is not a parseable classic
    /// script or does not declare `function {init_export}(...)` at top level.
    pub fn from_source(
        path: impl Into<PathBuf>,
        source: impl Into<String>,
        init_export: &str,
    ) -> Result<Self> {
        let path = path.into();
        let source = source.into();

        if !is_identifier(init_export) {
            return Err(Error::InvalidEntry {
                path,
                message: format!("'{}' is not a valid init function name", init_export),
            });
        }

        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, &source, SourceType::cjs()).parse();
        if ret.panicked || !ret.errors.is_empty() {
            let message = ret
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::InvalidEntry {
                path,
                message: format!("glue is not a valid classic script: {}", message),
            });
        }

        let declares_init = ret.program.body.iter().any(|stmt| match stmt {
            Statement::FunctionDeclaration(func) => func
                .id
                .as_ref()
                .is_some_and(|id| id.name.as_str() == init_export),
            _ => false,
        });
        if !declares_init {
            return Err(Error::InvalidEntry {
                path,
                message: format!(
                    "glue does not declare a top-level function '{}'",
                    init_export
                ),
            });
        }

        Ok(Self {
            path,
            source,
            init_export: init_export.to_string(),
        })
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Render `value` as a double-quoted JavaScript string literal.
pub(crate) fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Everything [`wrap`] needs besides the glue itself.
#[derive(Debug, Clone, Copy)]
pub struct WrapOptions<'a> {
    pub format: OutputFormat,
    /// Browser global for UMD bundles.
    pub global_name: &'a str,
    pub init_export: &'a str,
    /// Loader statements produced by the binary adapter; must define `__kiln_load`.
    pub loader: &'a str,
    /// `sources` entry of the generated map.
    pub source_name: &'a str,
    pub sourcemap: bool,
}

/// Wrap `glue` into a complete module of the requested format.
pub fn wrap(glue: &str, options: &WrapOptions<'_>) -> (String, Option<SourceMap>) {
    let mut out = Emitter::new(glue, options);

    match options.format {
        OutputFormat::Umd => {
            out.line("(function (global, factory) {");
            out.line("    typeof exports === 'object' && typeof module !== 'undefined' ? module.exports = factory() :");
            out.line("    typeof define === 'function' && define.amd ? define(factory) :");
            out.line(&format!(
                "    (global = typeof globalThis !== 'undefined' ? globalThis : global || self, global[{}] = factory());",
                js_string(options.global_name)
            ));
            out.line("})(this, (function () { 'use strict';");
            out.blank();
            out.block(options.loader);
            out.blank();
            out.glue(glue);
            out.blank();
            out.block(&default_export(options.init_export));
            out.blank();
            out.line(&format!("    return {};", DEFAULT_EXPORT));
            out.blank();
            out.line("}));");
        }
        OutputFormat::Cjs => {
            out.line("'use strict';");
            out.blank();
            out.block(options.loader);
            out.blank();
            out.glue(glue);
            out.blank();
            out.block(&default_export(options.init_export));
            out.blank();
            out.line(&format!("module.exports = {};", DEFAULT_EXPORT));
        }
    }

    out.finish()
}

/// The runtime surface shared by every format: a memoized async function that
/// loads the bytes, hands them to the glue's init function and resolves to the
/// exports. A failed load clears the cache so callers may retry.
fn default_export(init_export: &str) -> String {
    format!(
        r#"var __kiln_exports;
function {default}() {{
    if (__kiln_exports === undefined) {{
        __kiln_exports = Promise.resolve()
            .then(__kiln_load)
            .then(function (bytes) {{
                return {init}(bytes);
            }})
            .catch(function (error) {{
                __kiln_exports = undefined;
                throw error;
            }});
    }}
    return __kiln_exports;
}}
{default}.default = {default};"#,
        default = DEFAULT_EXPORT,
        init = init_export
    )
}

/// Line-oriented code writer that records glue line mappings.
struct Emitter {
    code: String,
    line: u32,
    map: Option<(SourceMapBuilder, u32)>,
}

impl Emitter {
    fn new(glue: &str, options: &WrapOptions<'_>) -> Self {
        let map = options.sourcemap.then(|| {
            let mut builder = SourceMapBuilder::default();
            let source_id = builder.add_source_and_content(options.source_name, glue);
            (builder, source_id)
        });
        Self {
            code: String::with_capacity(glue.len() + options.loader.len() + 2048),
            line: 0,
            map,
        }
    }

    fn line(&mut self, text: &str) {
        self.code.push_str(text);
        self.code.push('\n');
        self.line += 1;
    }

    fn blank(&mut self) {
        self.line("");
    }

    fn block(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line);
        }
    }

    fn glue(&mut self, glue: &str) {
        for (src_line, text) in glue.lines().enumerate() {
            let indent = text.len() - text.trim_start().len();
            if indent < text.len() {
                if let Some((builder, source_id)) = self.map.as_mut() {
                    builder.add_token(
                        self.line,
                        indent as u32,
                        src_line as u32,
                        indent as u32,
                        Some(*source_id),
                        None,
                    );
                }
            }
            self.line(text);
        }
    }

    fn finish(self) -> (String, Option<SourceMap>) {
        (
            self.code,
            self.map.map(|(builder, _)| builder.into_sourcemap()),
        )
    }
}
