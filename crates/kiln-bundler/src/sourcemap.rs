//! Source map bookkeeping between stages.
//!
//! Stages never edit maps in place; they rebuild them with
//! [`SourceMapBuilder`] so source and name tables stay consistent.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use oxc_sourcemap::{SourceMap, SourceMapBuilder, Token};
use path_clean::PathClean;

/// Copy the source table of `map` into `builder`, returning old id -> new id.
fn copy_sources(map: &SourceMap, builder: &mut SourceMapBuilder) -> Vec<u32> {
    let count = map.get_sources().count() as u32;
    (0..count)
        .map(|id| {
            let source = map
                .get_source(id)
                .map(|s| s.to_string())
                .unwrap_or_default();
            let content = map
                .get_source_content(id)
                .map(|s| s.to_string())
                .unwrap_or_default();
            builder.add_source_and_content(&source, &content)
        })
        .collect()
}

fn copy_name(map: &SourceMap, name_id: Option<u32>, builder: &mut SourceMapBuilder) -> Option<u32> {
    let name = map.get_name(name_id?)?.to_string();
    Some(builder.add_name(&name))
}

/// Move every mapping `lines` lines down, leaving the new leading lines unmapped.
///
/// Used when a preamble (the provenance banner) is prepended to generated code.
pub fn shift_lines(map: &SourceMap, lines: u32) -> SourceMap {
    let mut builder = SourceMapBuilder::default();
    let sources = copy_sources(map, &mut builder);
    for token in map.get_tokens() {
        let name_id = copy_name(map, token.get_name_id(), &mut builder);
        builder.add_token(
            token.get_dst_line() + lines,
            token.get_dst_col(),
            token.get_src_line(),
            token.get_src_col(),
            token
                .get_source_id()
                .and_then(|id| sources.get(id as usize).copied()),
            name_id,
        );
    }
    finish(builder, map)
}

/// Compose `outer` (final code -> intermediate code) with `inner`
/// (intermediate code -> original sources) into final code -> original sources.
///
/// An intermediate position resolves to the closest `inner` token on the same
/// line at or before it, offset by the column distance. Positions with no such
/// token are dropped.
pub fn compose(outer: &SourceMap, inner: &SourceMap) -> SourceMap {
    let mut lines: BTreeMap<u32, Vec<Token>> = BTreeMap::new();
    for token in inner.get_tokens() {
        lines.entry(token.get_dst_line()).or_default().push(token);
    }
    for tokens in lines.values_mut() {
        tokens.sort_by_key(|t| t.get_dst_col());
    }

    let mut builder = SourceMapBuilder::default();
    let sources = copy_sources(inner, &mut builder);

    for token in outer.get_tokens() {
        if token.get_source_id().is_none() {
            continue;
        }
        let (line, col) = (token.get_src_line(), token.get_src_col());
        let Some(original) = lines
            .get(&line)
            .and_then(|tokens| tokens.iter().rev().find(|t| t.get_dst_col() <= col))
        else {
            continue;
        };
        let Some(source_id) = original
            .get_source_id()
            .and_then(|id| sources.get(id as usize).copied())
        else {
            continue;
        };
        let name_id = copy_name(outer, token.get_name_id(), &mut builder);
        builder.add_token(
            token.get_dst_line(),
            token.get_dst_col(),
            original.get_src_line(),
            original.get_src_col() + (col - original.get_dst_col()),
            Some(source_id),
            name_id,
        );
    }
    finish(builder, inner)
}

fn finish(mut builder: SourceMapBuilder, like: &SourceMap) -> SourceMap {
    if let Some(file) = like.get_file() {
        builder.set_file(&file.to_string());
    }
    builder.into_sourcemap()
}

/// Trailing comment pointing a bundle at its map.
pub fn reference_comment(map_file_name: &str) -> String {
    format!("//# sourceMappingURL={}", map_file_name)
}

/// Path of `source` as seen from `map_dir`, with forward slashes.
///
/// Both paths are made absolute and cleaned first, so the result does not
/// depend on how they were spelled, only on where they point.
pub fn relative_source(map_dir: &Path, source: &Path) -> String {
    let from = absolute(map_dir);
    let to = absolute(source);

    let from: Vec<Component> = from.components().collect();
    let to_components: Vec<Component> = to.components().collect();
    let common = from
        .iter()
        .zip(to_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &to_components[common..] {
        relative.push(component.as_os_str());
    }

    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    joined.clean()
}
