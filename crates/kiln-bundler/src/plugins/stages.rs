//! Built-in stages.

use std::sync::Arc;

use super::{Chunk, Companion, Stage, StageContext, StagePhase};
use crate::binary::{BinaryAdapter, BinarySource, BinaryStrategy};
use crate::minify::Transform;
use crate::sourcemap::shift_lines;
use crate::wrapper::{WrapOptions, wrap};
use crate::{Error, Result};

/// Wraps the glue into the target's module format and wires in the binary.
///
/// Ignores the incoming chunk; the glue comes from the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryStage;

impl Stage for BinaryStage {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn phase(&self) -> StagePhase {
        StagePhase::Binary
    }

    fn apply(&self, _chunk: Chunk, ctx: &StageContext<'_>) -> Result<Chunk> {
        let target = ctx.target;
        let adapter = BinaryAdapter::new(ctx.artifact, BinaryStrategy::for_target(target));
        let source = adapter.resolve(target)?;
        let loader = source.loader(target.format);

        let (code, map) = wrap(
            &ctx.entry.source,
            &WrapOptions {
                format: target.format,
                global_name: ctx.global_name,
                init_export: &ctx.entry.init_export,
                loader: &loader,
                source_name: ctx.source_name,
                sourcemap: target.sourcemap,
            },
        );

        let companion = match source {
            BinarySource::External {
                path,
                bytes: Some(bytes),
                ..
            } => Some(Companion { path, bytes }),
            _ => None,
        };

        Ok(Chunk {
            code,
            map,
            companion,
        })
    }
}

/// Runs a [`Transform`] over the chunk. Failures are fatal for the target.
#[derive(Clone)]
pub struct MinifyStage(pub Arc<dyn Transform>);

impl Stage for MinifyStage {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn phase(&self) -> StagePhase {
        StagePhase::Minify
    }

    fn apply(&self, chunk: Chunk, ctx: &StageContext<'_>) -> Result<Chunk> {
        let (code, map) = self
            .0
            .transform(&chunk.code, chunk.map.as_ref())
            .map_err(|e| Error::Transform {
                target: ctx.target.id.clone(),
                message: format!("{}: {}", self.0.name(), e),
            })?;

        if ctx.target.sourcemap && map.is_none() {
            return Err(Error::SourceMap(format!(
                "transform '{}' dropped the source map of target '{}'",
                self.0.name(),
                ctx.target.id
            )));
        }

        Ok(Chunk {
            code,
            map,
            companion: chunk.companion,
        })
    }
}

/// Prepends the provenance banner as generated line 0.
#[derive(Debug, Clone)]
pub struct BannerStage(pub String);

impl Stage for BannerStage {
    fn name(&self) -> &'static str {
        "banner"
    }

    fn phase(&self) -> StagePhase {
        StagePhase::Banner
    }

    fn apply(&self, chunk: Chunk, _ctx: &StageContext<'_>) -> Result<Chunk> {
        let mut code = String::with_capacity(self.0.len() + 1 + chunk.code.len());
        code.push_str(&self.0);
        code.push('\n');
        code.push_str(&chunk.code);

        Ok(Chunk {
            code,
            map: chunk.map.as_ref().map(|map| shift_lines(map, 1)),
            companion: chunk.companion,
        })
    }
}
