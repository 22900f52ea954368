//! Stage chain with execution phases.
//!
//! Stages are organized by phase so that a target's chain always runs binary
//! integration first, then minification, then the banner, regardless of the
//! order in which they were added.

use std::sync::Arc;

use super::{Chunk, StageContext};
use crate::Result;

/// Stage execution phases
///
/// Stages are executed in phase order (lower numbers first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StagePhase {
    /// Binary integration (always first)
    ///
    /// Wraps the glue into a module and wires the binary payload in.
    Binary = 0,

    /// Size reduction
    ///
    /// Runs on complete modules only; never sees the banner.
    Minify = 20,

    /// Provenance banner
    ///
    /// Prepends an unmapped first line. Runs last so no later stage can
    /// move or strip it.
    Banner = 30,
}

/// One step of a target's chain.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn phase(&self) -> StagePhase;

    fn apply(&self, chunk: Chunk, ctx: &StageContext<'_>) -> Result<Chunk>;
}

/// Ordered stages for one target
#[derive(Default, Clone)]
pub struct PluginChain {
    stages: Vec<Arc<dyn Stage>>,
}

impl PluginChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stage to the chain
    ///
    /// Sorting happens once in [`PluginChain::run`].
    pub fn add<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Add an already shared stage
    pub fn add_shared(&mut self, stage: Arc<dyn Stage>) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// Stage names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.ordered().iter().map(|s| s.name()).collect()
    }

    /// Run every stage in phase order, starting from `chunk`.
    ///
    /// The first failing stage aborts the chain.
    pub fn run(&self, chunk: Chunk, ctx: &StageContext<'_>) -> Result<Chunk> {
        let mut chunk = chunk;
        for stage in self.ordered() {
            tracing::debug!(stage = stage.name(), target = %ctx.target.id, "running stage");
            chunk = stage.apply(chunk, ctx)?;
        }
        Ok(chunk)
    }

    fn ordered(&self) -> Vec<&Arc<dyn Stage>> {
        let mut stages: Vec<_> = self.stages.iter().collect();
        // stable: equal phases keep insertion order
        stages.sort_by_key(|s| s.phase());
        stages
    }

    /// Get the number of stages in the chain
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl std::fmt::Debug for PluginChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
