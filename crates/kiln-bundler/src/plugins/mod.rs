//! Stage system for kiln-bundler.
//!
//! This module provides the per-target transform chain, including:
//! - Stage trait and phase-ordered chain
//! - Built-in stages (binary integration, minification, provenance banner)

pub mod chain;
pub mod stages;

use std::path::{Path, PathBuf};

use oxc_sourcemap::SourceMap;

use crate::target::BuildTarget;
use crate::wrapper::EntryPoint;

pub use chain::{PluginChain, Stage, StagePhase};
pub use stages::{BannerStage, BinaryStage, MinifyStage};

/// A file shipped next to the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Companion {
    /// Relative to the output directory.
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// The value flowing between stages.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    pub code: String,
    pub map: Option<SourceMap>,
    pub companion: Option<Companion>,
}

/// Read-only inputs every stage of a target can see.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub target: &'a BuildTarget,
    pub entry: &'a EntryPoint,
    /// The compiled binary artifact.
    pub artifact: &'a Path,
    /// Browser global for UMD bundles.
    pub global_name: &'a str,
    /// `sources` entry written into maps.
    pub source_name: &'a str,
}
