//! Target pipeline orchestrator.
//!
//! One generic routine runs over the declared target table. Targets share only
//! read-only inputs (entry point, banner, stage implementations), so they run
//! in parallel by default and in declaration order on request; both produce
//! identical bytes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::banner::{ProjectMetadata, ProvenanceBanner};
use crate::minify::{OxcMinifier, Transform};
use crate::output::{BuildReport, OutputArtifact, remove_stale_outputs, write_artifact};
use crate::plugins::{BannerStage, BinaryStage, Chunk, MinifyStage, PluginChain, StageContext};
use crate::sourcemap::relative_source;
use crate::target::{BuildTarget, TargetSpec, default_targets, validate_table};
use crate::wrapper::EntryPoint;
use crate::{Error, Result};

/// Default name of the glue's init function.
pub const DEFAULT_INIT_EXPORT: &str = "init";

/// Builder and runner for one packaging invocation.
///
/// ```no_run
/// use kiln_bundler::{Pipeline, ProjectMetadata, ProvenanceBanner};
///
/// # fn main() -> kiln_bundler::Result<()> {
/// let metadata = ProjectMetadata {
///     name: "mbd-wasm".into(),
///     ..ProjectMetadata::default()
/// };
/// let report = Pipeline::new(&metadata, "pkg/mbd.js", "pkg/mbd_bg.wasm")
///     .out_dir("dist")
///     .banner(ProvenanceBanner::new(&metadata, 2024))
///     .sequential()
///     .run()?;
/// assert_eq!(report.len(), 3);
/// # Ok(()) }
/// ```
pub struct Pipeline {
    metadata: ProjectMetadata,
    entry: PathBuf,
    binary: PathBuf,
    out_dir: PathBuf,
    targets: Option<Vec<TargetSpec>>,
    init_export: String,
    banner: Option<ProvenanceBanner>,
    global_name: Option<String>,
    minifier: Arc<dyn Transform>,
    parallel: bool,
}

/// Inputs shared by every target of a run.
struct Shared<'a> {
    entry: &'a EntryPoint,
    banner: &'a str,
    global_name: &'a str,
}

impl Pipeline {
    /// A pipeline over the default target table, writing to `dist`.
    pub fn new(
        metadata: &ProjectMetadata,
        entry: impl Into<PathBuf>,
        binary: impl Into<PathBuf>,
    ) -> Self {
        Self {
            metadata: metadata.clone(),
            entry: entry.into(),
            binary: binary.into(),
            out_dir: PathBuf::from("dist"),
            targets: None,
            init_export: DEFAULT_INIT_EXPORT.to_string(),
            banner: None,
            global_name: None,
            minifier: Arc::new(OxcMinifier::default()),
            parallel: true,
        }
    }

    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Replace the default target table.
    pub fn targets(mut self, targets: Vec<TargetSpec>) -> Self {
        self.targets = Some(targets);
        self
    }

    pub fn init_export(mut self, name: impl Into<String>) -> Self {
        self.init_export = name.into();
        self
    }

    /// Use a fixed banner instead of one stamped with the current year.
    pub fn banner(mut self, banner: ProvenanceBanner) -> Self {
        self.banner = Some(banner);
        self
    }

    /// Browser global for UMD targets. Defaults to the project name.
    pub fn global_name(mut self, name: impl Into<String>) -> Self {
        self.global_name = Some(name.into());
        self
    }

    /// Swap the minification transform.
    pub fn minifier(mut self, minifier: Arc<dyn Transform>) -> Self {
        self.minifier = minifier;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn sequential(self) -> Self {
        self.parallel(false)
    }

    /// The declared table: explicit targets, or the defaults for the project name.
    pub fn target_specs(&self) -> Vec<TargetSpec> {
        self.targets
            .clone()
            .unwrap_or_else(|| default_targets(&self.metadata.name))
    }

    /// Run every target.
    ///
    /// Per-target failures are collected in the report; the other targets
    /// still run.
    ///
    /// # Errors
    ///
    /// Fails before any target runs if the table is inconsistent or the entry
    /// point is unreadable or invalid.
    pub fn run(&self) -> Result<BuildReport> {
        let specs = self.target_specs();
        validate_table(&specs)?;

        let entry = EntryPoint::load(&self.entry, &self.init_export)
            .map_err(|e| blame_all_targets(e, &specs))?;
        let banner = self
            .banner
            .clone()
            .unwrap_or_else(|| ProvenanceBanner::for_current_year(&self.metadata))
            .render();
        let global_name = self.global_name.as_deref().unwrap_or(&self.metadata.name);
        let shared = Shared {
            entry: &entry,
            banner: &banner,
            global_name,
        };

        tracing::info!(
            targets = specs.len(),
            parallel = self.parallel,
            out_dir = %self.out_dir.display(),
            "packaging"
        );

        let outcomes: Vec<_> = if self.parallel {
            specs
                .par_iter()
                .map(|spec| (spec.id.clone(), self.build_target(spec, &shared)))
                .collect()
        } else {
            specs
                .iter()
                .map(|spec| (spec.id.clone(), self.build_target(spec, &shared)))
                .collect()
        };

        Ok(BuildReport::new(outcomes))
    }

    fn build_target(&self, spec: &TargetSpec, shared: &Shared<'_>) -> Result<OutputArtifact> {
        let span = tracing::info_span!("target", id = %spec.id);
        let _guard = span.enter();

        let result = spec.resolve().and_then(|target| {
            self.execute(&target, shared).inspect_err(|_| {
                if let Err(e) = remove_stale_outputs(&self.out_dir, &target) {
                    tracing::warn!(error = %e, "could not remove previous outputs");
                }
            })
        });

        match &result {
            Ok(artifact) => tracing::info!(
                file = %artifact.code_file.display(),
                bytes = artifact.code_size,
                "target built"
            ),
            Err(e) => tracing::error!(error = %e, "target failed"),
        }
        result
    }

    fn execute(&self, target: &BuildTarget, shared: &Shared<'_>) -> Result<OutputArtifact> {
        let mut chain = PluginChain::new();
        chain.add(BinaryStage);
        if target.minify {
            chain.add(MinifyStage(Arc::clone(&self.minifier)));
        }
        if target.banner {
            chain.add(BannerStage(shared.banner.to_string()));
        }

        let source_name = self.source_name(target);
        let ctx = StageContext {
            target,
            entry: shared.entry,
            artifact: &self.binary,
            global_name: shared.global_name,
            source_name: &source_name,
        };

        let chunk = chain.run(Chunk::default(), &ctx)?;
        write_artifact(&self.out_dir, target, chunk)
    }

    /// Entry path as seen from the directory holding the target's map.
    fn source_name(&self, target: &BuildTarget) -> String {
        let map_dir = self
            .out_dir
            .join(&target.output_path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.out_dir.clone());
        relative_source(&map_dir, &self.entry)
    }
}

/// An unusable entry fails every declared target; say which ones.
fn blame_all_targets(error: Error, specs: &[TargetSpec]) -> Error {
    match error {
        Error::InvalidEntry { path, message } => {
            let ids: Vec<_> = specs.iter().map(|t| t.id.as_str()).collect();
            Error::InvalidEntry {
                path,
                message: format!("{} (targets: {})", message, ids.join(", ")),
            }
        }
        other => other,
    }
}
