use std::path::PathBuf;

use serde::Serialize;

use crate::Error;
use crate::target::OutputFormat;

/// Files written for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputArtifact {
    pub target_id: String,
    pub format: OutputFormat,
    pub code_file: PathBuf,
    pub sourcemap_file: Option<PathBuf>,
    /// Companion binary, for external targets whose artifact existed.
    pub binary_file: Option<PathBuf>,
    /// Bytes of generated code, including banner and map reference.
    pub code_size: usize,
}

/// Outcome of every target, in declaration order.
#[derive(Debug, Default)]
pub struct BuildReport {
    outcomes: Vec<(String, Result<OutputArtifact, Error>)>,
}

impl BuildReport {
    pub(crate) fn new(outcomes: Vec<(String, Result<OutputArtifact, Error>)>) -> Self {
        Self { outcomes }
    }

    /// `(target id, outcome)` pairs in declaration order.
    pub fn outcomes(&self) -> impl Iterator<Item = (&str, Result<&OutputArtifact, &Error>)> {
        self.outcomes
            .iter()
            .map(|(id, outcome)| (id.as_str(), outcome.as_ref()))
    }

    /// Successfully written targets.
    pub fn artifacts(&self) -> impl Iterator<Item = &OutputArtifact> {
        self.outcomes.iter().filter_map(|(_, o)| o.as_ref().ok())
    }

    /// Failed targets with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.outcomes
            .iter()
            .filter_map(|(id, o)| o.as_ref().err().map(|e| (id.as_str(), e)))
    }

    /// Outcome of a single target.
    pub fn get(&self, id: &str) -> Option<Result<&OutputArtifact, &Error>> {
        self.outcomes
            .iter()
            .find(|(target, _)| target == id)
            .map(|(_, outcome)| outcome.as_ref())
    }

    /// True only if every target succeeded.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|(_, o)| o.is_ok())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn into_outcomes(self) -> Vec<(String, Result<OutputArtifact, Error>)> {
        self.outcomes
    }
}
