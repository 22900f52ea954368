//! Target output: atomic writer and per-invocation report.

pub mod report;
pub mod writer;

pub use report::{BuildReport, OutputArtifact};
pub use writer::{remove_stale_outputs, write_artifact};
