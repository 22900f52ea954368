//! Provenance banner for production bundles.
//!
//! The banner is derived once per build from project metadata and shared by
//! every target that asks for it. It is always exactly one line:
//!
//! ```text
//! // {homepage} v{version} Copyright {year} {author}
//! ```

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Project metadata the pipeline treats as given input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Package name; also the UMD global and the default file name stem.
    pub name: String,
    pub homepage: String,
    pub version: String,
    /// Raw author string, possibly `Name <email> (url)`.
    pub author: String,
}

/// Header comment identifying origin, version and copyright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceBanner {
    pub homepage: String,
    pub version: String,
    pub author_name: String,
    pub year: i32,
}

impl ProvenanceBanner {
    /// Build a banner for an explicit year.
    pub fn new(metadata: &ProjectMetadata, year: i32) -> Self {
        Self {
            homepage: single_line(&metadata.homepage),
            version: single_line(&metadata.version),
            author_name: single_line(author_name(&metadata.author)),
            year,
        }
    }

    /// Build a banner stamped with the current UTC year.
    pub fn for_current_year(metadata: &ProjectMetadata) -> Self {
        Self::new(metadata, Utc::now().year())
    }

    /// Render the banner line (without a trailing newline).
    ///
    /// ```
    /// use kiln_bundler::{ProjectMetadata, ProvenanceBanner};
    ///
    /// let metadata = ProjectMetadata {
    ///     name: "mbd-wasm".into(),
    ///     homepage: "https://example.com/mbd".into(),
    ///     version: "0.1.0".into(),
    ///     author: "Jane Doe <jane@example.com>".into(),
    /// };
    /// assert_eq!(
    ///     ProvenanceBanner::new(&metadata, 2024).render(),
    ///     "// https://example.com/mbd v0.1.0 Copyright 2024 Jane Doe"
    /// );
    /// ```
    pub fn render(&self) -> String {
        format!(
            "// {} v{} Copyright {} {}",
            self.homepage, self.version, self.year, self.author_name
        )
    }
}

impl std::fmt::Display for ProvenanceBanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Reduce an npm/cargo style author (`Name <email> (url)`) to its name.
pub fn author_name(raw: &str) -> &str {
    let end = raw.find(['<', '(']).unwrap_or(raw.len());
    raw[..end].trim()
}

// A line comment ends at the first line break.
fn single_line(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}') { ' ' } else { c })
        .collect()
}
