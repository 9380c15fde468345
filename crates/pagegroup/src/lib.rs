//! Pagegroup - Deterministic Structural Grouping for OCR Artifacts
//!
//! Pagegroup consumes a Stage 1 OCR artifact (tokens with pixel geometry and
//! confidence) and emits a grouping artifact: lines, blocks, and optional
//! geometry-only regions, with stable identifiers and a full audit trail.
//! It never inspects pixels and never interprets text; every decision is a
//! function of token geometry and the immutable [`GroupingConfig`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pagegroup::{run_to_path, GroupingConfig};
//! use std::path::Path;
//!
//! # fn main() -> pagegroup::Result<()> {
//! let config = GroupingConfig::default();
//! let summary = run_to_path(
//!     Path::new("artifacts/doc_abc.ocr.json"),
//!     Path::new("artifacts/doc_abc.group.json"),
//!     &config,
//! )?;
//! println!("grouped {} pages into {} lines", summary.n_pages, summary.n_lines);
//! # Ok(())
//! # }
//! ```
//!
//! # Guarantees
//!
//! - **Determinism**: identical input and configuration produce byte-identical
//!   output, independent of Stage 1 token order and of page-level parallelism.
//! - **No fabrication**: every emitted ID resolves back to input tokens; tokens
//!   dropped during sanitization are enumerated in `meta.dropped_tokens` and
//!   appear nowhere else.
//! - **Atomic output**: the artifact is written to a temporary sibling and
//!   renamed into place; failures leave no partial file behind.

#![deny(unsafe_code)]

pub mod artifact;
pub mod config;
pub mod error;
pub mod geometry;
pub mod group;
mod invariants;

pub use artifact::grouping::{
    Block, CellCandidate, DocCounts, DropReason, DroppedToken, GroupedPage, GroupingArtifact,
    GroupingMeta, Line, MetaNotes, PageStats, Region, RegionLabel, Warning, GROUPING_VERSION,
};
pub use artifact::ocr::{OcrArtifact, OcrPage, OcrToken};
pub use config::GroupingConfig;
pub use error::{GroupingError, Result};
pub use geometry::BBox;
pub use group::group_document;

use std::path::Path;

/// Outcome of a successful [`run_to_path`], suitable for a one-line report.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub doc_id: String,
    pub n_pages: usize,
    pub n_lines: u64,
    pub n_blocks: u64,
    pub n_dropped_tokens: usize,
}

/// Read an OCR artifact, group it, and write the grouping artifact.
///
/// This is the whole job of the CLI. Configuration is validated before any
/// I/O happens; on any error nothing is written to `output`.
pub fn run_to_path(input: &Path, output: &Path, config: &GroupingConfig) -> Result<RunSummary> {
    config.validate()?;

    let ocr = artifact::io::read_ocr_artifact(input)?;
    let grouped = group_document(&ocr, config)?;
    artifact::io::write_grouping_artifact(&grouped, output)?;

    Ok(RunSummary {
        doc_id: grouped.doc_id.clone(),
        n_pages: grouped.pages.len(),
        n_lines: grouped.meta.counts.n_lines,
        n_blocks: grouped.meta.counts.n_blocks,
        n_dropped_tokens: grouped.meta.dropped_tokens.len(),
    })
}
