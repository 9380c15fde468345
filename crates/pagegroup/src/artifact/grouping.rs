//! Output contract: the grouping artifact.
//!
//! Identifier formats are bit-exact:
//! `p{page:03}_l{index:06}`, `p{page:03}_b{index:06}`, `p{page:03}_r{index:06}`.
//! Indices are assigned in emission order (post-sort), starting at 0 per page.

use crate::config::GroupingConfig;
use crate::geometry::BBox;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version tag carried in `meta.grouping_version`.
pub const GROUPING_VERSION: &str = "lines_blocks_v1";

pub fn line_id(page_num: u32, index: usize) -> String {
    format!("p{page_num:03}_l{index:06}")
}

pub fn block_id(page_num: u32, index: usize) -> String {
    format!("p{page_num:03}_b{index:06}")
}

pub fn region_id(page_num: u32, index: usize) -> String {
    format!("p{page_num:03}_r{index:06}")
}

pub fn cell_id(page_num: u32, index: usize) -> String {
    format!("p{page_num:03}_c{index:06}")
}

/// Tokens sharing a horizontal band, in left-to-right reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub line_id: String,
    pub page_num: u32,
    /// Ordered by `(x0, y0, token_id)`.
    pub token_ids: Vec<String>,
    pub line_bbox: BBox,
    /// Member token texts joined with single spaces; absent under
    /// `omit_text_fields`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Vertically contiguous lines with compatible horizontal extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub block_id: String,
    pub page_num: u32,
    /// In line reading order; never resorted after line assignment.
    pub line_ids: Vec<String>,
    pub block_bbox: BBox,
    /// Member line texts joined with newlines; absent under
    /// `omit_text_fields`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Structural tag for a region. Derived from geometry only; the labeler
/// never inspects token text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegionLabel {
    #[serde(rename = "TITLE_BLOCK")]
    TitleBlock,
    #[serde(rename = "TABLE_LIKE")]
    TableLike,
    #[serde(rename = "NOTE")]
    Note,
    #[serde(rename = "ANNOTATION")]
    Annotation,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

/// Coarse geometry-only grouping of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub region_id: String,
    pub page_num: u32,
    pub label: RegionLabel,
    /// Ascending block_id order.
    pub block_ids: Vec<String>,
    pub region_bbox: BBox,
}

/// Reserved table-cell candidate; no geometry rules emit these yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellCandidate {
    pub cell_id: String,
    pub page_num: u32,
    pub bbox: BBox,
    pub token_ids: Vec<String>,
    /// Conservative deterministic score; never a probabilistic weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// One page of grouping output.
///
/// `regions` is absent (not `null`, not `[]`) when the labeler is disabled.
/// `cell_candidates` is always present and always an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedPage {
    pub page_num: u32,
    pub lines: Vec<Line>,
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<Region>>,
    #[serde(default)]
    pub cell_candidates: Vec<CellCandidate>,
}

/// Why a token was excluded from grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    ZeroArea,
    Whitespace,
    BelowConfidenceFloor,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroArea => "zero_area",
            Self::Whitespace => "whitespace",
            Self::BelowConfidenceFloor => "below_confidence_floor",
        }
    }
}

/// Ledger entry for a dropped token. Dropped tokens appear nowhere else in
/// the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedToken {
    pub token_id: String,
    pub reason: DropReason,
}

/// Non-fatal event recorded in `meta.warnings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub code: String,
    pub message: String,
    pub token_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_bbox: Option<BBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repaired_bbox: Option<BBox>,
}

/// Warning code for swapped bbox endpoints normalized during sanitization.
pub const WARN_REPAIRED_SWAPPED: &str = "repaired_swapped";

impl Warning {
    pub fn repaired_swapped(token_id: &str, original: BBox, repaired: BBox) -> Self {
        Self {
            code: WARN_REPAIRED_SWAPPED.to_string(),
            message: "token bbox endpoints were swapped to enforce x0<=x1 and y0<=y1".to_string(),
            token_id: token_id.to_string(),
            original_bbox: Some(original),
            repaired_bbox: Some(repaired),
        }
    }
}

/// Document-level totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocCounts {
    pub n_tokens_in: u64,
    pub n_tokens_retained: u64,
    pub n_lines: u64,
    pub n_blocks: u64,
    pub n_regions: u64,
}

/// Per-page counts and derived thresholds, keyed `page_{num:03}` in meta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageStats {
    pub tokens_in: u64,
    pub tokens_retained: u64,
    pub lines: u64,
    pub blocks: u64,
    pub regions: u64,
    pub median_token_height_px: f64,
    pub line_y_threshold_px: i64,
    pub block_y_gap_threshold_px: i64,
}

/// Definitions that have drifted between documents historically; pinned here
/// so consumers never have to guess which reading produced the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaNotes {
    /// Denominator of the line y-overlap ratio.
    pub line_y_overlap_denominator: String,
    /// Quadrant test used by the TITLE_BLOCK candidate rule.
    pub region_quadrant: String,
}

impl Default for MetaNotes {
    fn default() -> Self {
        Self {
            line_y_overlap_denominator: "min_height".to_string(),
            region_quadrant: "x0>=W/2,y0>=H/2".to_string(),
        }
    }
}

/// Audit-oriented meta section, one per artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingMeta {
    pub grouping_version: String,
    /// The configuration exactly as applied.
    pub config: GroupingConfig,
    pub counts: DocCounts,
    pub pages: BTreeMap<String, PageStats>,
    /// Sorted by `(token_id, reason)`, independent of input order.
    pub dropped_tokens: Vec<DroppedToken>,
    /// Sorted by `(code, token_id)`, independent of input order.
    pub warnings: Vec<Warning>,
    pub notes: MetaNotes,
}

/// The grouping artifact: the sole output of this stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingArtifact {
    pub doc_id: String,
    pub pages: Vec<GroupedPage>,
    pub meta: GroupingMeta,
}
