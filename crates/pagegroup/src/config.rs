//! Grouping configuration.
//!
//! One immutable value, built once at startup and threaded explicitly into
//! the line builder, block builder, and region labeler. The full snapshot is
//! embedded in the artifact meta so every output records the parameters that
//! produced it.

use crate::error::{GroupingError, Result};
use serde::{Deserialize, Serialize};

/// Deterministic grouping parameters.
///
/// Confidence is used only as a threshold, never as a weight. The derived
/// per-page thresholds scale with the median token height:
///
/// - `line_y_threshold = max(min_line_y_tol_px, round(median_height * line_y_center_k))`
/// - `block_y_gap_threshold = max(min_block_gap_px, round(median_height * block_y_gap_k))`
///
/// Both thresholds are inclusive: a distance or gap exactly at the threshold
/// admits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingConfig {
    /// Tokens with confidence strictly below this are dropped. Tokens with
    /// absent confidence are always retained.
    pub confidence_floor: f64,
    /// Retain tokens whose text is entirely Unicode whitespace.
    pub keep_whitespace_tokens: bool,
    /// Swap inverted bbox endpoints instead of treating them as invalid.
    pub bbox_repair: bool,
    /// Minimum vertical overlap ratio for a token to join an open line,
    /// measured against the shorter of the two heights.
    pub line_y_overlap_threshold: f64,
    /// Line center tolerance as a multiple of median token height.
    pub line_y_center_k: f64,
    /// Floor for the line center tolerance, in pixels.
    pub min_line_y_tol_px: i64,
    /// Block gap threshold as a multiple of median token height.
    pub block_y_gap_k: f64,
    /// Floor for the block gap threshold, in pixels.
    pub min_block_gap_px: i64,
    /// Minimum horizontal overlap ratio for a line to extend the open block,
    /// measured against the narrower of the two widths.
    pub block_x_overlap_threshold: f64,
    /// Minimum block area as a fraction of the page image area for a
    /// TITLE_BLOCK candidate. Zero admits any bottom-right-quadrant block.
    pub region_min_area_fraction: f64,
    /// Skip the region labeler; the `regions` key is then absent per page.
    pub disable_regions: bool,
    /// Reserved; no geometry rules emit cell candidates yet.
    pub enable_cell_candidates: bool,
    /// Omit the joined `text` field from lines and blocks.
    pub omit_text_fields: bool,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 0.0,
            keep_whitespace_tokens: false,
            bbox_repair: true,
            line_y_overlap_threshold: 0.5,
            line_y_center_k: 0.7,
            min_line_y_tol_px: 2,
            block_y_gap_k: 1.5,
            min_block_gap_px: 2,
            block_x_overlap_threshold: 0.1,
            region_min_area_fraction: 0.0,
            disable_regions: false,
            enable_cell_candidates: false,
            omit_text_fields: false,
        }
    }
}

impl GroupingConfig {
    /// Validate ranges. Runs before any I/O; violations are `ConfigInvalid`.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(GroupingError::config_invalid(format!(
                "confidence_floor must be within [0, 1], got {}",
                self.confidence_floor
            )));
        }
        if !(0.0..=1.0).contains(&self.line_y_overlap_threshold) {
            return Err(GroupingError::config_invalid(format!(
                "line_y_overlap_threshold must be within [0, 1], got {}",
                self.line_y_overlap_threshold
            )));
        }
        if !(self.line_y_center_k > 0.0 && self.line_y_center_k.is_finite()) {
            return Err(GroupingError::config_invalid(format!(
                "line_y_center_k must be > 0, got {}",
                self.line_y_center_k
            )));
        }
        if !(self.block_y_gap_k >= 0.0 && self.block_y_gap_k.is_finite()) {
            return Err(GroupingError::config_invalid(format!(
                "block_y_gap_k must be >= 0, got {}",
                self.block_y_gap_k
            )));
        }
        if !(0.0..=1.0).contains(&self.block_x_overlap_threshold) {
            return Err(GroupingError::config_invalid(format!(
                "block_x_overlap_threshold must be within [0, 1], got {}",
                self.block_x_overlap_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.region_min_area_fraction) {
            return Err(GroupingError::config_invalid(format!(
                "region_min_area_fraction must be within [0, 1], got {}",
                self.region_min_area_fraction
            )));
        }
        if self.min_line_y_tol_px < 0 {
            return Err(GroupingError::config_invalid(format!(
                "min_line_y_tol_px must be >= 0, got {}",
                self.min_line_y_tol_px
            )));
        }
        if self.min_block_gap_px < 0 {
            return Err(GroupingError::config_invalid(format!(
                "min_block_gap_px must be >= 0, got {}",
                self.min_block_gap_px
            )));
        }
        Ok(())
    }

    /// Line center tolerance for a page, in pixels.
    pub(crate) fn line_y_threshold(&self, median_token_height: f64) -> i64 {
        let scaled = (median_token_height * self.line_y_center_k).round() as i64;
        scaled.max(self.min_line_y_tol_px)
    }

    /// Block vertical gap threshold for a page, in pixels.
    pub(crate) fn block_y_gap_threshold(&self, median_token_height: f64) -> i64 {
        let scaled = (median_token_height * self.block_y_gap_k).round() as i64;
        scaled.max(self.min_block_gap_px)
    }
}
