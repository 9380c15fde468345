//! Cell candidate detection (reserved).
//!
//! The artifact key is always present and always an array. When the feature
//! is enabled, candidates must come from geometry only (token alignment
//! columns, row stripes, or drawn box boundaries surfaced by OCR); no rule
//! meets that bar yet, so nothing is emitted either way.

use crate::artifact::grouping::{CellCandidate, Line};
use crate::config::GroupingConfig;

pub(crate) fn build_cell_candidates(
    _page_num: u32,
    _lines: &[Line],
    _config: &GroupingConfig,
) -> Vec<CellCandidate> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_candidates_emitted() {
        let config = GroupingConfig {
            enable_cell_candidates: true,
            ..Default::default()
        };
        assert!(build_cell_candidates(1, &[], &config).is_empty());
    }
}
