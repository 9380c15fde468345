//! Token intake and sanitization.
//!
//! Operations run per token in a fixed order: bbox repair (and zero-area
//! drop), whitespace filter, confidence floor. The order also fixes which
//! reason wins when several apply. Every output of this module is sorted by
//! data-content keys, so the result is independent of Stage 1 token order.

use crate::artifact::grouping::{DropReason, DroppedToken, Warning};
use crate::artifact::ocr::OcrToken;
use crate::config::GroupingConfig;

pub(crate) struct SanitizeOutcome {
    /// Surviving tokens with repaired bboxes, sorted by `token_id`.
    pub retained: Vec<OcrToken>,
    pub dropped: Vec<DroppedToken>,
    pub warnings: Vec<Warning>,
}

pub(crate) fn sanitize_page_tokens(
    tokens: &[OcrToken],
    config: &GroupingConfig,
) -> SanitizeOutcome {
    let mut retained = Vec::with_capacity(tokens.len());
    let mut dropped = Vec::new();
    let mut warnings = Vec::new();

    for token in tokens {
        let mut bbox = token.bbox;
        if config.bbox_repair {
            let (fixed, swapped) = bbox.repaired();
            if swapped {
                warnings.push(Warning::repaired_swapped(&token.token_id, bbox, fixed));
            }
            bbox = fixed;
        }
        if bbox.area() == 0 {
            dropped.push(DroppedToken {
                token_id: token.token_id.clone(),
                reason: DropReason::ZeroArea,
            });
            continue;
        }

        if !config.keep_whitespace_tokens && token.text.chars().all(char::is_whitespace) {
            dropped.push(DroppedToken {
                token_id: token.token_id.clone(),
                reason: DropReason::Whitespace,
            });
            continue;
        }

        if let Some(confidence) = token.confidence {
            if confidence < config.confidence_floor {
                dropped.push(DroppedToken {
                    token_id: token.token_id.clone(),
                    reason: DropReason::BelowConfidenceFloor,
                });
                continue;
            }
        }

        retained.push(OcrToken {
            bbox,
            ..token.clone()
        });
    }

    retained.sort_by(|a, b| a.token_id.cmp(&b.token_id));
    dropped.sort_by(|a, b| (&a.token_id, a.reason).cmp(&(&b.token_id, b.reason)));
    warnings.sort_by(|a, b| (&a.code, &a.token_id).cmp(&(&b.code, &b.token_id)));

    SanitizeOutcome {
        retained,
        dropped,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;

    fn token(id: &str, text: &str, bbox: BBox, confidence: Option<f64>) -> OcrToken {
        OcrToken {
            token_id: id.to_string(),
            page_num: 1,
            text: text.to_string(),
            bbox,
            confidence,
            raw_confidence: None,
        }
    }

    #[test]
    fn test_whitespace_token_dropped() {
        let tokens = vec![token("t1", "   ", BBox::new(0, 0, 10, 10), Some(0.9))];
        let out = sanitize_page_tokens(&tokens, &GroupingConfig::default());
        assert!(out.retained.is_empty());
        assert_eq!(out.dropped[0].reason, DropReason::Whitespace);
    }

    #[test]
    fn test_empty_text_counts_as_whitespace() {
        let tokens = vec![token("t1", "", BBox::new(0, 0, 10, 10), None)];
        let out = sanitize_page_tokens(&tokens, &GroupingConfig::default());
        assert_eq!(out.dropped[0].reason, DropReason::Whitespace);
    }

    #[test]
    fn test_keep_whitespace_tokens_flag() {
        let tokens = vec![token("t1", "   ", BBox::new(0, 0, 10, 10), Some(0.9))];
        let config = GroupingConfig {
            keep_whitespace_tokens: true,
            ..Default::default()
        };
        let out = sanitize_page_tokens(&tokens, &config);
        assert_eq!(out.retained.len(), 1);
    }

    #[test]
    fn test_inverted_bbox_repaired_and_kept() {
        let tokens = vec![token("t1", "A", BBox::new(30, 20, 10, 15), Some(0.9))];
        let out = sanitize_page_tokens(&tokens, &GroupingConfig::default());
        assert_eq!(out.retained.len(), 1);
        assert_eq!(out.retained[0].bbox, BBox::new(10, 15, 30, 20));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, "repaired_swapped");
        assert_eq!(out.warnings[0].token_id, "t1");
    }

    #[test]
    fn test_zero_area_dropped_after_repair() {
        let tokens = vec![token("t1", "A", BBox::new(1, 1, 1, 5), Some(0.9))];
        let out = sanitize_page_tokens(&tokens, &GroupingConfig::default());
        assert!(out.retained.is_empty());
        assert_eq!(out.dropped[0].reason, DropReason::ZeroArea);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_zero_area_beats_whitespace() {
        // Fixed operation order: the zero-area check runs first, so a
        // degenerate whitespace token is ledgered as zero_area.
        let tokens = vec![token("t1", "  ", BBox::new(1, 1, 1, 1), Some(0.9))];
        let out = sanitize_page_tokens(&tokens, &GroupingConfig::default());
        assert_eq!(out.dropped[0].reason, DropReason::ZeroArea);
    }

    #[test]
    fn test_confidence_floor_is_strict() {
        let config = GroupingConfig {
            confidence_floor: 0.5,
            ..Default::default()
        };
        let tokens = vec![
            token("t1", "A", BBox::new(0, 0, 10, 10), Some(0.5)),
            token("t2", "B", BBox::new(0, 20, 10, 30), Some(0.49)),
            token("t3", "C", BBox::new(0, 40, 10, 50), None),
        ];
        let out = sanitize_page_tokens(&tokens, &config);
        let kept: Vec<&str> = out.retained.iter().map(|t| t.token_id.as_str()).collect();
        assert_eq!(kept, ["t1", "t3"]);
        assert_eq!(out.dropped[0].token_id, "t2");
        assert_eq!(out.dropped[0].reason, DropReason::BelowConfidenceFloor);
    }

    #[test]
    fn test_bbox_repair_disabled_drops_inverted_as_zero_area() {
        let config = GroupingConfig {
            bbox_repair: false,
            ..Default::default()
        };
        let tokens = vec![token("t1", "A", BBox::new(30, 20, 10, 15), Some(0.9))];
        let out = sanitize_page_tokens(&tokens, &config);
        assert!(out.retained.is_empty());
        assert_eq!(out.dropped[0].reason, DropReason::ZeroArea);
    }

    #[test]
    fn test_outcome_independent_of_input_order() {
        let a = token("t1", "A", BBox::new(30, 20, 10, 15), Some(0.9));
        let b = token("t2", "  ", BBox::new(0, 0, 10, 10), Some(0.9));
        let c = token("t3", "C", BBox::new(0, 20, 10, 30), Some(0.1));
        let config = GroupingConfig {
            confidence_floor: 0.5,
            ..Default::default()
        };

        let fwd = sanitize_page_tokens(&[a.clone(), b.clone(), c.clone()], &config);
        let rev = sanitize_page_tokens(&[c, b, a], &config);

        assert_eq!(fwd.retained, rev.retained);
        assert_eq!(fwd.dropped, rev.dropped);
        assert_eq!(fwd.warnings, rev.warnings);
    }
}
