//! Pre-flight validation of the OCR artifact.
//!
//! All checks run before any grouping; the first violation aborts the run
//! with a single `InputMalformed` error naming the offending element.
//! Grouping never retries and never repairs input structure (bbox endpoint
//! repair in sanitization is the one documented exception, and it operates
//! on values, not structure).

use crate::artifact::ocr::OcrArtifact;
use crate::error::{GroupingError, Result};
use std::collections::BTreeSet;

/// Validate the artifact against the Stage 1 contract.
///
/// Checks, in order:
/// - non-empty `doc_id`
/// - `page_num >= 1`, unique per document
/// - non-zero page image dimensions
/// - `token.page_num` equal to the owning page's `page_num`
/// - `token_id` unique across the whole document
/// - `confidence`, when present, within `[0, 1]` and not NaN
pub fn validate_ocr_artifact(ocr: &OcrArtifact) -> Result<()> {
    if ocr.doc_id.trim().is_empty() {
        return Err(GroupingError::input_malformed("doc_id must be non-empty"));
    }

    let mut seen_pages: BTreeSet<u32> = BTreeSet::new();
    let mut seen_tokens: BTreeSet<&str> = BTreeSet::new();

    for page in &ocr.pages {
        if page.page_num < 1 {
            return Err(GroupingError::malformed_page(
                "page_num must be >= 1",
                page.page_num,
            ));
        }
        if !seen_pages.insert(page.page_num) {
            return Err(GroupingError::malformed_page(
                format!("duplicate page_num {}", page.page_num),
                page.page_num,
            ));
        }
        if page.image_width == 0 || page.image_height == 0 {
            return Err(GroupingError::malformed_page(
                format!(
                    "page {} has zero image dimensions ({}x{})",
                    page.page_num, page.image_width, page.image_height
                ),
                page.page_num,
            ));
        }

        for token in &page.tokens {
            if token.page_num != page.page_num {
                return Err(GroupingError::malformed_token(
                    format!(
                        "token '{}' carries page_num {} but lives on page {}",
                        token.token_id, token.page_num, page.page_num
                    ),
                    &token.token_id,
                    page.page_num,
                ));
            }
            if !seen_tokens.insert(token.token_id.as_str()) {
                return Err(GroupingError::malformed_token(
                    format!("duplicate token_id '{}'", token.token_id),
                    &token.token_id,
                    page.page_num,
                ));
            }
            if let Some(confidence) = token.confidence {
                if !(0.0..=1.0).contains(&confidence) {
                    return Err(GroupingError::malformed_token(
                        format!(
                            "token '{}' confidence {} outside [0, 1]",
                            token.token_id, confidence
                        ),
                        &token.token_id,
                        page.page_num,
                    ));
                }
            }
        }
    }

    Ok(())
}
