//! The grouping core: per-page orchestration and document assembly.
//!
//! Pages are fully independent, so they are grouped in parallel; the merge
//! into the document artifact happens in strict `page_num` order and every
//! accumulated meta list is re-sorted by data-content keys, so the output
//! is byte-identical to a sequential run.

mod blocks;
mod cells;
mod lines;
mod regions;
mod sanitize;

use crate::artifact::grouping::{
    DocCounts, DroppedToken, GroupedPage, GroupingArtifact, GroupingMeta, MetaNotes, PageStats,
    Warning, GROUPING_VERSION,
};
use crate::artifact::ocr::{OcrArtifact, OcrPage, OcrToken};
use crate::artifact::validate::validate_ocr_artifact;
use crate::config::GroupingConfig;
use crate::error::Result;
use crate::invariants;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

struct PageOutcome {
    page: GroupedPage,
    stats: PageStats,
    dropped: Vec<DroppedToken>,
    warnings: Vec<Warning>,
    /// Sanitized tokens, kept for the post-build audit only.
    retained: Vec<OcrToken>,
}

/// Group a validated-or-not OCR artifact into a grouping artifact.
///
/// Validates configuration and input, groups every page, assembles the meta
/// section, and runs the invariant audit before returning.
///
/// # Errors
///
/// - `ConfigInvalid` for out-of-range configuration
/// - `InputMalformed` for contract violations in the OCR artifact
/// - `InternalInvariantViolated` if the audit finds a structural bug
pub fn group_document(ocr: &OcrArtifact, config: &GroupingConfig) -> Result<GroupingArtifact> {
    config.validate()?;
    validate_ocr_artifact(ocr)?;

    let mut ocr_pages: Vec<&OcrPage> = ocr.pages.iter().collect();
    ocr_pages.sort_by_key(|p| p.page_num);

    let outcomes: Vec<PageOutcome> = ocr_pages
        .par_iter()
        .map(|page| group_page(page, config))
        .collect();

    let mut counts = DocCounts::default();
    let mut page_stats: BTreeMap<String, PageStats> = BTreeMap::new();
    let mut dropped_tokens: Vec<DroppedToken> = Vec::new();
    let mut warnings: Vec<Warning> = Vec::new();
    let mut pages: Vec<GroupedPage> = Vec::with_capacity(outcomes.len());
    let mut retained_by_page: BTreeMap<u32, Vec<OcrToken>> = BTreeMap::new();

    for outcome in outcomes {
        counts.n_tokens_in += outcome.stats.tokens_in;
        counts.n_tokens_retained += outcome.stats.tokens_retained;
        counts.n_lines += outcome.stats.lines;
        counts.n_blocks += outcome.stats.blocks;
        counts.n_regions += outcome.stats.regions;

        page_stats.insert(
            format!("page_{:03}", outcome.page.page_num),
            outcome.stats,
        );
        dropped_tokens.extend(outcome.dropped);
        warnings.extend(outcome.warnings);
        retained_by_page.insert(outcome.page.page_num, outcome.retained);
        pages.push(outcome.page);
    }

    // Page order already fixes these, but the contract is order-independence
    // of the ledgers themselves.
    dropped_tokens.sort_by(|a, b| (&a.token_id, a.reason).cmp(&(&b.token_id, b.reason)));
    warnings.sort_by(|a, b| (&a.code, &a.token_id).cmp(&(&b.code, &b.token_id)));

    let artifact = GroupingArtifact {
        doc_id: ocr.doc_id.clone(),
        pages,
        meta: GroupingMeta {
            grouping_version: GROUPING_VERSION.to_string(),
            config: config.clone(),
            counts,
            pages: page_stats,
            dropped_tokens,
            warnings,
            notes: MetaNotes::default(),
        },
    };

    invariants::audit_artifact(&artifact, &retained_by_page)?;
    Ok(artifact)
}

fn group_page(page: &OcrPage, config: &GroupingConfig) -> PageOutcome {
    let sanitized = sanitize::sanitize_page_tokens(&page.tokens, config);

    let median_height = median_token_height(&sanitized.retained);
    let line_y_threshold = config.line_y_threshold(median_height);
    let block_y_gap_threshold = config.block_y_gap_threshold(median_height);

    let lines = lines::build_lines(page.page_num, &sanitized.retained, line_y_threshold, config);
    let blocks = blocks::build_blocks(page.page_num, &lines, block_y_gap_threshold, config);
    let regions = if config.disable_regions {
        None
    } else {
        Some(regions::build_regions(
            page.page_num,
            &blocks,
            page.image_width,
            page.image_height,
            config,
        ))
    };
    let cell_candidates = cells::build_cell_candidates(page.page_num, &lines, config);

    debug!(
        page_num = page.page_num,
        tokens_in = page.tokens.len(),
        tokens_retained = sanitized.retained.len(),
        lines = lines.len(),
        blocks = blocks.len(),
        "grouped page"
    );

    let stats = PageStats {
        tokens_in: page.tokens.len() as u64,
        tokens_retained: sanitized.retained.len() as u64,
        lines: lines.len() as u64,
        blocks: blocks.len() as u64,
        regions: regions.as_ref().map_or(0, |r| r.len()) as u64,
        median_token_height_px: median_height,
        line_y_threshold_px: line_y_threshold,
        block_y_gap_threshold_px: block_y_gap_threshold,
    };

    PageOutcome {
        page: GroupedPage {
            page_num: page.page_num,
            lines,
            blocks,
            regions,
            cell_candidates,
        },
        stats,
        dropped: sanitized.dropped,
        warnings: sanitized.warnings,
        retained: sanitized.retained,
    }
}

/// Median of token heights; even counts average the two middle values.
/// Zero for an empty page, where no threshold is ever used.
fn median_token_height(tokens: &[OcrToken]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let mut heights: Vec<i64> = tokens.iter().map(|t| t.bbox.height()).collect();
    heights.sort_unstable();
    let mid = heights.len() / 2;
    if heights.len() % 2 == 1 {
        heights[mid] as f64
    } else {
        (heights[mid - 1] + heights[mid]) as f64 / 2.0
    }
}
