//! Post-build invariant audit.
//!
//! Re-checks the §structural laws on the assembled artifact before anything
//! is written: partitions, bbox tightness, ordering, index density, and drop
//! exclusion. A failure here is a bug in the builders, surfaced as
//! `InternalInvariantViolated` with the invariant name.

use crate::artifact::grouping::{block_id, line_id, region_id, GroupingArtifact};
use crate::artifact::ocr::OcrToken;
use crate::error::{GroupingError, Result};
use crate::geometry::BBox;
use std::collections::{BTreeMap, BTreeSet};

pub(crate) fn audit_artifact(
    artifact: &GroupingArtifact,
    retained_by_page: &BTreeMap<u32, Vec<OcrToken>>,
) -> Result<()> {
    let dropped_ids: BTreeSet<&str> = artifact
        .meta
        .dropped_tokens
        .iter()
        .map(|d| d.token_id.as_str())
        .collect();

    let mut prev_page_num = 0u32;
    for page in &artifact.pages {
        if page.page_num <= prev_page_num {
            return Err(GroupingError::invariant(
                "page_order",
                format!("page {} emitted after page {}", page.page_num, prev_page_num),
            ));
        }
        prev_page_num = page.page_num;

        let retained = retained_by_page
            .get(&page.page_num)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let token_bboxes: BTreeMap<&str, BBox> = retained
            .iter()
            .map(|t| (t.token_id.as_str(), t.bbox))
            .collect();

        audit_lines(page.page_num, &page.lines, &token_bboxes, &dropped_ids)?;
        audit_blocks(page.page_num, &page.blocks, &page.lines)?;
        if let Some(regions) = &page.regions {
            audit_regions(page.page_num, regions, &page.blocks)?;
        }
    }

    Ok(())
}

fn audit_lines(
    page_num: u32,
    lines: &[crate::artifact::grouping::Line],
    token_bboxes: &BTreeMap<&str, BBox>,
    dropped_ids: &BTreeSet<&str>,
) -> Result<()> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut prev_key: Option<(i64, i64, &str)> = None;

    for (idx, line) in lines.iter().enumerate() {
        if line.line_id != line_id(page_num, idx) {
            return Err(GroupingError::invariant(
                "index_density",
                format!("line at position {idx} on page {page_num} has id {}", line.line_id),
            ));
        }
        if line.token_ids.is_empty() {
            return Err(GroupingError::invariant(
                "partition_tokens_lines",
                format!("line {} is empty", line.line_id),
            ));
        }

        let key = (line.line_bbox.y0, line.line_bbox.x0, line.line_id.as_str());
        if let Some(prev) = prev_key {
            if key < prev {
                return Err(GroupingError::invariant(
                    "line_order",
                    format!("line {} breaks (y0, x0, line_id) order", line.line_id),
                ));
            }
        }
        prev_key = Some(key);

        let mut union: Option<BBox> = None;
        let mut prev_tok: Option<(i64, i64, &str)> = None;
        for token_id in &line.token_ids {
            if dropped_ids.contains(token_id.as_str()) {
                return Err(GroupingError::invariant(
                    "drop_exclusion",
                    format!("dropped token '{token_id}' appears in line {}", line.line_id),
                ));
            }
            let bbox = token_bboxes.get(token_id.as_str()).ok_or_else(|| {
                GroupingError::invariant(
                    "partition_tokens_lines",
                    format!(
                        "line {} references unknown token '{token_id}'",
                        line.line_id
                    ),
                )
            })?;
            if !seen.insert(token_id.as_str()) {
                return Err(GroupingError::invariant(
                    "partition_tokens_lines",
                    format!("token '{token_id}' appears in more than one line"),
                ));
            }
            let tok_key = (bbox.x0, bbox.y0, token_id.as_str());
            if let Some(prev) = prev_tok {
                if tok_key < prev {
                    return Err(GroupingError::invariant(
                        "token_order",
                        format!(
                            "token '{token_id}' breaks (x0, y0, token_id) order in line {}",
                            line.line_id
                        ),
                    ));
                }
            }
            prev_tok = Some(tok_key);
            union = Some(union.map_or(*bbox, |u| u.union(bbox)));
        }

        if union != Some(line.line_bbox) {
            return Err(GroupingError::invariant(
                "bbox_tightness",
                format!("line {} bbox is not the union of its tokens", line.line_id),
            ));
        }
    }

    if seen.len() != token_bboxes.len() {
        return Err(GroupingError::invariant(
            "partition_tokens_lines",
            format!(
                "page {page_num}: {} retained tokens but {} assigned to lines",
                token_bboxes.len(),
                seen.len()
            ),
        ));
    }

    Ok(())
}

fn audit_blocks(
    page_num: u32,
    blocks: &[crate::artifact::grouping::Block],
    lines: &[crate::artifact::grouping::Line],
) -> Result<()> {
    let line_bboxes: BTreeMap<&str, BBox> = lines
        .iter()
        .map(|l| (l.line_id.as_str(), l.line_bbox))
        .collect();

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut prev_key: Option<(i64, i64, &str)> = None;

    for (idx, block) in blocks.iter().enumerate() {
        if block.block_id != block_id(page_num, idx) {
            return Err(GroupingError::invariant(
                "index_density",
                format!(
                    "block at position {idx} on page {page_num} has id {}",
                    block.block_id
                ),
            ));
        }
        if block.line_ids.is_empty() {
            return Err(GroupingError::invariant(
                "partition_lines_blocks",
                format!("block {} is empty", block.block_id),
            ));
        }

        let key = (block.block_bbox.y0, block.block_bbox.x0, block.block_id.as_str());
        if let Some(prev) = prev_key {
            if key < prev {
                return Err(GroupingError::invariant(
                    "block_order",
                    format!("block {} breaks (y0, x0, block_id) order", block.block_id),
                ));
            }
        }
        prev_key = Some(key);

        let mut union: Option<BBox> = None;
        for line_id in &block.line_ids {
            let bbox = line_bboxes.get(line_id.as_str()).ok_or_else(|| {
                GroupingError::invariant(
                    "partition_lines_blocks",
                    format!("block {} references unknown line '{line_id}'", block.block_id),
                )
            })?;
            if !seen.insert(line_id.as_str()) {
                return Err(GroupingError::invariant(
                    "partition_lines_blocks",
                    format!("line '{line_id}' appears in more than one block"),
                ));
            }
            union = Some(union.map_or(*bbox, |u| u.union(bbox)));
        }

        if union != Some(block.block_bbox) {
            return Err(GroupingError::invariant(
                "bbox_tightness",
                format!("block {} bbox is not the union of its lines", block.block_id),
            ));
        }
    }

    if seen.len() != lines.len() {
        return Err(GroupingError::invariant(
            "partition_lines_blocks",
            format!(
                "page {page_num}: {} lines but {} assigned to blocks",
                lines.len(),
                seen.len()
            ),
        ));
    }

    Ok(())
}

fn audit_regions(
    page_num: u32,
    regions: &[crate::artifact::grouping::Region],
    blocks: &[crate::artifact::grouping::Block],
) -> Result<()> {
    let block_bboxes: BTreeMap<&str, BBox> = blocks
        .iter()
        .map(|b| (b.block_id.as_str(), b.block_bbox))
        .collect();

    let mut seen: BTreeSet<&str> = BTreeSet::new();

    for (idx, region) in regions.iter().enumerate() {
        if region.region_id != region_id(page_num, idx) {
            return Err(GroupingError::invariant(
                "index_density",
                format!(
                    "region at position {idx} on page {page_num} has id {}",
                    region.region_id
                ),
            ));
        }

        let mut union: Option<BBox> = None;
        for block_id in &region.block_ids {
            let bbox = block_bboxes.get(block_id.as_str()).ok_or_else(|| {
                GroupingError::invariant(
                    "partition_blocks_regions",
                    format!(
                        "region {} references unknown block '{block_id}'",
                        region.region_id
                    ),
                )
            })?;
            if !seen.insert(block_id.as_str()) {
                return Err(GroupingError::invariant(
                    "partition_blocks_regions",
                    format!("block '{block_id}' appears in more than one region"),
                ));
            }
            union = Some(union.map_or(*bbox, |u| u.union(bbox)));
        }

        if union != Some(region.region_bbox) {
            return Err(GroupingError::invariant(
                "bbox_tightness",
                format!(
                    "region {} bbox is not the union of its blocks",
                    region.region_id
                ),
            ));
        }
    }

    if seen.len() != blocks.len() {
        return Err(GroupingError::invariant(
            "partition_blocks_regions",
            format!(
                "page {page_num}: {} blocks but {} assigned to regions",
                blocks.len(),
                seen.len()
            ),
        ));
    }

    Ok(())
}
