//! Block builder: group lines into vertically contiguous blocks.
//!
//! Lines are consumed in the order the line builder emitted them. A line
//! extends the open block when its gap to the block's lower edge is at most
//! the page's gap threshold (inclusive) AND its horizontal overlap with the
//! block bbox, over the narrower width, is at least
//! `block_x_overlap_threshold`. Block IDs are minted only after the final
//! `(y0, x0, min line_id)` ordering is known. Lines inside a block keep
//! their builder order and are never resorted.

use crate::artifact::grouping::{block_id, Block, Line};
use crate::config::GroupingConfig;
use crate::geometry::BBox;

pub(crate) fn build_blocks(
    page_num: u32,
    lines: &[Line],
    block_y_gap_threshold: i64,
    config: &GroupingConfig,
) -> Vec<Block> {
    if lines.is_empty() {
        return Vec::new();
    }

    let mut groups: Vec<Vec<&Line>> = Vec::new();
    let mut current: Vec<&Line> = Vec::new();
    let mut current_bbox = BBox::new(0, 0, 0, 0);

    for line in lines {
        if current.is_empty() {
            current_bbox = line.line_bbox;
            current.push(line);
            continue;
        }

        let gap = line.line_bbox.y0 - current_bbox.y1;
        let x_overlap = current_bbox.x_overlap_ratio(&line.line_bbox);
        if gap <= block_y_gap_threshold && x_overlap >= config.block_x_overlap_threshold {
            current_bbox = current_bbox.union(&line.line_bbox);
            current.push(line);
        } else {
            groups.push(std::mem::take(&mut current));
            current_bbox = line.line_bbox;
            current.push(line);
        }
    }
    groups.push(current);

    groups.sort_by(|a, b| {
        let a_bbox = group_bbox(a);
        let b_bbox = group_bbox(b);
        let a_key = (a_bbox.y0, a_bbox.x0, min_line_id(a));
        let b_key = (b_bbox.y0, b_bbox.x0, min_line_id(b));
        a_key.cmp(&b_key)
    });

    groups
        .into_iter()
        .enumerate()
        .map(|(idx, group)| {
            let text = if config.omit_text_fields {
                None
            } else {
                Some(
                    group
                        .iter()
                        .filter_map(|l| l.text.as_deref())
                        .collect::<Vec<_>>()
                        .join("\n"),
                )
            };
            Block {
                block_id: block_id(page_num, idx),
                page_num,
                line_ids: group.iter().map(|l| l.line_id.clone()).collect(),
                block_bbox: group_bbox(&group),
                text,
            }
        })
        .collect()
}

fn group_bbox(group: &[&Line]) -> BBox {
    BBox::union_all(group.iter().map(|l| &l.line_bbox)).unwrap_or(BBox::new(0, 0, 0, 0))
}

fn min_line_id<'a>(group: &'a [&Line]) -> &'a str {
    group
        .iter()
        .map(|l| l.line_id.as_str())
        .min()
        .unwrap_or("")
}
