//! Region labeler: coarse geometry-only region candidates.
//!
//! Labels come from position and size on the page image alone; token text is
//! never inspected. A TITLE_BLOCK candidate is a block whose bbox lies
//! entirely inside the bottom-right quadrant (`x0 >= W/2` and `y0 >= H/2`,
//! integer division) with area at least `region_min_area_fraction` of the
//! page image. Every page's regions partition its blocks: non-candidate
//! blocks land in a single UNKNOWN region. TABLE_LIKE, NOTE, and ANNOTATION
//! are reserved for future geometry rules.

use crate::artifact::grouping::{region_id, Block, Region, RegionLabel};
use crate::config::GroupingConfig;
use crate::geometry::BBox;

pub(crate) fn build_regions(
    page_num: u32,
    blocks: &[Block],
    image_width: u32,
    image_height: u32,
    config: &GroupingConfig,
) -> Vec<Region> {
    if blocks.is_empty() {
        return Vec::new();
    }

    let half_x = (image_width / 2) as i64;
    let half_y = (image_height / 2) as i64;
    let page_area = image_width as f64 * image_height as f64;
    let min_area = config.region_min_area_fraction * page_area;

    let mut title_blocks: Vec<&Block> = Vec::new();
    let mut rest: Vec<&Block> = Vec::new();
    for block in blocks {
        let bbox = &block.block_bbox;
        let in_quadrant = bbox.x0 >= half_x && bbox.y0 >= half_y;
        if in_quadrant && bbox.area() as f64 >= min_area {
            title_blocks.push(block);
        } else {
            rest.push(block);
        }
    }

    let mut protos: Vec<(RegionLabel, Vec<&Block>)> = Vec::new();
    if title_blocks.is_empty() {
        protos.push((RegionLabel::Unknown, blocks.iter().collect()));
    } else {
        for block in title_blocks {
            protos.push((RegionLabel::TitleBlock, vec![block]));
        }
        if !rest.is_empty() {
            protos.push((RegionLabel::Unknown, rest));
        }
    }

    // Emission order, then mint IDs.
    let mut keyed: Vec<(BBox, String, RegionLabel, Vec<String>)> = protos
        .into_iter()
        .map(|(label, members)| {
            let bbox = BBox::union_all(members.iter().map(|b| &b.block_bbox))
                .unwrap_or(BBox::new(0, 0, 0, 0));
            let mut block_ids: Vec<String> =
                members.iter().map(|b| b.block_id.clone()).collect();
            block_ids.sort();
            let first = block_ids.first().cloned().unwrap_or_default();
            (bbox, first, label, block_ids)
        })
        .collect();
    keyed.sort_by(|a, b| (a.0.y0, a.0.x0, &a.1).cmp(&(b.0.y0, b.0.x0, &b.1)));

    keyed
        .into_iter()
        .enumerate()
        .map(|(idx, (bbox, _, label, block_ids))| Region {
            region_id: region_id(page_num, idx),
            page_num,
            label,
            block_ids,
            region_bbox: bbox,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::grouping::block_id;

    const W: u32 = 1000;
    const H: u32 = 1000;

    fn block(idx: usize, bbox: BBox) -> Block {
        Block {
            block_id: block_id(1, idx),
            page_num: 1,
            line_ids: vec![],
            block_bbox: bbox,
            text: None,
        }
    }

    fn build(blocks: &[Block]) -> Vec<Region> {
        build_regions(1, blocks, W, H, &GroupingConfig::default())
    }

    #[test]
    fn test_no_blocks_no_regions() {
        assert!(build(&[]).is_empty());
    }

    #[test]
    fn test_fallback_unknown_covers_all_blocks() {
        let blocks = vec![
            block(0, BBox::new(10, 10, 200, 50)),
            block(1, BBox::new(10, 100, 200, 150)),
        ];
        let regions = build(&blocks);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].region_id, "p001_r000000");
        assert_eq!(regions[0].label, RegionLabel::Unknown);
        assert_eq!(regions[0].block_ids, ["p001_b000000", "p001_b000001"]);
        assert_eq!(regions[0].region_bbox, BBox::new(10, 10, 200, 150));
    }

    #[test]
    fn test_bottom_right_quadrant_block_is_title_candidate() {
        let blocks = vec![
            block(0, BBox::new(10, 10, 200, 50)),
            block(1, BBox::new(600, 800, 950, 950)),
        ];
        let regions = build(&blocks);
        assert_eq!(regions.len(), 2);
        // Top-left UNKNOWN sorts first by y0.
        assert_eq!(regions[0].label, RegionLabel::Unknown);
        assert_eq!(regions[0].block_ids, ["p001_b000000"]);
        assert_eq!(regions[1].label, RegionLabel::TitleBlock);
        assert_eq!(regions[1].block_ids, ["p001_b000001"]);
        assert_eq!(regions[1].region_id, "p001_r000001");
    }

    #[test]
    fn test_quadrant_boundary_is_inclusive() {
        let on_edge = vec![block(0, BBox::new(500, 500, 900, 900))];
        let regions = build(&on_edge);
        assert_eq!(regions[0].label, RegionLabel::TitleBlock);

        // One pixel across the boundary fails the containment test.
        let crossing = vec![block(0, BBox::new(499, 500, 900, 900))];
        let regions = build(&crossing);
        assert_eq!(regions[0].label, RegionLabel::Unknown);
    }

    #[test]
    fn test_min_area_fraction_gates_candidates() {
        let config = GroupingConfig {
            region_min_area_fraction: 0.1,
            ..Default::default()
        };
        // 100x100 = 10_000 px^2 against a 0.1 * 1_000_000 = 100_000 floor.
        let small = vec![block(0, BBox::new(600, 800, 700, 900))];
        let regions = build_regions(1, &small, W, H, &config);
        assert_eq!(regions[0].label, RegionLabel::Unknown);

        let big = vec![block(0, BBox::new(550, 550, 950, 950))];
        let regions = build_regions(1, &big, W, H, &config);
        assert_eq!(regions[0].label, RegionLabel::TitleBlock);
    }

    #[test]
    fn test_regions_partition_blocks() {
        let blocks = vec![
            block(0, BBox::new(10, 10, 200, 50)),
            block(1, BBox::new(600, 700, 950, 800)),
            block(2, BBox::new(600, 850, 950, 950)),
        ];
        let regions = build(&blocks);
        let mut covered: Vec<&str> = regions
            .iter()
            .flat_map(|r| r.block_ids.iter().map(|s| s.as_str()))
            .collect();
        covered.sort();
        assert_eq!(covered, ["p001_b000000", "p001_b000001", "p001_b000002"]);
        assert_eq!(
            regions.iter().filter(|r| r.label == RegionLabel::TitleBlock).count(),
            2
        );
    }
}
