//! Line builder: partition retained tokens into horizontal bands.
//!
//! Pure geometry. The sweep visits tokens in `(y_center, x0, token_id)`
//! order (the center is kept as `y0 + y1` so the sort key stays integral)
//! and assigns each token to the open line with the nearest running
//! y-center among those passing both gates: center distance within the
//! page's line tolerance AND y-overlap against the line bbox at or above
//! `line_y_overlap_threshold`. Line IDs are minted only after the final
//! `(y0, x0, min token_id)` ordering is known.

use crate::artifact::grouping::{line_id, Line};
use crate::artifact::ocr::OcrToken;
use crate::config::GroupingConfig;
use crate::geometry::BBox;

struct OpenLine<'a> {
    tokens: Vec<&'a OcrToken>,
    bbox: BBox,
    center_sum: f64,
}

impl OpenLine<'_> {
    fn y_center(&self) -> f64 {
        self.center_sum / self.tokens.len() as f64
    }
}

pub(crate) fn build_lines(
    page_num: u32,
    tokens: &[OcrToken],
    line_y_threshold: i64,
    config: &GroupingConfig,
) -> Vec<Line> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut sweep: Vec<&OcrToken> = tokens.iter().collect();
    sweep.sort_by(|a, b| {
        (a.bbox.y_center_x2(), a.bbox.x0, &a.token_id)
            .cmp(&(b.bbox.y_center_x2(), b.bbox.x0, &b.token_id))
    });

    let mut open: Vec<OpenLine> = Vec::new();
    for token in sweep {
        let token_center = token.bbox.y_center();

        let mut best: Option<(usize, f64)> = None;
        for (i, line) in open.iter().enumerate() {
            let dy = (line.y_center() - token_center).abs();
            if dy > line_y_threshold as f64 {
                continue;
            }
            if line.bbox.y_overlap_ratio(&token.bbox) < config.line_y_overlap_threshold {
                continue;
            }
            // Strict < keeps the earliest-created line on equal deltas.
            match best {
                Some((_, best_dy)) if dy >= best_dy => {}
                _ => best = Some((i, dy)),
            }
        }

        match best {
            Some((i, _)) => {
                let line = &mut open[i];
                line.bbox = line.bbox.union(&token.bbox);
                line.center_sum += token_center;
                line.tokens.push(token);
            }
            None => open.push(OpenLine {
                bbox: token.bbox,
                center_sum: token_center,
                tokens: vec![token],
            }),
        }
    }

    // Reading order within each line.
    for line in &mut open {
        line.tokens.sort_by(|a, b| {
            (a.bbox.x0, a.bbox.y0, &a.token_id).cmp(&(b.bbox.x0, b.bbox.y0, &b.token_id))
        });
    }

    // Emission order, then mint IDs.
    open.sort_by(|a, b| {
        let a_key = (a.bbox.y0, a.bbox.x0, min_token_id(a));
        let b_key = (b.bbox.y0, b.bbox.x0, min_token_id(b));
        a_key.cmp(&b_key)
    });

    open.into_iter()
        .enumerate()
        .map(|(idx, line)| {
            let bbox = BBox::union_all(line.tokens.iter().map(|t| &t.bbox))
                .unwrap_or(line.bbox);
            let text = if config.omit_text_fields {
                None
            } else {
                Some(
                    line.tokens
                        .iter()
                        .map(|t| t.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" "),
                )
            };
            Line {
                line_id: line_id(page_num, idx),
                page_num,
                token_ids: line.tokens.iter().map(|t| t.token_id.clone()).collect(),
                line_bbox: bbox,
                text,
            }
        })
        .collect()
}

fn min_token_id<'a>(line: &'a OpenLine) -> &'a str {
    line.tokens
        .iter()
        .map(|t| t.token_id.as_str())
        .min()
        .unwrap_or("")
}
