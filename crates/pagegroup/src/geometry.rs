//! Pixel-space geometry primitives.
//!
//! All coordinates live in page-image pixel space: origin at top-left,
//! x increasing right, y increasing down.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box with `x0 <= x1` and `y0 <= y1`.
///
/// Sanitization guarantees the ordering for every box that reaches the
/// grouping core; [`BBox::repaired`] is the normalization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BBox {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl BBox {
    pub fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> i64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i64 {
        self.y1 - self.y0
    }

    /// Area in square pixels; zero for degenerate or inverted boxes.
    pub fn area(&self) -> i64 {
        let w = self.width();
        let h = self.height();
        if w > 0 && h > 0 {
            w * h
        } else {
            0
        }
    }

    /// Vertical center doubled, so it stays integral and is safe to use as a
    /// sort key without floating-point comparisons.
    pub fn y_center_x2(&self) -> i64 {
        self.y0 + self.y1
    }

    pub fn y_center(&self) -> f64 {
        (self.y0 + self.y1) as f64 / 2.0
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Union over a non-empty iterator; `None` for an empty one.
    pub fn union_all<'a, I>(boxes: I) -> Option<BBox>
    where
        I: IntoIterator<Item = &'a BBox>,
    {
        boxes
            .into_iter()
            .fold(None, |acc, b| Some(acc.map_or(*b, |u: BBox| u.union(b))))
    }

    /// Horizontal overlap as a fraction of the narrower box's width.
    ///
    /// Zero when either box has non-positive width.
    pub fn x_overlap_ratio(&self, other: &BBox) -> f64 {
        let overlap = (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0);
        let denom = self.width().min(other.width());
        if denom > 0 {
            overlap as f64 / denom as f64
        } else {
            0.0
        }
    }

    /// Vertical overlap as a fraction of the shorter box's height.
    ///
    /// Zero when either box has non-positive height.
    pub fn y_overlap_ratio(&self, other: &BBox) -> f64 {
        let overlap = (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0);
        let denom = self.height().min(other.height());
        if denom > 0 {
            overlap as f64 / denom as f64
        } else {
            0.0
        }
    }

    /// Normalize swapped endpoints; the flag reports whether anything moved.
    pub fn repaired(&self) -> (BBox, bool) {
        let fixed = BBox {
            x0: self.x0.min(self.x1),
            y0: self.y0.min(self.y1),
            x1: self.x0.max(self.x1),
            y1: self.y0.max(self.y1),
        };
        let swapped = fixed != *self;
        (fixed, swapped)
    }
}
