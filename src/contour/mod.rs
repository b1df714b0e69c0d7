//! Border following and polygon rendering ("vectorization").
//!
//! [`find_contours`] traces every outer and hole border of the 8-connected
//! foreground of a binary grid and records the nesting tree.
//! [`draw_contours`] renders the traced borders as closed polylines onto a
//! blank grid.

mod draw;
mod trace;

pub use draw::draw_contours;
pub use trace::find_contours;

/// Integer pixel coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Point retention policy for traced borders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContourApprox {
    /// Keep every border pixel.
    None,
    /// Keep only the points where the chain changes direction.
    #[default]
    Simple,
}

/// One closed border.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    /// Border points in traversal order; the last point connects to the first.
    pub points: Vec<Point>,
    /// Index of the enclosing contour, `None` for top-level outer borders.
    pub parent: Option<usize>,
    /// True for the border between a region and a hole inside it.
    pub is_hole: bool,
}

impl Contour {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the contour has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Inclusive bounding box `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let first = self.points.first()?;
        Some(self.points.iter().fold(
            (first.x, first.y, first.x, first.y),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        ))
    }
}
