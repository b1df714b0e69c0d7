//! Suzuki-Abe topological border following.

use crate::contour::{Contour, ContourApprox, Point};
use crate::image::ImageView;

// Neighbour offsets in clockwise order (y grows downwards), starting east.
const DIRS: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const EAST: usize = 0;

/// Traces all borders of the non-zero regions of `src`.
///
/// Contours are returned in discovery (raster) order; `parent` indexes into
/// the returned vector.
pub fn find_contours(src: ImageView<'_, u8>, approx: ContourApprox) -> Vec<Contour> {
    let mut labels = LabelMap::from_view(src);
    let width = labels.width;
    let height = labels.height;

    let mut contours: Vec<Contour> = Vec::new();
    let mut nbd: i32 = 1;

    for y in 1..height - 1 {
        // The frame counts as border 1 (a hole border with no parent).
        let mut lnbd: i32 = 1;
        for x in 1..width - 1 {
            let idx = y * width + x;
            let value = labels.f[idx];
            if value == 0 {
                continue;
            }

            let start = if value == 1 && labels.f[idx - 1] == 0 {
                Some((false, idx - 1))
            } else if value >= 1 && labels.f[idx + 1] == 0 {
                if value > 1 {
                    lnbd = value;
                }
                Some((true, idx + 1))
            } else {
                None
            };

            if let Some((is_hole, from)) = start {
                nbd += 1;
                let parent = parent_of(is_hole, lnbd, &contours);
                let chain = labels.follow(idx, from, nbd);
                let mut points: Vec<Point> = chain.into_iter().map(|i| labels.point(i)).collect();
                if approx == ContourApprox::Simple {
                    points = drop_collinear(&points);
                }
                contours.push(Contour {
                    points,
                    parent,
                    is_hole,
                });
            }

            let value = labels.f[idx];
            if value != 1 {
                lnbd = value.abs();
            }
        }
    }

    contours
}

/// Parent rule from the border types of the new border and of LNBD.
fn parent_of(is_hole: bool, lnbd: i32, contours: &[Contour]) -> Option<usize> {
    if lnbd <= 1 {
        return None;
    }
    let prev_idx = (lnbd - 2) as usize;
    let prev = &contours[prev_idx];
    if prev.is_hole == is_hole {
        prev.parent
    } else {
        Some(prev_idx)
    }
}

/// Keeps only the chain vertices where the step direction changes.
fn drop_collinear(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }
    let step = |a: Point, b: Point| (b.x - a.x, b.y - a.y);
    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            step(prev, cur) != step(cur, next)
        })
        .map(|i| points[i])
        .collect()
}

/// Zero-framed label image used while following borders.
struct LabelMap {
    f: Vec<i32>,
    width: usize,
    height: usize,
}

impl LabelMap {
    fn from_view(src: ImageView<'_, u8>) -> Self {
        let width = src.width() + 2;
        let height = src.height() + 2;
        let mut f = vec![0i32; width * height];
        for y in 0..src.height() {
            let row = src.row(y).unwrap_or_default();
            for (x, &v) in row.iter().enumerate() {
                f[(y + 1) * width + x + 1] = i32::from(v != 0);
            }
        }
        Self { f, width, height }
    }

    #[inline]
    fn neighbour(&self, idx: usize, dir: usize) -> usize {
        let (dx, dy) = DIRS[dir];
        (idx as isize + dy * self.width as isize + dx) as usize
    }

    fn dir_between(&self, center: usize, other: usize) -> usize {
        let dx = (other % self.width) as isize - (center % self.width) as isize;
        let dy = (other / self.width) as isize - (center / self.width) as isize;
        DIRS.iter()
            .position(|&d| d == (dx, dy))
            .unwrap_or(EAST)
    }

    fn point(&self, idx: usize) -> Point {
        Point::new(
            (idx % self.width) as i32 - 1,
            (idx / self.width) as i32 - 1,
        )
    }

    /// Follows the border starting at `start`, entered from the 0-pixel `from`.
    fn follow(&mut self, start: usize, from: usize, nbd: i32) -> Vec<usize> {
        let from_dir = self.dir_between(start, from);
        let first = (0..8)
            .map(|k| self.neighbour(start, (from_dir + k) % 8))
            .find(|&n| self.f[n] != 0);
        let Some(first) = first else {
            self.f[start] = -nbd;
            return vec![start];
        };

        let mut chain = Vec::new();
        let mut prev = first;
        let mut cur = start;
        loop {
            let prev_dir = self.dir_between(cur, prev);
            let mut east_examined_zero = false;
            let mut next = prev;
            for k in 1..=8 {
                let dir = (prev_dir + 8 - k) % 8;
                let n = self.neighbour(cur, dir);
                if self.f[n] != 0 {
                    next = n;
                    break;
                }
                if dir == EAST {
                    east_examined_zero = true;
                }
            }

            if east_examined_zero {
                self.f[cur] = -nbd;
            } else if self.f[cur] == 1 {
                self.f[cur] = nbd;
            }
            chain.push(cur);

            if next == start && cur == first {
                break;
            }
            prev = cur;
            cur = next;
        }
        chain
    }
}
