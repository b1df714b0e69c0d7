//! Polyline rendering of traced contours.

use crate::contour::{Contour, Point};
use crate::image::PixelGrid;
use crate::util::{SieveError, SieveResult};

/// Draws every contour as a closed outline on a blank `width x height` grid.
///
/// The output has `color.len()` channels (1, 3 or 4). Strokes use a round
/// brush whose diameter is `thickness`. Diameters beyond `2 * (width + height)`
/// already cover the whole canvas from any point and are clamped to it.
pub fn draw_contours(
    contours: &[Contour],
    width: usize,
    height: usize,
    color: &[u8],
    thickness: usize,
) -> SieveResult<PixelGrid> {
    if thickness == 0 {
        return Err(SieveError::InvalidParameter {
            name: "thickness",
            reason: "must be at least 1",
        });
    }
    let mut canvas = PixelGrid::filled(width, height, color.len(), 0)?;
    let brush = brush(thickness.min(width.saturating_add(height).saturating_mul(2)));
    let mut pen = Pen {
        canvas: &mut canvas,
        color,
        brush: &brush,
    };

    for contour in contours {
        let n = contour.points.len();
        match n {
            0 => {}
            1 => pen.stamp(contour.points[0]),
            _ => {
                for i in 0..n {
                    pen.line(contour.points[i], contour.points[(i + 1) % n]);
                }
            }
        }
    }

    Ok(canvas)
}

fn brush(thickness: usize) -> Vec<(i32, i32)> {
    let radius = thickness as f64 / 2.0;
    let reach = radius.ceil() as i32;
    let mut offsets = Vec::new();
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let (fx, fy) = (f64::from(dx), f64::from(dy));
            if fx * fx + fy * fy <= radius * radius {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

struct Pen<'a> {
    canvas: &'a mut PixelGrid,
    color: &'a [u8],
    brush: &'a [(i32, i32)],
}

impl Pen<'_> {
    fn stamp(&mut self, p: Point) {
        let width = self.canvas.width() as i32;
        let height = self.canvas.height() as i32;
        let channels = self.color.len();
        for &(dx, dy) in self.brush {
            let x = p.x + dx;
            let y = p.y + dy;
            if x < 0 || y < 0 || x >= width || y >= height {
                continue;
            }
            let start = (y as usize * width as usize + x as usize) * channels;
            self.canvas.data_mut()[start..start + channels].copy_from_slice(self.color);
        }
    }

    /// Bresenham segment from `a` to `b`, both ends inclusive.
    fn line(&mut self, a: Point, b: Point) {
        let dx = (b.x - a.x).abs();
        let dy = -(b.y - a.y).abs();
        let sx = if a.x < b.x { 1 } else { -1 };
        let sy = if a.y < b.y { 1 } else { -1 };
        let mut err = dx + dy;
        let mut p = a;
        loop {
            self.stamp(p);
            if p == b {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                p.x += sx;
            }
            if e2 <= dx {
                err += dx;
                p.y += sy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{brush, draw_contours};
    use crate::contour::{Contour, Point};
    use crate::util::SieveError;

    fn square() -> Contour {
        Contour {
            points: vec![
                Point::new(1, 1),
                Point::new(1, 4),
                Point::new(4, 4),
                Point::new(4, 1),
            ],
            parent: None,
            is_hole: false,
        }
    }

    #[test]
    fn thin_outline_covers_perimeter_only() {
        let canvas = draw_contours(&[square()], 6, 6, &[255], 1).unwrap();
        let on = canvas.data().iter().filter(|&&v| v == 255).count();
        assert_eq!(on, 12);
        assert_eq!(canvas.get(2, 2), Some(0));
        assert_eq!(canvas.get(1, 3), Some(255));
    }

    #[test]
    fn colour_fills_every_channel() {
        let wide = Contour {
            points: vec![
                Point::new(1, 1),
                Point::new(1, 5),
                Point::new(5, 5),
                Point::new(5, 1),
            ],
            parent: None,
            is_hole: false,
        };
        let canvas = draw_contours(&[wide], 7, 7, &[255, 128, 0], 2).unwrap();
        assert_eq!(canvas.channels(), 3);
        assert_eq!(canvas.pixel(5, 3), Some(&[255u8, 128, 0][..]));
        assert_eq!(canvas.pixel(0, 3), Some(&[255u8, 128, 0][..]));
        assert_eq!(canvas.pixel(2, 3), Some(&[255u8, 128, 0][..]));
        assert_eq!(canvas.pixel(3, 3), Some(&[0u8, 0, 0][..]));
    }

    #[test]
    fn brush_sizes() {
        assert_eq!(brush(1), vec![(0, 0)]);
        assert_eq!(brush(2).len(), 5);
        assert_eq!(brush(3).len(), 9);
    }

    #[test]
    fn oversized_thickness_floods_canvas() {
        let canvas = draw_contours(&[square()], 6, 6, &[255], 1_000_000).unwrap();
        assert!(canvas.data().iter().all(|&v| v == 255));
        let clamped = draw_contours(&[square()], 6, 6, &[255], 24).unwrap();
        assert_eq!(canvas, clamped);
    }

    #[test]
    fn rejects_zero_thickness_and_bad_colour() {
        assert!(matches!(
            draw_contours(&[square()], 4, 4, &[255], 0),
            Err(SieveError::InvalidParameter { name: "thickness", .. })
        ));
        assert_eq!(
            draw_contours(&[square()], 4, 4, &[255, 255], 1).unwrap_err(),
            SieveError::UnsupportedChannelLayout { channels: 2 }
        );
    }
}
