//! 3x3 Sobel derivatives with replicated borders.

use crate::edge::GradientNorm;
use crate::image::ImageView;
use crate::util::math::clamp_index;
use crate::util::par::for_each_row;

/// Per-pixel derivative pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Gradient {
    pub gx: i32,
    pub gy: i32,
}

impl Gradient {
    /// Magnitude under the given norm.
    #[inline]
    pub fn magnitude(self, norm: GradientNorm) -> f32 {
        match norm {
            GradientNorm::L1 => (self.gx.abs() + self.gy.abs()) as f32,
            GradientNorm::L2 => ((self.gx * self.gx + self.gy * self.gy) as f32).sqrt(),
        }
    }
}

/// Computes horizontal and vertical Sobel derivatives for every pixel.
pub fn sobel(src: ImageView<'_, u8>) -> Vec<Gradient> {
    let width = src.width();
    let height = src.height();
    let mut out = vec![Gradient::default(); width * height];
    for_each_row(&mut out, width, |y, row| {
        let up = src.row(clamp_index(y as isize - 1, height)).unwrap_or_default();
        let mid = src.row(y).unwrap_or_default();
        let down = src.row(clamp_index(y as isize + 1, height)).unwrap_or_default();
        for (x, g) in row.iter_mut().enumerate() {
            let l = clamp_index(x as isize - 1, width);
            let r = clamp_index(x as isize + 1, width);
            let px = |line: &[u8], i: usize| i32::from(line[i]);

            let gx = (px(up, r) + 2 * px(mid, r) + px(down, r))
                - (px(up, l) + 2 * px(mid, l) + px(down, l));
            let gy = (px(down, l) + 2 * px(down, x) + px(down, r))
                - (px(up, l) + 2 * px(up, x) + px(up, r));
            *g = Gradient { gx, gy };
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::sobel;
    use crate::edge::GradientNorm;
    use crate::image::ImageView;

    #[test]
    fn vertical_step_has_horizontal_gradient() {
        let width = 4;
        let data: Vec<u8> = (0..16).map(|i| if i % width < 2 { 0 } else { 100 }).collect();
        let view = ImageView::from_slice(&data, width, 4).unwrap();
        let grads = sobel(view);
        let g = grads[width + 1];
        assert_eq!(g.gx, 400);
        assert_eq!(g.gy, 0);
        assert_eq!(g.magnitude(GradientNorm::L1), 400.0);
        assert_eq!(grads[width].gx, 0);
    }
}
