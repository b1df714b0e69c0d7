//! Global and local-mean (adaptive) binarization.

use crate::image::{ImageView, PixelGrid};
use crate::util::math::{clamp_index, round_div};
use crate::util::par::for_each_row;
use crate::util::{SieveError, SieveResult};

/// Which side of the threshold becomes foreground (255).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Polarity {
    /// Samples above the threshold become 255.
    #[default]
    BrightOnDark,
    /// Samples at or below the threshold become 255.
    DarkOnBright,
}

impl Polarity {
    #[inline]
    fn classify(self, value: i32, threshold: i32) -> u8 {
        let above = value > threshold;
        match (self, above) {
            (Polarity::BrightOnDark, true) | (Polarity::DarkOnBright, false) => 255,
            _ => 0,
        }
    }
}

/// Parameters for [`adaptive_threshold`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdaptiveParams {
    /// Side of the square neighbourhood; odd and at least 3.
    pub block_size: usize,
    /// Constant subtracted from the local mean.
    pub c: i32,
    /// Output polarity.
    pub polarity: Polarity,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            block_size: 13,
            c: 16,
            polarity: Polarity::BrightOnDark,
        }
    }
}

/// Binarizes `src` against a fixed threshold.
pub fn threshold(src: ImageView<'_, u8>, thresh: u8, polarity: Polarity) -> PixelGrid {
    let width = src.width();
    let height = src.height();
    let mut out = vec![0u8; width * height];
    for_each_row(&mut out, width, |y, row| {
        let src_row = src.row(y).unwrap_or_default();
        for (dst, &value) in row.iter_mut().zip(src_row) {
            *dst = polarity.classify(i32::from(value), i32::from(thresh));
        }
    });
    src_like(out, width, height)
}

/// Binarizes `src` against the mean of each pixel's neighbourhood minus `c`.
///
/// Borders are handled by replicating the outermost samples. The local mean
/// is rounded to the nearest integer before the comparison.
pub fn adaptive_threshold(
    src: ImageView<'_, u8>,
    params: AdaptiveParams,
) -> SieveResult<PixelGrid> {
    let block = params.block_size;
    if block < 3 {
        return Err(SieveError::InvalidParameter {
            name: "block_size",
            reason: "must be at least 3",
        });
    }
    if block % 2 == 0 {
        return Err(SieveError::InvalidParameter {
            name: "block_size",
            reason: "must be odd",
        });
    }

    let width = src.width();
    let height = src.height();
    let table = SummedArea::replicated(src, block / 2);
    let area = (block * block) as u64;

    let mut out = vec![0u8; width * height];
    for_each_row(&mut out, width, |y, row| {
        let src_row = src.row(y).unwrap_or_default();
        for (x, (dst, &value)) in row.iter_mut().zip(src_row).enumerate() {
            let mean = round_div(table.window_sum(x, y, block), area) as i32;
            *dst = params
                .polarity
                .classify(i32::from(value), mean - params.c);
        }
    });
    Ok(src_like(out, width, height))
}

fn src_like(data: Vec<u8>, width: usize, height: usize) -> PixelGrid {
    PixelGrid::from_parts(data, width, height, 1, Default::default())
}

/// Summed-area table over an edge-replicated copy of the source.
struct SummedArea {
    sums: Vec<u64>,
    stride: usize,
}

impl SummedArea {
    fn replicated(src: ImageView<'_, u8>, radius: usize) -> Self {
        let width = src.width();
        let height = src.height();
        let padded_w = width + 2 * radius;
        let padded_h = height + 2 * radius;
        let stride = padded_w + 1;
        let mut sums = vec![0u64; stride * (padded_h + 1)];

        for py in 0..padded_h {
            let sy = clamp_index(py as isize - radius as isize, height);
            let src_row = src.row(sy).unwrap_or_default();
            let mut running = 0u64;
            for px in 0..padded_w {
                let sx = clamp_index(px as isize - radius as isize, width);
                running += u64::from(src_row[sx]);
                sums[(py + 1) * stride + px + 1] = sums[py * stride + px + 1] + running;
            }
        }

        Self { sums, stride }
    }

    /// Sum of the `block x block` padded window whose top-left is `(x, y)`.
    ///
    /// In source coordinates that is the window centred on `(x, y)`.
    #[inline]
    fn window_sum(&self, x: usize, y: usize, block: usize) -> u64 {
        let s = self.stride;
        let top = y * s;
        let bottom = (y + block) * s;
        self.sums[bottom + x + block] + self.sums[top + x]
            - self.sums[top + x + block]
            - self.sums[bottom + x]
    }
}

#[cfg(test)]
mod tests {
    use super::{adaptive_threshold, threshold, AdaptiveParams, Polarity};
    use crate::image::ImageView;
    use crate::util::SieveError;

    fn brute_mean(
        data: &[u8],
        width: usize,
        height: usize,
        x: usize,
        y: usize,
        block: usize,
    ) -> i32 {
        let r = (block / 2) as isize;
        let mut sum = 0u64;
        for dy in -r..=r {
            for dx in -r..=r {
                let sx = (x as isize + dx).clamp(0, width as isize - 1) as usize;
                let sy = (y as isize + dy).clamp(0, height as isize - 1) as usize;
                sum += u64::from(data[sy * width + sx]);
            }
        }
        let area = (block * block) as u64;
        ((sum + area / 2) / area) as i32
    }

    #[test]
    fn rejects_even_and_small_blocks() {
        let data = [0u8; 16];
        let view = ImageView::from_slice(&data, 4, 4).unwrap();
        for block_size in [0, 1, 2, 4, 12] {
            let err = adaptive_threshold(
                view,
                AdaptiveParams {
                    block_size,
                    ..AdaptiveParams::default()
                },
            )
            .unwrap_err();
            assert!(matches!(
                err,
                SieveError::InvalidParameter {
                    name: "block_size",
                    ..
                }
            ));
        }
    }

    #[test]
    fn matches_bruteforce_local_mean() {
        let width = 9;
        let height = 7;
        let data: Vec<u8> = (0..width * height)
            .map(|i| ((i * 37 + (i / width) * 11) % 256) as u8)
            .collect();
        let view = ImageView::from_slice(&data, width, height).unwrap();
        let params = AdaptiveParams {
            block_size: 5,
            c: 3,
            polarity: Polarity::BrightOnDark,
        };
        let out = adaptive_threshold(view, params).unwrap();
        for y in 0..height {
            for x in 0..width {
                let mean = brute_mean(&data, width, height, x, y, 5);
                let expected = if i32::from(data[y * width + x]) > mean - 3 { 255 } else { 0 };
                assert_eq!(out.get(x, y), Some(expected), "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn global_threshold_is_strict() {
        let data = [199u8, 200, 201, 255];
        let view = ImageView::from_slice(&data, 4, 1).unwrap();
        assert_eq!(threshold(view, 200, Polarity::BrightOnDark).data(), &[0, 0, 255, 255]);
        assert_eq!(threshold(view, 200, Polarity::DarkOnBright).data(), &[255, 255, 0, 0]);
    }
}
