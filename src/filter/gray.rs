//! RGB(A)/BGR(A) to luma conversion.

use crate::image::{ChannelOrder, PixelGrid};
use crate::util::par::for_each_row;
use crate::util::{SieveError, SieveResult};

// BT.601 weights in 14-bit fixed point; they sum to 1 << 14.
const WEIGHT_R: u32 = 4899;
const WEIGHT_G: u32 = 9617;
const WEIGHT_B: u32 = 1868;
const SHIFT: u32 = 14;

/// Converts a colour grid to a single-channel luma grid.
///
/// Each output sample is `round(0.299 R + 0.587 G + 0.114 B)`. Alpha is
/// ignored. A single-channel grid is returned unchanged.
pub fn to_gray(src: &PixelGrid) -> SieveResult<PixelGrid> {
    let channels = src.channels();
    if channels == 1 {
        return Ok(src.clone());
    }
    if channels != 3 && channels != 4 {
        return Err(SieveError::UnsupportedChannelLayout { channels });
    }

    let (r_idx, b_idx) = match src.order() {
        ChannelOrder::Rgb => (0, 2),
        ChannelOrder::Bgr => (2, 0),
    };
    let width = src.width();
    let height = src.height();
    let data = src.data();
    let mut out = vec![0u8; width * height];
    for_each_row(&mut out, width, |y, row| {
        let src_row = &data[y * width * channels..(y + 1) * width * channels];
        for (dst, px) in row.iter_mut().zip(src_row.chunks_exact(channels)) {
            *dst = luma(px[r_idx], px[1], px[b_idx]);
        }
    });

    Ok(PixelGrid::from_parts(
        out,
        width,
        height,
        1,
        ChannelOrder::default(),
    ))
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let acc = WEIGHT_R * u32::from(r) + WEIGHT_G * u32::from(g) + WEIGHT_B * u32::from(b);
    ((acc + (1 << (SHIFT - 1))) >> SHIFT).min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::{luma, to_gray};
    use crate::image::{ChannelOrder, PixelGrid};

    #[test]
    fn luma_matches_rounded_weights() {
        for &(r, g, b) in &[(255u8, 0u8, 0u8), (0, 255, 0), (0, 0, 255), (12, 200, 77)] {
            let expected = (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64).round();
            assert_eq!(luma(r, g, b) as f64, expected, "rgb = {r},{g},{b}");
        }
        assert_eq!(luma(255, 255, 255), 255);
    }

    #[test]
    fn bgr_order_swaps_red_and_blue() {
        let rgb = PixelGrid::new(vec![255, 0, 0], 1, 1, 3).unwrap();
        let bgr = rgb.clone().with_order(ChannelOrder::Bgr);
        assert_eq!(to_gray(&rgb).unwrap().data(), &[76]);
        assert_eq!(to_gray(&bgr).unwrap().data(), &[29]);
    }

    #[test]
    fn alpha_is_ignored() {
        let opaque = PixelGrid::new(vec![10, 20, 30, 255], 1, 1, 4).unwrap();
        let clear = PixelGrid::new(vec![10, 20, 30, 0], 1, 1, 4).unwrap();
        assert_eq!(to_gray(&opaque).unwrap(), to_gray(&clear).unwrap());
    }
}
