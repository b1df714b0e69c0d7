//! Non-maximum suppression and hysteresis.

use crate::edge::sobel::{sobel, Gradient};
use crate::edge::CannyParams;
use crate::image::{ImageView, PixelGrid};
use crate::trace::trace_debug;
use crate::util::par::for_each_row;
use crate::util::{SieveError, SieveResult};

// tan(22.5 deg) and tan(67.5 deg).
const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

const SUPPRESSED: u8 = 0;
const WEAK: u8 = 1;
const STRONG: u8 = 2;

/// Runs the Canny detector and returns a binary edge map.
///
/// Thresholds must be non-negative; when `low > high` they are swapped.
pub fn canny(src: ImageView<'_, u8>, params: CannyParams) -> SieveResult<PixelGrid> {
    let (low, high) = validated_thresholds(params.low, params.high)?;
    let width = src.width();
    let height = src.height();

    let grads = sobel(src);
    let mut magnitude = vec![0f32; width * height];
    for_each_row(&mut magnitude, width, |y, row| {
        for (x, m) in row.iter_mut().enumerate() {
            *m = grads[y * width + x].magnitude(params.norm);
        }
    });

    let mut class = vec![SUPPRESSED; width * height];
    for_each_row(&mut class, width, |y, row| {
        for (x, c) in row.iter_mut().enumerate() {
            let idx = y * width + x;
            let m = magnitude[idx];
            if m <= low {
                continue;
            }
            let (prev, next) = neighbours_along(grads[idx], x, y, width, height);
            let at = |p: Option<usize>| p.map_or(0.0, |i| magnitude[i]);
            if m > at(prev) && m >= at(next) {
                *c = if m > high { STRONG } else { WEAK };
            }
        }
    });

    let edges = hysteresis(&mut class, width, height);
    trace_debug!("canny_edges", pixels = edges);

    let out = class
        .iter()
        .map(|&c| if c == STRONG { 255 } else { 0 })
        .collect();
    Ok(PixelGrid::from_parts(out, width, height, 1, Default::default()))
}

fn validated_thresholds(low: f32, high: f32) -> SieveResult<(f32, f32)> {
    if !low.is_finite() || low < 0.0 {
        return Err(SieveError::InvalidParameter {
            name: "canny_low",
            reason: "must be finite and non-negative",
        });
    }
    if !high.is_finite() || high < 0.0 {
        return Err(SieveError::InvalidParameter {
            name: "canny_high",
            reason: "must be finite and non-negative",
        });
    }
    Ok(if low > high { (high, low) } else { (low, high) })
}

/// Indices of the two neighbours along the quantized gradient direction.
fn neighbours_along(
    g: Gradient,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> (Option<usize>, Option<usize>) {
    let ax = g.gx.abs() as f32;
    let ay = g.gy.abs() as f32;
    let (dx, dy): (isize, isize) = if ay <= ax * TAN_22_5 {
        (1, 0)
    } else if ay > ax * TAN_67_5 {
        (0, 1)
    } else if (g.gx > 0) == (g.gy > 0) {
        (1, 1)
    } else {
        (1, -1)
    };
    let at = |sx: isize, sy: isize| -> Option<usize> {
        let nx = x as isize + sx;
        let ny = y as isize + sy;
        if nx < 0 || ny < 0 || nx as usize >= width || ny as usize >= height {
            None
        } else {
            Some(ny as usize * width + nx as usize)
        }
    };
    (at(-dx, -dy), at(dx, dy))
}

/// Promotes weak pixels 8-connected to strong ones; returns the edge count.
fn hysteresis(class: &mut [u8], width: usize, height: usize) -> usize {
    let mut stack: Vec<usize> = class
        .iter()
        .enumerate()
        .filter(|(_, &c)| c == STRONG)
        .map(|(i, _)| i)
        .collect();
    let mut count = stack.len();

    while let Some(idx) = stack.pop() {
        let x = idx % width;
        let y = idx / width;
        for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                let n = ny * width + nx;
                if class[n] == WEAK {
                    class[n] = STRONG;
                    count += 1;
                    stack.push(n);
                }
            }
        }
    }
    count
}
