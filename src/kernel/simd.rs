//! SIMD-accelerated ZNCC using the `wide` crate.
//!
//! The inner template row loop is vectorized to process four pixels at a
//! time using `f64x4`; the row remainder falls back to scalar code.

use crate::image::ImageView;
use crate::kernel::scalar::WindowSums;
use crate::kernel::{fits, Kernel};
use crate::template::TemplatePlan;
use wide::f64x4;

const LANES: usize = 4;

/// Load 4 u8 values and convert to f64x4.
#[inline]
fn load_u8x4_as_f64x4(slice: &[u8]) -> f64x4 {
    f64x4::from([
        f64::from(slice[0]),
        f64::from(slice[1]),
        f64::from(slice[2]),
        f64::from(slice[3]),
    ])
}

/// Load 4 f64 values into f64x4.
#[inline]
fn load_f64x4(slice: &[f64]) -> f64x4 {
    f64x4::from([slice[0], slice[1], slice[2], slice[3]])
}

/// Horizontal sum of f64x4.
#[inline]
fn hsum(v: f64x4) -> f64 {
    let arr = v.to_array();
    arr[0] + arr[1] + arr[2] + arr[3]
}

/// SIMD-accelerated ZNCC kernel.
pub struct ZnccSimd;

impl Kernel for ZnccSimd {
    fn score_at(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
        min_var_i: f64,
    ) -> f64 {
        if !fits(image, plan, x, y) || plan.is_flat() {
            return f64::NEG_INFINITY;
        }
        let tpl_width = plan.width();
        let t_prime = plan.t_prime();
        let simd_end = tpl_width / LANES * LANES;

        let mut dot_vec = f64x4::ZERO;
        let mut sum_i_vec = f64x4::ZERO;
        let mut sum_i2_vec = f64x4::ZERO;
        let mut tail = WindowSums::default();

        for ty in 0..plan.height() {
            let Some(img_row) = image.row(y + ty) else {
                return f64::NEG_INFINITY;
            };
            let img_row = &img_row[x..x + tpl_width];
            let tpl_row = &t_prime[ty * tpl_width..(ty + 1) * tpl_width];

            let mut tx = 0;
            while tx < simd_end {
                let img_vals = load_u8x4_as_f64x4(&img_row[tx..]);
                let tpl_vals = load_f64x4(&tpl_row[tx..]);
                dot_vec += tpl_vals * img_vals;
                sum_i_vec += img_vals;
                sum_i2_vec += img_vals * img_vals;
                tx += LANES;
            }
            for (&t, &px) in tpl_row[simd_end..].iter().zip(&img_row[simd_end..]) {
                let value = f64::from(px);
                tail.dot += t * value;
                tail.sum_i += value;
                tail.sum_i2 += value * value;
            }
        }

        WindowSums {
            dot: hsum(dot_vec) + tail.dot,
            sum_i: hsum(sum_i_vec) + tail.sum_i,
            sum_i2: hsum(sum_i2_vec) + tail.sum_i2,
        }
        .zncc(plan, min_var_i)
    }
}
