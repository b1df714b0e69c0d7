//! Scalar reference kernels for score evaluation.

use crate::image::ImageView;
use crate::kernel::{fits, Kernel};
use crate::template::TemplatePlan;

/// Scalar zero-mean normalized cross-correlation.
pub struct ZnccScalar;

/// Scalar intensity-distance score for flat templates.
///
/// Scores a window as `1 - rms(W - T) / 255`, so an exact copy scores 1.0
/// and the score never leaves `[0, 1]`.
pub struct IntensityScalar;

/// Window sums needed by ZNCC.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct WindowSums {
    pub(crate) dot: f64,
    pub(crate) sum_i: f64,
    pub(crate) sum_i2: f64,
}

impl WindowSums {
    /// Finishes the correlation coefficient from the accumulated sums.
    pub(crate) fn zncc(self, plan: &TemplatePlan, min_var_i: f64) -> f64 {
        let n = plan.len() as f64;
        let var_i = self.sum_i2 - (self.sum_i * self.sum_i) / n;
        if var_i <= min_var_i {
            return f64::NEG_INFINITY;
        }
        let score = self.dot / (plan.var_t() * var_i).sqrt();
        if score.is_finite() {
            score
        } else {
            f64::NEG_INFINITY
        }
    }
}

impl Kernel for ZnccScalar {
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

        let mut sums = WindowSums::default();
        for ty in 0..plan.height() {
            let Some(img_row) = image.row(y + ty) else {
                return f64::NEG_INFINITY;
            };
            let tpl_row = &t_prime[ty * tpl_width..(ty + 1) * tpl_width];
            for (&t, &px) in tpl_row.iter().zip(&img_row[x..x + tpl_width]) {
                let value = f64::from(px);
                sums.dot += t * value;
                sums.sum_i += value;
                sums.sum_i2 += value * value;
            }
        }
        sums.zncc(plan, min_var_i)
    }
}

impl Kernel for IntensityScalar {
    fn score_at(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
        _min_var_i: f64,
    ) -> f64 {
        if !fits(image, plan, x, y) {
            return f64::NEG_INFINITY;
        }
        let tpl_width = plan.width();
        let samples = plan.samples();

        let mut sse = 0.0f64;
        for ty in 0..plan.height() {
            let Some(img_row) = image.row(y + ty) else {
                return f64::NEG_INFINITY;
            };
            let tpl_row = &samples[ty * tpl_width..(ty + 1) * tpl_width];
            for (&t, &px) in tpl_row.iter().zip(&img_row[x..x + tpl_width]) {
                let diff = f64::from(px) - t;
                sse += diff * diff;
            }
        }
        1.0 - (sse / plan.len() as f64).sqrt() / 255.0
    }
}
