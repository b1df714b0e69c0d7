//! Scoring kernels for glyph placement.
//!
//! A kernel scores one template placement at a time; full and ROI scans are
//! provided on top of [`Kernel::score_at`]. Undefined placements score
//! `f64::NEG_INFINITY` and never reach the candidate list.

use crate::candidate::topk::{Peak, TopK};
use crate::image::ImageView;
use crate::template::TemplatePlan;
use crate::util::{SieveError, SieveResult};

/// Scan configuration for kernel evaluations.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Maximum number of peaks to retain.
    pub topk: usize,
    /// Windows whose sum of squared deviations is at or below this are undefined (ZNCC only).
    pub min_var_i: f64,
    /// Minimum score threshold (discard below this value).
    pub min_score: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            topk: 1,
            min_var_i: 1e-8,
            min_score: f64::NEG_INFINITY,
        }
    }
}

/// Kernel trait for scoring and scan operations.
pub trait Kernel {
    /// Computes the score at a single placement (top-left coordinates).
    fn score_at(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
        min_var_i: f64,
    ) -> f64;

    /// Scans the full valid placement range and returns top-K peaks.
    fn scan_full(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        params: ScanParams,
    ) -> SieveResult<Vec<Peak>> {
        let (max_x, max_y) = placement_range(image, plan)?;
        Self::scan_roi(image, plan, 0, 0, max_x, max_y, params)
    }

    /// Scans an inclusive ROI of placement coordinates and returns top-K peaks.
    ///
    /// The ROI is clamped to the valid placement range.
    #[allow(clippy::too_many_arguments)]
    fn scan_roi(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        x0: usize,
        y0: usize,
        x1: usize,
        y1: usize,
        params: ScanParams,
    ) -> SieveResult<Vec<Peak>> {
        let (max_x, max_y) = placement_range(image, plan)?;
        let x1 = x1.min(max_x);
        let y1 = y1.min(max_y);
        if params.topk == 0 || x0 > x1 || y0 > y1 {
            return Ok(Vec::new());
        }

        let mut topk = TopK::new(params.topk);
        for y in y0..=y1 {
            scan_row::<Self>(image, plan, y, x0, x1, params, &mut topk);
        }
        Ok(topk.into_sorted_desc())
    }
}

/// Returns the largest valid top-left placement `(max_x, max_y)`.
pub(crate) fn placement_range(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
) -> SieveResult<(usize, usize)> {
    let (img_width, img_height) = image.shape();
    let (tpl_width, tpl_height) = (plan.width(), plan.height());
    if tpl_width > img_width || tpl_height > img_height {
        return Err(SieveError::TemplateLargerThanSource {
            tpl_width,
            tpl_height,
            img_width,
            img_height,
        });
    }
    Ok((img_width - tpl_width, img_height - tpl_height))
}

pub(crate) fn scan_row<K: Kernel + ?Sized>(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    y: usize,
    x0: usize,
    x1: usize,
    params: ScanParams,
    topk: &mut TopK<Peak>,
) {
    for x in x0..=x1 {
        let score = K::score_at(image, plan, x, y, params.min_var_i);
        if score.is_finite() && score >= params.min_score {
            topk.push(Peak { x, y, score });
        }
    }
}

/// Returns true when the template fits at `(x, y)`.
#[inline]
pub(crate) fn fits(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> bool {
    plan.width() <= image.width()
        && plan.height() <= image.height()
        && x <= image.width() - plan.width()
        && y <= image.height() - plan.height()
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;
