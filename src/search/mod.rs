//! Exhaustive glyph localization over every valid placement.
//!
//! The matcher scores each top-left offset with zero-mean normalized
//! cross-correlation and keeps the best placements. Ties resolve to the
//! first placement in row-major order. Flat templates (zero variance) have no
//! defined correlation; [`FlatTemplate`] decides how they are handled.

use crate::candidate::topk::Peak;
use crate::image::ImageView;
use crate::kernel::scalar::IntensityScalar;
use crate::kernel::{Kernel, ScanParams};
use crate::template::TemplatePlan;
use crate::trace::{trace_debug, trace_span};
use crate::util::{SieveError, SieveResult};

#[cfg(feature = "rayon")]
use crate::kernel::rayon::scan_full_par;

#[cfg(not(feature = "simd"))]
use crate::kernel::scalar::ZnccScalar as Zncc;
#[cfg(feature = "simd")]
use crate::kernel::simd::ZnccSimd as Zncc;

/// Policy for templates whose pixels all share one value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlatTemplate {
    /// Fail with `DegenerateVarianceRegion`.
    Reject,
    /// Score windows by intensity distance, `1 - rms(W - T) / 255`.
    #[default]
    Intensity,
}

/// Matcher configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchConfig {
    /// Scan rows in parallel when the `rayon` feature is enabled.
    pub parallel: bool,
    /// Windows with a sum of squared deviations at or below this are skipped.
    pub min_var_i: f64,
    /// Placements scoring below this are discarded.
    pub min_score: f64,
    /// Handling of flat templates.
    pub flat_template: FlatTemplate,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            min_var_i: 1e-8,
            min_score: f64::NEG_INFINITY,
            flat_template: FlatTemplate::default(),
        }
    }
}

/// Best placement of a template in an image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// Left edge of the placement.
    pub x: usize,
    /// Top edge of the placement.
    pub y: usize,
    /// Score; 1.0 is a perfect match.
    pub score: f64,
}

impl From<Peak> for Match {
    fn from(peak: Peak) -> Self {
        Self {
            x: peak.x,
            y: peak.y,
            score: peak.score,
        }
    }
}

/// Template matcher bound to one planned glyph.
#[derive(Clone, Debug)]
pub struct Matcher {
    plan: TemplatePlan,
    cfg: MatchConfig,
}

impl Matcher {
    /// Creates a matcher with the default configuration.
    pub fn new(plan: TemplatePlan) -> Self {
        Self {
            plan,
            cfg: MatchConfig::default(),
        }
    }

    /// Replaces the matcher configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the template plan.
    pub fn plan(&self) -> &TemplatePlan {
        &self.plan
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Returns the best placement of the template in `image`.
    pub fn match_image(&self, image: ImageView<'_, u8>) -> SieveResult<Match> {
        let best = self
            .match_image_topk(image, 1)?
            .into_iter()
            .next()
            .ok_or(SieveError::DegenerateVarianceRegion {
                reason: "no placement produced a defined score",
            })?;
        Ok(best)
    }

    /// Returns up to `k` placements ordered by descending score.
    pub fn match_image_topk(&self, image: ImageView<'_, u8>, k: usize) -> SieveResult<Vec<Match>> {
        let _span = trace_span!(
            "match_image",
            tpl_width = self.plan.width(),
            tpl_height = self.plan.height(),
            flat = self.plan.is_flat()
        )
        .entered();

        let params = ScanParams {
            topk: k,
            min_var_i: self.cfg.min_var_i,
            min_score: self.cfg.min_score,
        };
        let peaks = if self.plan.is_flat() {
            match self.cfg.flat_template {
                FlatTemplate::Reject => {
                    return Err(SieveError::DegenerateVarianceRegion {
                        reason: "template has zero variance",
                    })
                }
                FlatTemplate::Intensity => self.scan::<IntensityScalar>(image, params)?,
            }
        } else {
            self.scan::<Zncc>(image, params)?
        };

        trace_debug!("match_candidates", count = peaks.len());
        Ok(peaks.into_iter().map(Match::from).collect())
    }

    fn scan<K: Kernel>(
        &self,
        image: ImageView<'_, u8>,
        params: ScanParams,
    ) -> SieveResult<Vec<Peak>> {
        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return scan_full_par::<K>(image, &self.plan, params);
        }
        K::scan_full(image, &self.plan, params)
    }
}
