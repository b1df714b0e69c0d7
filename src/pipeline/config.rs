//! Run configuration. Defaults are tuned for light CAPTCHA images with dark
//! text crossed by thin curves.

use crate::contour::ContourApprox;
use crate::edge::CannyParams;
use crate::filter::{AdaptiveParams, MorphOp, Polarity};
use crate::search::MatchConfig;

/// Binarization applied to the grayscale buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThresholdKind {
    /// Local-mean threshold.
    Adaptive(AdaptiveParams),
    /// Single global threshold.
    Global { thresh: u8, polarity: Polarity },
}

impl Default for ThresholdKind {
    fn default() -> Self {
        ThresholdKind::Adaptive(AdaptiveParams::default())
    }
}

/// Morphology sequence applied after thresholding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MorphologyConfig {
    /// Side of the square structuring element.
    pub kernel_size: usize,
    /// Operators applied in order, each to the previous output.
    pub ops: Vec<MorphOp>,
}

impl Default for MorphologyConfig {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            ops: vec![MorphOp::Open, MorphOp::Close],
        }
    }
}

/// Curve-removal stage settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurveRemovalConfig {
    pub enabled: bool,
    /// Global threshold applied to `curves` to build the curve mask.
    pub mask_threshold: u8,
}

impl Default for CurveRemovalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mask_threshold: 200,
        }
    }
}

/// Buffer fed to the edge detector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeSource {
    #[default]
    Gray,
    /// Requires curve removal to be enabled.
    CurvesRemovedInverted,
}

/// Edge detection settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeConfig {
    pub canny: CannyParams,
    pub source: EdgeSource,
    /// Thicken edges with a 3x3 dilation before tracing.
    pub dilate: bool,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            canny: CannyParams::default(),
            source: EdgeSource::default(),
            dilate: true,
        }
    }
}

/// Contour vectorization settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContourConfig {
    pub approx: ContourApprox,
    /// Stroke colour; its length sets the channel count of `vectorized`.
    pub stroke: Vec<u8>,
    pub thickness: usize,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            approx: ContourApprox::Simple,
            stroke: vec![255, 255, 255],
            thickness: 2,
        }
    }
}

/// Full pipeline configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Convert the source to grayscale; when off the source must already be 1-channel.
    pub grayscale: bool,
    pub threshold: ThresholdKind,
    pub morphology: MorphologyConfig,
    pub curve_removal: CurveRemovalConfig,
    pub edges: EdgeConfig,
    pub contours: ContourConfig,
    /// Labels to match; empty means every catalog label.
    pub glyphs: Vec<String>,
    pub matching: MatchConfig,
    /// Split per-pixel work and glyph dispatch across the engine pool.
    pub parallel: bool,
    /// Return intermediate buffers in the run report.
    pub retain_intermediates: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            grayscale: true,
            threshold: ThresholdKind::default(),
            morphology: MorphologyConfig::default(),
            curve_removal: CurveRemovalConfig::default(),
            edges: EdgeConfig::default(),
            contours: ContourConfig::default(),
            glyphs: Vec::new(),
            matching: MatchConfig::default(),
            parallel: true,
            retain_intermediates: true,
        }
    }
}
