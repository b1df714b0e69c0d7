//! Error types for glyphsieve.

use crate::pipeline::Stage;
use thiserror::Error;

/// Result alias for glyphsieve operations.
pub type SieveResult<T> = std::result::Result<T, SieveError>;

/// Errors that can occur when running glyphsieve stages and matchers.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SieveError {
    /// Width or height is zero or the size overflows.
    #[error("empty or oversized image: {width}x{height}")]
    EmptyImage { width: usize, height: usize },
    /// Two operands of an elementwise operation differ in width, height or
    /// channel count.
    #[error(
        "invalid dimensions: {width}x{height}x{channels} \
         (expected {expected_width}x{expected_height}x{expected_channels})"
    )]
    InvalidDimensions {
        width: usize,
        height: usize,
        channels: usize,
        expected_width: usize,
        expected_height: usize,
        expected_channels: usize,
    },
    /// The stride is smaller than the row length.
    #[error("invalid stride {stride} for row length {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The backing buffer is shorter than the described image.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A region of interest does not fit inside the image.
    #[error("roi ({x}, {y}, {width}x{height}) out of bounds for {img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// The channel count is not accepted by the operation.
    #[error("unsupported channel layout: {channels} channel(s)")]
    UnsupportedChannelLayout { channels: usize },
    /// A numeric parameter is out of its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
    /// The template does not fit inside the source image.
    #[error("template {tpl_width}x{tpl_height} larger than source {img_width}x{img_height}")]
    TemplateLargerThanSource {
        tpl_width: usize,
        tpl_height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// No placement produced a defined correlation score.
    #[error("degenerate variance: {reason}")]
    DegenerateVarianceRegion { reason: &'static str },
    /// The catalog has no glyph for the requested label.
    #[error("no glyph for label `{label}`")]
    MissingGlyph { label: String },
    /// The run was cancelled at a checkpoint.
    #[error("run cancelled")]
    Cancelled,
    /// A pipeline stage failed; the run was aborted.
    #[error("stage `{stage}` failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<SieveError>,
    },
    /// Reading or decoding an external image failed.
    #[error("acquisition failed: {reason}")]
    AcquisitionFailure { reason: String },
}

impl SieveError {
    /// Builds an `InvalidDimensions` error from `(width, height, channels)`.
    pub(crate) fn mismatch(got: (usize, usize, usize), expected: (usize, usize, usize)) -> Self {
        SieveError::InvalidDimensions {
            width: got.0,
            height: got.1,
            channels: got.2,
            expected_width: expected.0,
            expected_height: expected.1,
            expected_channels: expected.2,
        }
    }

    /// Wraps the error with the identity of the stage that produced it.
    pub(crate) fn in_stage(self, stage: Stage) -> Self {
        match self {
            err @ SieveError::Stage { .. } => err,
            SieveError::Cancelled => SieveError::Cancelled,
            err => SieveError::Stage {
                stage,
                source: Box::new(err),
            },
        }
    }

    /// Returns the failing stage for stage-level errors.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SieveError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
