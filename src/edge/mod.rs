//! Canny-style edge detection.
//!
//! The detector runs four passes: Sobel gradients, magnitude and quantized
//! direction, non-maximum suppression along the gradient, and hysteresis
//! thresholding over the 8-neighbourhood. The result is a binary map.

mod canny;
mod sobel;

pub use canny::canny;
pub use sobel::{sobel, Gradient};

/// Norm used for the gradient magnitude.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GradientNorm {
    /// `|gx| + |gy|`.
    #[default]
    L1,
    /// `sqrt(gx^2 + gy^2)`.
    L2,
}

/// Parameters for [`canny`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CannyParams {
    /// Weak-edge threshold; magnitudes above it survive when connected.
    pub low: f32,
    /// Strong-edge threshold; magnitudes above it are always edges.
    pub high: f32,
    /// Magnitude norm.
    pub norm: GradientNorm,
}

impl Default for CannyParams {
    fn default() -> Self {
        Self {
            low: 50.0,
            high: 150.0,
            norm: GradientNorm::L1,
        }
    }
}
