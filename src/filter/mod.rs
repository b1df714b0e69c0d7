//! Per-pixel filters: grayscale conversion, thresholding, binary morphology
//! and bitwise mask combination.
//!
//! Every filter reads an immutable input and returns a freshly allocated
//! `PixelGrid`; the input is never modified in place.

pub mod bitwise;
pub mod gray;
pub mod morph;
pub mod threshold;

pub use bitwise::BitwiseOp;
pub use gray::to_gray;
pub use morph::{MorphOp, StructuringElement};
pub use threshold::{adaptive_threshold, threshold, AdaptiveParams, Polarity};
