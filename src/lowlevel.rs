//! Building blocks below the [`Matcher`](crate::Matcher) API.
//!
//! Kernels and top-K collection for callers that want to drive a scan
//! themselves, e.g. over an ROI or with a custom candidate count.

pub use crate::candidate::topk::{Peak, TopK};
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::scan_full_par;
pub use crate::kernel::scalar::{IntensityScalar, ZnccScalar};
#[cfg(feature = "simd")]
pub use crate::kernel::simd::ZnccSimd;
pub use crate::kernel::{Kernel, ScanParams};
pub use crate::template::TemplatePlan;
