//! Staged de-noising run and per-glyph localization.
//!
//! A [`Pipeline`] is created from an initialized [`Engine`] and executes a
//! fixed stage sequence over one source grid:
//!
//! 1. grayscale (`gray`)
//! 2. threshold (`thresholded`)
//! 3. morphology, one buffer per configured operator (`opened`, `closed`, ...)
//! 4. curve removal (`curves`, `curves_mask`, `inverted_mask`,
//!    `curves_removed`, `curves_removed_inverted`)
//! 5. edge detection (`edges`, `dilated_edges`)
//! 6. contour vectorization (`vectorized`, `inverted`)
//!
//! Every stage output is published into the run's [`StageArena`] once it is
//! complete. A stage failure aborts the run with [`SieveError::Stage`]. Glyph
//! matching against `gray` follows; per-glyph failures become
//! [`GlyphOutcome::Skipped`] and do not fail the run.
//!
//! [`SieveError::Stage`]: crate::SieveError::Stage

use std::fmt;

mod arena;
mod config;
mod engine;
mod run;

pub use arena::{BufferId, StageArena};
pub use config::{
    ContourConfig, CurveRemovalConfig, EdgeConfig, EdgeSource, MorphologyConfig, PipelineConfig,
    ThresholdKind,
};
pub use engine::{Engine, EngineConfig};
pub use run::{CancelToken, GlyphOutcome, MatchResult, Pipeline, RunReport};

/// Pipeline stage identity, used to attribute failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Grayscale,
    Threshold,
    Morphology,
    CurveRemoval,
    EdgeDetection,
    Contours,
}

impl Stage {
    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Grayscale => "grayscale",
            Stage::Threshold => "threshold",
            Stage::Morphology => "morphology",
            Stage::CurveRemoval => "curve_removal",
            Stage::EdgeDetection => "edge_detection",
            Stage::Contours => "contours",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle of a pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}
