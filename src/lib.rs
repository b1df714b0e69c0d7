//! glyphsieve de-noises curve-obscured text images (CAPTCHA-style) and
//! localizes known character glyphs in them.
//!
//! The processing core is a fixed sequence of pixel transforms: grayscale
//! conversion, adaptive thresholding, binary morphology, curve removal by
//! masked bitwise combination, Canny edge detection and contour
//! vectorization. Each glyph of a [`GlyphCatalog`] is then located in the
//! grayscale buffer by exhaustive zero-mean normalized cross-correlation.
//!
//! Runs are driven by a [`Pipeline`] created from an initialized [`Engine`].
//! Optional features: `rayon` (row- and glyph-parallel execution), `simd`
//! (`wide`-vectorized correlation), `image-io` (file decoding and PNG
//! output), `tracing` (spans and events per stage).
//!
//! ```
//! use glyphsieve::{CancelToken, Engine, EngineConfig, GlyphMap, PipelineConfig, PixelGrid};
//!
//! let engine = Engine::initialize(EngineConfig::default())?;
//! let source = PixelGrid::filled(32, 16, 3, 240)?;
//! let mut pipeline = engine.pipeline(PipelineConfig::default());
//! let report = pipeline.run(&source, &GlyphMap::new(), &CancelToken::new())?;
//! assert!(report.intermediate("vectorized").is_some());
//! # Ok::<(), glyphsieve::SieveError>(())
//! ```

pub mod catalog;
mod candidate;
pub mod contour;
pub mod edge;
pub mod filter;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod pipeline;
pub mod search;
pub mod template;
mod trace;
pub mod util;

pub use catalog::{GlyphCatalog, GlyphMap};
pub use contour::{Contour, ContourApprox, Point};
pub use edge::{CannyParams, GradientNorm};
pub use filter::{AdaptiveParams, BitwiseOp, MorphOp, Polarity, StructuringElement};
pub use image::{ChannelOrder, ImageView, PixelGrid};
pub use pipeline::{
    CancelToken, Engine, EngineConfig, GlyphOutcome, MatchResult, Pipeline, PipelineConfig,
    RunReport, RunState, Stage, StageArena,
};
pub use search::{FlatTemplate, Match, MatchConfig, Matcher};
pub use template::{Template, TemplatePlan};
pub use util::{SieveError, SieveResult};
