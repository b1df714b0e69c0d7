//! Run orchestration, cancellation and reporting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::catalog::GlyphCatalog;
use crate::contour::{draw_contours, find_contours};
use crate::edge::canny;
use crate::filter::{adaptive_threshold, bitwise, morph, threshold, to_gray};
use crate::filter::{Polarity, StructuringElement};
use crate::image::PixelGrid;
use crate::pipeline::{
    BufferId, EdgeSource, Engine, PipelineConfig, RunState, Stage, StageArena, ThresholdKind,
};
use crate::search::{MatchConfig, Matcher};
use crate::template::Template;
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{SieveError, SieveResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Cooperative cancellation flag shared between a run and its controller.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; the run stops at its next checkpoint.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn checkpoint(&self) -> SieveResult<()> {
        if self.is_cancelled() {
            Err(SieveError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Located glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    pub label: String,
    /// Left edge of the best placement.
    pub x: usize,
    /// Top edge of the best placement.
    pub y: usize,
    /// Higher is better; 1.0 is a perfect match.
    pub score: f64,
    /// Template width.
    pub width: usize,
    /// Template height.
    pub height: usize,
}

impl MatchResult {
    /// Bounding box `(x, y, width, height)` of the placement.
    pub fn bbox(&self) -> (usize, usize, usize, usize) {
        (self.x, self.y, self.width, self.height)
    }
}

/// Result of matching one catalog entry.
#[derive(Clone, Debug, PartialEq)]
pub enum GlyphOutcome {
    Matched(MatchResult),
    /// The glyph could not be matched; the run continued.
    Skipped { label: String, reason: SieveError },
}

impl GlyphOutcome {
    /// Label the outcome belongs to.
    pub fn label(&self) -> &str {
        match self {
            GlyphOutcome::Matched(m) => &m.label,
            GlyphOutcome::Skipped { label, .. } => label,
        }
    }

    /// The match, if there is one.
    pub fn as_match(&self) -> Option<&MatchResult> {
        match self {
            GlyphOutcome::Matched(m) => Some(m),
            GlyphOutcome::Skipped { .. } => None,
        }
    }
}

/// Output of a completed run.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    intermediates: StageArena,
    outcomes: Vec<GlyphOutcome>,
}

impl RunReport {
    /// Intermediate buffers in publication order; empty when not retained.
    pub fn intermediates(&self) -> &StageArena {
        &self.intermediates
    }

    /// Shortcut for `intermediates().get(name)`.
    pub fn intermediate(&self, name: &str) -> Option<&PixelGrid> {
        self.intermediates.get(name)
    }

    /// One outcome per attempted glyph, in label order.
    pub fn outcomes(&self) -> &[GlyphOutcome] {
        &self.outcomes
    }

    /// Successful matches, in label order.
    pub fn matches(&self) -> impl Iterator<Item = &MatchResult> {
        self.outcomes.iter().filter_map(GlyphOutcome::as_match)
    }

    /// Concatenates the labels of matches scoring at least `min_score`,
    /// ordered left to right.
    pub fn guess_text(&self, min_score: f64) -> String {
        let mut hits: Vec<&MatchResult> =
            self.matches().filter(|m| m.score >= min_score).collect();
        hits.sort_by(|a, b| a.x.cmp(&b.x).then_with(|| b.score.total_cmp(&a.score)));
        hits.iter().map(|m| m.label.as_str()).collect()
    }

    /// Splits the report into its buffers and outcomes.
    pub fn into_parts(self) -> (StageArena, Vec<GlyphOutcome>) {
        (self.intermediates, self.outcomes)
    }
}

/// One configured de-noising and matching run.
#[derive(Debug)]
pub struct Pipeline<'e> {
    engine: &'e Engine,
    config: PipelineConfig,
    state: RunState,
}

impl<'e> Pipeline<'e> {
    /// Creates an idle pipeline. Equivalent to [`Engine::pipeline`].
    pub fn new(engine: &'e Engine, config: PipelineConfig) -> Self {
        Self {
            engine,
            config,
            state: RunState::Idle,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the state left by the most recent run.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Executes every stage and matches the configured glyphs.
    ///
    /// On failure the run's buffers are dropped and the error names the stage
    /// that failed, or is [`SieveError::Cancelled`].
    pub fn run(
        &mut self,
        source: &PixelGrid,
        catalog: &dyn GlyphCatalog,
        cancel: &CancelToken,
    ) -> SieveResult<RunReport> {
        self.state = RunState::Running;
        let _span = trace_span!(
            "pipeline_run",
            width = source.width(),
            height = source.height(),
            channels = source.channels()
        )
        .entered();

        let config = &self.config;
        let result = self
            .engine
            .install(config.parallel, || execute(config, source, catalog, cancel));

        self.state = match &result {
            Ok(_) => RunState::Completed,
            Err(_) => RunState::Failed,
        };
        match &result {
            Ok(report) => {
                trace_event!("run_completed", matches = report.matches().count());
            }
            Err(err) => {
                trace_event!("run_failed", error = err.to_string().as_str());
            }
        }
        result
    }
}

fn execute(
    config: &PipelineConfig,
    source: &PixelGrid,
    catalog: &dyn GlyphCatalog,
    cancel: &CancelToken,
) -> SieveResult<RunReport> {
    let mut arena = StageArena::new();

    let gray = stage(Stage::Grayscale, cancel, || {
        let gray = if config.grayscale {
            to_gray(source)?
        } else {
            source.clone()
        };
        Ok(arena.publish("gray", gray))
    })?;

    let thresholded = stage(Stage::Threshold, cancel, || {
        let view = arena.buffer(gray).view()?;
        let out = match config.threshold {
            ThresholdKind::Adaptive(params) => adaptive_threshold(view, params)?,
            ThresholdKind::Global { thresh, polarity } => threshold(view, thresh, polarity),
        };
        Ok(arena.publish("thresholded", out))
    })?;

    let morphed = stage(Stage::Morphology, cancel, || {
        let se = StructuringElement::square(config.morphology.kernel_size)?;
        let mut current = thresholded;
        for &op in &config.morphology.ops {
            let out = morph::apply(arena.buffer(current).view()?, op, &se)?;
            current = arena.publish(op.output_name(), out);
        }
        Ok(current)
    })?;

    let curves_removed_inverted = if config.curve_removal.enabled {
        Some(stage(Stage::CurveRemoval, cancel, || {
            remove_curves(&mut arena, gray, morphed, config.curve_removal.mask_threshold)
        })?)
    } else {
        None
    };

    let traced = stage(Stage::EdgeDetection, cancel, || {
        let input = match config.edges.source {
            EdgeSource::Gray => gray,
            EdgeSource::CurvesRemovedInverted => {
                curves_removed_inverted.ok_or(SieveError::InvalidParameter {
                    name: "edge_source",
                    reason: "curve removal is disabled",
                })?
            }
        };
        let edges = canny(arena.buffer(input).view()?, config.edges.canny)?;
        let edges = arena.publish("edges", edges);
        if !config.edges.dilate {
            return Ok(edges);
        }
        let se = StructuringElement::square(3)?;
        let dilated = morph::dilate(arena.buffer(edges).view()?, &se);
        Ok(arena.publish("dilated_edges", dilated))
    })?;

    stage(Stage::Contours, cancel, || {
        let traced = arena.buffer(traced);
        let contours = find_contours(traced.view()?, config.contours.approx);
        trace_debug!("contours_found", count = contours.len());
        let vectorized = draw_contours(
            &contours,
            traced.width(),
            traced.height(),
            &config.contours.stroke,
            config.contours.thickness,
        )?;
        let inverted = bitwise::not(&vectorized);
        arena.publish("vectorized", vectorized);
        Ok(arena.publish("inverted", inverted))
    })?;

    let outcomes = match_glyphs(config, arena.buffer(gray), catalog, cancel)?;

    if !config.retain_intermediates {
        arena = StageArena::new();
    }
    Ok(RunReport {
        intermediates: arena,
        outcomes,
    })
}

/// Runs one stage body behind a cancellation checkpoint.
fn stage<T>(
    stage: Stage,
    cancel: &CancelToken,
    body: impl FnOnce() -> SieveResult<T>,
) -> SieveResult<T> {
    cancel.checkpoint()?;
    let _span = trace_span!("stage", stage = stage.name()).entered();
    let out = body().map_err(|err| err.in_stage(stage))?;
    trace_event!("stage_done", stage = stage.name());
    Ok(out)
}

fn remove_curves(
    arena: &mut StageArena,
    gray: BufferId,
    morphed: BufferId,
    mask_threshold: u8,
) -> SieveResult<BufferId> {
    let curves = bitwise::or(arena.buffer(morphed), arena.buffer(gray))?;
    let mask = threshold(curves.view()?, mask_threshold, Polarity::BrightOnDark);
    let inverted_mask = bitwise::not(&mask);
    let removed = bitwise::not_masked(arena.buffer(gray), &mask)?;
    let removed_inverted = bitwise::not(&removed);

    arena.publish("curves", curves);
    arena.publish("curves_mask", mask);
    arena.publish("inverted_mask", inverted_mask);
    arena.publish("curves_removed", removed);
    Ok(arena.publish("curves_removed_inverted", removed_inverted))
}

fn match_glyphs(
    config: &PipelineConfig,
    gray: &PixelGrid,
    catalog: &dyn GlyphCatalog,
    cancel: &CancelToken,
) -> SieveResult<Vec<GlyphOutcome>> {
    let labels = if config.glyphs.is_empty() {
        catalog.labels()
    } else {
        config.glyphs.clone()
    };
    let _span = trace_span!("match_glyphs", glyphs = labels.len()).entered();
    let matching = MatchConfig {
        parallel: config.parallel && config.matching.parallel,
        ..config.matching
    };

    let attempt = |label: &String| -> SieveResult<GlyphOutcome> {
        cancel.checkpoint()?;
        let outcome = match match_glyph(label, gray, catalog, matching) {
            Ok(found) => GlyphOutcome::Matched(found),
            Err(reason) => GlyphOutcome::Skipped {
                label: label.clone(),
                reason,
            },
        };
        match &outcome {
            GlyphOutcome::Matched(m) => {
                trace_debug!(
                    "glyph_matched",
                    label = label.as_str(),
                    x = m.x,
                    y = m.y,
                    score = m.score
                );
            }
            GlyphOutcome::Skipped { reason, .. } => {
                trace_debug!(
                    "glyph_skipped",
                    label = label.as_str(),
                    reason = reason.to_string().as_str()
                );
            }
        }
        Ok(outcome)
    };

    #[cfg(feature = "rayon")]
    if config.parallel {
        return labels.par_iter().map(attempt).collect();
    }
    labels.iter().map(attempt).collect()
}

fn match_glyph(
    label: &str,
    gray: &PixelGrid,
    catalog: &dyn GlyphCatalog,
    matching: MatchConfig,
) -> SieveResult<MatchResult> {
    let glyph = catalog
        .lookup_glyph(label)
        .ok_or_else(|| SieveError::MissingGlyph {
            label: label.to_string(),
        })?;
    let template = Template::from_grid(glyph)?;
    let (width, height) = template.shape();
    let found = Matcher::new(template.plan()?)
        .with_config(matching)
        .match_image(gray.view()?)?;
    Ok(MatchResult {
        label: label.to_string(),
        x: found.x,
        y: found.y,
        score: found.score,
        width,
        height,
    })
}
