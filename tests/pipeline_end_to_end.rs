use glyphsieve::pipeline::{ContourConfig, CurveRemovalConfig, EdgeSource, ThresholdKind};
use glyphsieve::{
    AdaptiveParams, CancelToken, Engine, EngineConfig, GlyphCatalog, GlyphMap, GlyphOutcome,
    MorphOp, PipelineConfig, PixelGrid, RunState, SieveError, Stage,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DEFAULT_BUFFERS: [&str; 13] = [
    "gray",
    "thresholded",
    "opened",
    "closed",
    "curves",
    "curves_mask",
    "inverted_mask",
    "curves_removed",
    "curves_removed_inverted",
    "edges",
    "dilated_edges",
    "vectorized",
    "inverted",
];

/// Light background with dark character blocks crossed by a dark curve.
fn captcha(width: usize, height: usize) -> PixelGrid {
    let mut data = vec![235u8; width * height * 3];
    let mut paint = |x: usize, y: usize, v: u8| {
        if x >= width || y >= height {
            return;
        }
        let i = (y * width + x) * 3;
        data[i..i + 3].copy_from_slice(&[v, v, v]);
    };
    for (gx, gy) in [(6usize, 6usize), (22, 8), (38, 5)] {
        for y in gy..gy + 10 {
            for x in gx..gx + 7 {
                if (x + y) % 4 != 0 {
                    paint(x, y, 30);
                }
            }
        }
    }
    for x in 0..width {
        let y = (height as f64 / 2.0 + 6.0 * (x as f64 / 7.0).sin()) as usize;
        paint(x, y, 60);
    }
    PixelGrid::new(data, width, height, 3).unwrap()
}

fn noise(rng: &mut StdRng, width: usize, height: usize) -> PixelGrid {
    let data = (0..width * height).map(|_| rng.random_range(0..=255)).collect();
    PixelGrid::gray(data, width, height).unwrap()
}

fn crop(src: &PixelGrid, x0: usize, y0: usize, w: usize, h: usize) -> PixelGrid {
    src.view().unwrap().roi(x0, y0, w, h).unwrap().to_grid()
}

#[test]
fn default_run_publishes_every_buffer_in_order() {
    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    let source = captcha(56, 24);
    let mut pipeline = engine.pipeline(PipelineConfig::default());
    assert_eq!(pipeline.state(), RunState::Idle);

    let report = pipeline
        .run(&source, &GlyphMap::new(), &CancelToken::new())
        .unwrap();
    assert_eq!(pipeline.state(), RunState::Completed);

    let names: Vec<&str> = report.intermediates().names().collect();
    assert_eq!(names, DEFAULT_BUFFERS);
    for (name, grid) in report.intermediates().iter() {
        assert_eq!(grid.shape(), (56, 24), "{name}");
    }
    assert_eq!(report.intermediate("vectorized").unwrap().channels(), 3);
    assert!(report.intermediate("thresholded").unwrap().is_binary());
    assert!(report.intermediate("edges").unwrap().is_binary());
    assert!(report.outcomes().is_empty());
}

#[test]
fn curve_mask_and_removed_buffers_are_consistent() {
    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    let report = engine
        .pipeline(PipelineConfig::default())
        .run(&captcha(56, 24), &GlyphMap::new(), &CancelToken::new())
        .unwrap();

    let gray = report.intermediate("gray").unwrap();
    let mask = report.intermediate("curves_mask").unwrap();
    let inverted_mask = report.intermediate("inverted_mask").unwrap();
    let removed = report.intermediate("curves_removed").unwrap();
    let removed_inv = report.intermediate("curves_removed_inverted").unwrap();
    for i in 0..gray.data().len() {
        let m = mask.data()[i];
        assert_eq!(inverted_mask.data()[i], 255 - m);
        let expected = if m != 0 { 255 - gray.data()[i] } else { 0 };
        assert_eq!(removed.data()[i], expected);
        assert_eq!(removed_inv.data()[i], 255 - expected);
    }
}

#[test]
fn invalid_block_size_fails_in_threshold_stage() {
    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    let cfg = PipelineConfig {
        threshold: ThresholdKind::Adaptive(AdaptiveParams {
            block_size: 4,
            ..AdaptiveParams::default()
        }),
        ..PipelineConfig::default()
    };
    let mut pipeline = engine.pipeline(cfg);
    let err = pipeline
        .run(&captcha(20, 12), &GlyphMap::new(), &CancelToken::new())
        .unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Threshold));
    assert!(matches!(
        err,
        SieveError::Stage { ref source, .. }
            if matches!(**source, SieveError::InvalidParameter { name: "block_size", .. })
    ));
    assert_eq!(pipeline.state(), RunState::Failed);
}

#[test]
fn cancelled_run_reports_cancellation() {
    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut pipeline = engine.pipeline(PipelineConfig::default());
    let err = pipeline
        .run(&captcha(20, 12), &GlyphMap::new(), &cancel)
        .unwrap_err();
    assert_eq!(err, SieveError::Cancelled);
    assert_eq!(err.stage(), None);
    assert_eq!(pipeline.state(), RunState::Failed);
}

/// Catalog that requests cancellation when the run first touches it.
struct CancellingCatalog {
    glyphs: GlyphMap,
    token: CancelToken,
    on_labels: bool,
}

impl GlyphCatalog for CancellingCatalog {
    fn lookup_glyph(&self, label: &str) -> Option<&PixelGrid> {
        self.token.cancel();
        self.glyphs.lookup_glyph(label)
    }

    fn labels(&self) -> Vec<String> {
        if self.on_labels {
            self.token.cancel();
        }
        self.glyphs.labels()
    }
}

fn five_glyphs(source: &PixelGrid) -> GlyphMap {
    (0..5)
        .map(|i| (format!("g{i}"), crop(source, i * 3, 2, 4, 4)))
        .collect()
}

#[test]
fn cancellation_between_glyphs_stops_the_run() {
    let mut rng = StdRng::seed_from_u64(12);
    let source = noise(&mut rng, 20, 20);
    let token = CancelToken::new();
    let catalog = CancellingCatalog {
        glyphs: five_glyphs(&source),
        token: token.clone(),
        on_labels: false,
    };
    let cfg = PipelineConfig {
        parallel: false,
        ..PipelineConfig::default()
    };

    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    let mut pipeline = engine.pipeline(cfg);
    let err = pipeline.run(&source, &catalog, &token).unwrap_err();
    assert_eq!(err, SieveError::Cancelled);
    assert_eq!(pipeline.state(), RunState::Failed);
}

#[test]
fn cancellation_after_stages_stops_glyph_dispatch() {
    let mut rng = StdRng::seed_from_u64(13);
    let source = noise(&mut rng, 20, 20);
    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    for parallel in [false, true] {
        let token = CancelToken::new();
        let catalog = CancellingCatalog {
            glyphs: five_glyphs(&source),
            token: token.clone(),
            on_labels: true,
        };
        let cfg = PipelineConfig {
            parallel,
            ..PipelineConfig::default()
        };
        let mut pipeline = engine.pipeline(cfg);
        let err = pipeline.run(&source, &catalog, &token).unwrap_err();
        assert_eq!(err, SieveError::Cancelled, "parallel = {parallel}");
        assert_eq!(pipeline.state(), RunState::Failed);
    }
}

#[test]
fn glyphs_are_located_and_missing_ones_skipped() {
    let mut rng = StdRng::seed_from_u64(99);
    let source = noise(&mut rng, 48, 20);
    let catalog: GlyphMap = [
        ("a", crop(&source, 5, 3, 6, 9)),
        ("b", crop(&source, 30, 8, 7, 10)),
    ]
    .into_iter()
    .collect();
    let cfg = PipelineConfig {
        glyphs: vec!["b".to_string(), "a".to_string(), "z".to_string()],
        ..PipelineConfig::default()
    };

    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    let mut pipeline = engine.pipeline(cfg);
    let report = pipeline.run(&source, &catalog, &CancelToken::new()).unwrap();
    assert_eq!(pipeline.state(), RunState::Completed);

    let outcomes = report.outcomes();
    assert_eq!(outcomes.len(), 3);
    let b = outcomes[0].as_match().unwrap();
    assert_eq!((b.label.as_str(), b.bbox()), ("b", (30, 8, 7, 10)));
    assert!((b.score - 1.0).abs() < 1e-6);
    let a = outcomes[1].as_match().unwrap();
    assert_eq!((a.x, a.y), (5, 3));
    assert!(matches!(
        &outcomes[2],
        GlyphOutcome::Skipped { label, reason: SieveError::MissingGlyph { .. } } if label == "z"
    ));
    assert_eq!(report.guess_text(0.9), "ab");
}

#[test]
fn empty_glyph_list_matches_whole_catalog() {
    let mut rng = StdRng::seed_from_u64(4);
    let source = noise(&mut rng, 30, 14);
    let catalog: GlyphMap = [("q", crop(&source, 12, 2, 5, 5))].into_iter().collect();
    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    let report = engine
        .pipeline(PipelineConfig::default())
        .run(&source, &catalog, &CancelToken::new())
        .unwrap();
    let labels: Vec<&str> = report.outcomes().iter().map(GlyphOutcome::label).collect();
    assert_eq!(labels, ["q"]);
    assert_eq!(report.matches().next().unwrap().bbox(), (12, 2, 5, 5));
}

#[test]
fn oversized_glyph_is_skipped_not_fatal() {
    let source = PixelGrid::filled(10, 10, 1, 128).unwrap();
    let catalog: GlyphMap = [("big", PixelGrid::filled(12, 4, 1, 0).unwrap())]
        .into_iter()
        .collect();
    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    let report = engine
        .pipeline(PipelineConfig::default())
        .run(&source, &catalog, &CancelToken::new())
        .unwrap();
    assert!(matches!(
        report.outcomes()[0],
        GlyphOutcome::Skipped {
            reason: SieveError::TemplateLargerThanSource { .. },
            ..
        }
    ));
}

#[test]
fn intermediates_can_be_dropped() {
    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    let cfg = PipelineConfig {
        retain_intermediates: false,
        ..PipelineConfig::default()
    };
    let report = engine
        .pipeline(cfg)
        .run(&captcha(20, 12), &GlyphMap::new(), &CancelToken::new())
        .unwrap();
    assert!(report.intermediates().is_empty());
}

#[test]
fn repeated_operators_get_numbered_buffers() {
    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    let mut cfg = PipelineConfig::default();
    cfg.morphology.ops = vec![MorphOp::Open, MorphOp::Open, MorphOp::Open];
    cfg.curve_removal.enabled = false;
    cfg.edges.dilate = false;
    let report = engine
        .pipeline(cfg)
        .run(&captcha(20, 12), &GlyphMap::new(), &CancelToken::new())
        .unwrap();
    let names: Vec<&str> = report.intermediates().names().collect();
    assert_eq!(
        names,
        [
            "gray",
            "thresholded",
            "opened",
            "opened_2",
            "opened_3",
            "edges",
            "vectorized",
            "inverted"
        ]
    );
}

#[test]
fn edge_source_requires_curve_removal() {
    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    let mut cfg = PipelineConfig::default();
    cfg.curve_removal = CurveRemovalConfig {
        enabled: false,
        ..CurveRemovalConfig::default()
    };
    cfg.edges.source = EdgeSource::CurvesRemovedInverted;
    let err = engine
        .pipeline(cfg.clone())
        .run(&captcha(20, 12), &GlyphMap::new(), &CancelToken::new())
        .unwrap_err();
    assert_eq!(err.stage(), Some(Stage::EdgeDetection));

    cfg.curve_removal.enabled = true;
    let report = engine
        .pipeline(cfg)
        .run(&captcha(20, 12), &GlyphMap::new(), &CancelToken::new())
        .unwrap();
    assert!(report.intermediate("edges").unwrap().is_binary());
}

#[test]
fn colour_source_without_grayscale_fails_in_threshold() {
    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    let cfg = PipelineConfig {
        grayscale: false,
        ..PipelineConfig::default()
    };
    let err = engine
        .pipeline(cfg)
        .run(&captcha(20, 12), &GlyphMap::new(), &CancelToken::new())
        .unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Threshold));
}

#[test]
fn single_channel_stroke_gives_gray_vectorized() {
    let engine = Engine::initialize(EngineConfig::default()).unwrap();
    let cfg = PipelineConfig {
        contours: ContourConfig {
            stroke: vec![255],
            thickness: 1,
            ..ContourConfig::default()
        },
        ..PipelineConfig::default()
    };
    let report = engine
        .pipeline(cfg)
        .run(&captcha(56, 24), &GlyphMap::new(), &CancelToken::new())
        .unwrap();
    let vectorized = report.intermediate("vectorized").unwrap();
    let inverted = report.intermediate("inverted").unwrap();
    assert_eq!(vectorized.channels(), 1);
    assert!(vectorized.data().iter().any(|&v| v == 255));
    for (v, i) in vectorized.data().iter().zip(inverted.data()) {
        assert_eq!(*i, 255 - *v);
    }
}
