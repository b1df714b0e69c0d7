#![cfg(feature = "rayon")]

use glyphsieve::{
    CancelToken, Engine, EngineConfig, GlyphMap, ImageView, MatchConfig, Matcher, PipelineConfig,
    PixelGrid, TemplatePlan,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn speckled(rng: &mut StdRng, width: usize, height: usize) -> PixelGrid {
    let data = (0..width * height * 3)
        .map(|_| {
            if rng.random_bool(0.2) {
                rng.random_range(0..80)
            } else {
                rng.random_range(180..=255)
            }
        })
        .collect();
    PixelGrid::new(data, width, height, 3).unwrap()
}

#[test]
fn parallel_and_serial_runs_agree() {
    let mut rng = StdRng::seed_from_u64(17);
    let source = speckled(&mut rng, 64, 32);
    let gray = glyphsieve::filter::to_gray(&source).unwrap();
    let catalog: GlyphMap = [
        ("k", gray.view().unwrap().roi(3, 4, 8, 12).unwrap().to_grid()),
        ("m", gray.view().unwrap().roi(40, 10, 9, 11).unwrap().to_grid()),
    ]
    .into_iter()
    .collect();

    let engine = Engine::initialize(EngineConfig { threads: Some(4) }).unwrap();
    assert_eq!(engine.threads(), 4);
    let run = |parallel: bool| {
        let cfg = PipelineConfig {
            parallel,
            ..PipelineConfig::default()
        };
        engine
            .pipeline(cfg)
            .run(&source, &catalog, &CancelToken::new())
            .unwrap()
    };

    let par = run(true);
    let seq = run(false);
    assert_eq!(par.intermediates(), seq.intermediates());
    assert_eq!(par.outcomes(), seq.outcomes());
    assert_eq!(par.guess_text(0.99), "km");
}

#[test]
fn matcher_is_independent_of_parallelism() {
    let mut rng = StdRng::seed_from_u64(31);
    let (width, height) = (50, 40);
    let image: Vec<u8> = (0..width * height).map(|_| rng.random()).collect();
    let tpl: Vec<u8> = (0..7 * 6).map(|_| rng.random()).collect();
    let view = ImageView::from_slice(&image, width, height).unwrap();

    let matcher = |parallel| {
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 7, 6).unwrap());
        Matcher::new(plan).with_config(MatchConfig {
            parallel,
            ..MatchConfig::default()
        })
    };
    let par = matcher(true).match_image_topk(view, 5).unwrap();
    let seq = matcher(false).match_image_topk(view, 5).unwrap();
    assert_eq!(par, seq);
}
