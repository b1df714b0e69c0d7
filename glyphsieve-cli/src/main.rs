use clap::Parser;
use glyphsieve::contour::ContourApprox;
use glyphsieve::image::io::{load_glyph_dir, load_image, save_grid};
use glyphsieve::pipeline::{
    ContourConfig, CurveRemovalConfig, EdgeConfig, EdgeSource, MorphologyConfig, ThresholdKind,
};
use glyphsieve::{
    AdaptiveParams, CancelToken, CannyParams, Engine, EngineConfig, FlatTemplate, GlyphOutcome,
    GradientNorm, MatchConfig, MorphOp, PipelineConfig, Polarity,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "glyphsieve CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for stage timings.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PolarityConfig {
    #[default]
    BrightOnDark,
    DarkOnBright,
}

impl From<PolarityConfig> for Polarity {
    fn from(value: PolarityConfig) -> Self {
        match value {
            PolarityConfig::BrightOnDark => Polarity::BrightOnDark,
            PolarityConfig::DarkOnBright => Polarity::DarkOnBright,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ThresholdKindConfig {
    #[default]
    Adaptive,
    Global,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ThresholdConfigJson {
    kind: ThresholdKindConfig,
    block_size: usize,
    c: i32,
    thresh: u8,
    polarity: PolarityConfig,
}

impl Default for ThresholdConfigJson {
    fn default() -> Self {
        let params = AdaptiveParams::default();
        Self {
            kind: ThresholdKindConfig::Adaptive,
            block_size: params.block_size,
            c: params.c,
            thresh: 127,
            polarity: PolarityConfig::BrightOnDark,
        }
    }
}

impl From<ThresholdConfigJson> for ThresholdKind {
    fn from(value: ThresholdConfigJson) -> Self {
        match value.kind {
            ThresholdKindConfig::Adaptive => ThresholdKind::Adaptive(AdaptiveParams {
                block_size: value.block_size,
                c: value.c,
                polarity: value.polarity.into(),
            }),
            ThresholdKindConfig::Global => ThresholdKind::Global {
                thresh: value.thresh,
                polarity: value.polarity.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MorphOpConfig {
    Erode,
    Dilate,
    Open,
    Close,
}

impl From<MorphOpConfig> for MorphOp {
    fn from(value: MorphOpConfig) -> Self {
        match value {
            MorphOpConfig::Erode => MorphOp::Erode,
            MorphOpConfig::Dilate => MorphOp::Dilate,
            MorphOpConfig::Open => MorphOp::Open,
            MorphOpConfig::Close => MorphOp::Close,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MorphologyConfigJson {
    kernel_size: usize,
    ops: Vec<MorphOpConfig>,
}

impl Default for MorphologyConfigJson {
    fn default() -> Self {
        Self {
            kernel_size: MorphologyConfig::default().kernel_size,
            ops: vec![MorphOpConfig::Open, MorphOpConfig::Close],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CurveRemovalConfigJson {
    enabled: bool,
    mask_threshold: u8,
}

impl Default for CurveRemovalConfigJson {
    fn default() -> Self {
        let cfg = CurveRemovalConfig::default();
        Self {
            enabled: cfg.enabled,
            mask_threshold: cfg.mask_threshold,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum NormConfig {
    #[default]
    L1,
    L2,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum EdgeSourceConfig {
    #[default]
    Gray,
    CurvesRemovedInverted,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct EdgeConfigJson {
    low: f32,
    high: f32,
    norm: NormConfig,
    source: EdgeSourceConfig,
    dilate: bool,
}

impl Default for EdgeConfigJson {
    fn default() -> Self {
        let cfg = EdgeConfig::default();
        Self {
            low: cfg.canny.low,
            high: cfg.canny.high,
            norm: NormConfig::L1,
            source: EdgeSourceConfig::Gray,
            dilate: cfg.dilate,
        }
    }
}

impl From<EdgeConfigJson> for EdgeConfig {
    fn from(value: EdgeConfigJson) -> Self {
        Self {
            canny: CannyParams {
                low: value.low,
                high: value.high,
                norm: match value.norm {
                    NormConfig::L1 => GradientNorm::L1,
                    NormConfig::L2 => GradientNorm::L2,
                },
            },
            source: match value.source {
                EdgeSourceConfig::Gray => EdgeSource::Gray,
                EdgeSourceConfig::CurvesRemovedInverted => EdgeSource::CurvesRemovedInverted,
            },
            dilate: value.dilate,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ContourConfigJson {
    simple: bool,
    stroke: Vec<u8>,
    thickness: usize,
}

impl Default for ContourConfigJson {
    fn default() -> Self {
        let cfg = ContourConfig::default();
        Self {
            simple: cfg.approx == ContourApprox::Simple,
            stroke: cfg.stroke,
            thickness: cfg.thickness,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FlatTemplateConfig {
    Reject,
    #[default]
    Intensity,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatchConfigJson {
    parallel: bool,
    min_var_i: f64,
    min_score: Option<f64>,
    flat_template: FlatTemplateConfig,
}

impl Default for MatchConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            parallel: cfg.parallel,
            min_var_i: cfg.min_var_i,
            min_score: None,
            flat_template: FlatTemplateConfig::Intensity,
        }
    }
}

impl From<MatchConfigJson> for MatchConfig {
    fn from(value: MatchConfigJson) -> Self {
        Self {
            parallel: value.parallel,
            min_var_i: value.min_var_i,
            min_score: value.min_score.unwrap_or(f64::NEG_INFINITY),
            flat_template: match value.flat_template {
                FlatTemplateConfig::Reject => FlatTemplate::Reject,
                FlatTemplateConfig::Intensity => FlatTemplate::Intensity,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PipelineConfigJson {
    grayscale: bool,
    threshold: ThresholdConfigJson,
    morphology: MorphologyConfigJson,
    curve_removal: CurveRemovalConfigJson,
    edges: EdgeConfigJson,
    contours: ContourConfigJson,
    glyphs: Vec<String>,
    #[serde(rename = "match")]
    match_cfg: MatchConfigJson,
    parallel: bool,
}

impl Default for PipelineConfigJson {
    fn default() -> Self {
        let cfg = PipelineConfig::default();
        Self {
            grayscale: cfg.grayscale,
            threshold: ThresholdConfigJson::default(),
            morphology: MorphologyConfigJson::default(),
            curve_removal: CurveRemovalConfigJson::default(),
            edges: EdgeConfigJson::default(),
            contours: ContourConfigJson::default(),
            glyphs: cfg.glyphs,
            match_cfg: MatchConfigJson::default(),
            parallel: cfg.parallel,
        }
    }
}

impl PipelineConfigJson {
    fn into_config(self, retain_intermediates: bool) -> PipelineConfig {
        PipelineConfig {
            grayscale: self.grayscale,
            threshold: self.threshold.into(),
            morphology: MorphologyConfig {
                kernel_size: self.morphology.kernel_size,
                ops: self.morphology.ops.into_iter().map(MorphOp::from).collect(),
            },
            curve_removal: CurveRemovalConfig {
                enabled: self.curve_removal.enabled,
                mask_threshold: self.curve_removal.mask_threshold,
            },
            edges: self.edges.into(),
            contours: ContourConfig {
                approx: if self.contours.simple {
                    ContourApprox::Simple
                } else {
                    ContourApprox::None
                },
                stroke: self.contours.stroke,
                thickness: self.contours.thickness,
            },
            glyphs: self.glyphs,
            matching: self.match_cfg.into(),
            parallel: self.parallel,
            retain_intermediates,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    glyph_dir: Option<String>,
    output_path: Option<String>,
    /// Directory receiving one PNG per intermediate buffer.
    dump_dir: Option<String>,
    /// Minimum score for a match to contribute to the guessed text.
    guess_min_score: f64,
    threads: Option<usize>,
    pipeline: PipelineConfigJson,
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    label: String,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    score: f64,
}

#[derive(Debug, Serialize)]
struct SkipRecord {
    label: String,
    reason: String,
}

#[derive(Debug, Serialize)]
struct Output {
    guess: String,
    matches: Vec<MatchRecord>,
    skipped: Vec<SkipRecord>,
    intermediates: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("glyphsieve=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }

    let source = load_image(&config.image_path)?;
    let glyphs = match &config.glyph_dir {
        Some(dir) => load_glyph_dir(dir)?,
        None => Default::default(),
    };
    tracing::info!(glyphs = glyphs.len(), "catalog loaded");

    let engine = Engine::initialize(EngineConfig {
        threads: config.threads,
    })?;
    let pipeline_cfg = config.pipeline.into_config(config.dump_dir.is_some());
    let mut pipeline = engine.pipeline(pipeline_cfg);
    let report = pipeline.run(&source, &glyphs, &CancelToken::new())?;

    if let Some(dir) = &config.dump_dir {
        dump_intermediates(report.intermediates().iter(), Path::new(dir))?;
    }

    let mut matches = Vec::new();
    let mut skipped = Vec::new();
    for outcome in report.outcomes() {
        match outcome {
            GlyphOutcome::Matched(m) => matches.push(MatchRecord {
                label: m.label.clone(),
                x: m.x,
                y: m.y,
                width: m.width,
                height: m.height,
                score: m.score,
            }),
            GlyphOutcome::Skipped { label, reason } => skipped.push(SkipRecord {
                label: label.clone(),
                reason: reason.to_string(),
            }),
        }
    }
    let output = Output {
        guess: report.guess_text(config.guess_min_score),
        matches,
        skipped,
        intermediates: report.intermediates().names().map(str::to_string).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}

fn dump_intermediates<'a>(
    buffers: impl Iterator<Item = (&'a str, &'a glyphsieve::PixelGrid)>,
    dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    for (name, grid) in buffers {
        save_grid(grid, dir.join(format!("{name}.png")))?;
    }
    Ok(())
}
