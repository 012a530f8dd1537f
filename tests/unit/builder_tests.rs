// Pipeline builder tests: orientation, resolution fallback, layer counts,
// terminal validation.

use std::fs;
use std::path::{Path, PathBuf};

use rstest::rstest;
use tempfile::TempDir;

use brandmark::brand::{Brand, TextLayer};
use brandmark::config::AssetsConfig;
use brandmark::overlay::builder::BuildContext;
use brandmark::overlay::{
    classify, AssetResolver, AssetSource, BuildError, FilterGraph, FilterNode, FrameSize,
    LayerStage, Orientation, Pad, PipelineBuilder,
};

fn write_png(path: &Path, width: u32, height: u32, alpha: u8) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, alpha]))
        .save(path)
        .unwrap();
}

struct Assets {
    dir: TempDir,
    layout: AssetsConfig,
}

impl Assets {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let layout = AssetsConfig::with_root(dir.path());
        Self { dir, layout }
    }

    fn watermark(&self, orientation: Orientation, file: &str) -> PathBuf {
        let path = self.layout.watermark_dir(orientation).join(file);
        write_png(&path, 64, 64, 128);
        path
    }

    fn logo(&self, file: &str, width: u32, height: u32, alpha: u8) -> PathBuf {
        let path = self.layout.logo_dir().join(file);
        write_png(&path, width, height, alpha);
        path
    }

    fn builder(&self) -> PipelineBuilder {
        PipelineBuilder::new(AssetResolver::new(self.layout.clone()))
    }
}

fn text(content: &str) -> TextLayer {
    TextLayer {
        enabled: true,
        content: content.to_string(),
        ..TextLayer::default()
    }
}

#[rstest]
#[case(1, 1, Orientation::Square)]
#[case(1080, 1080, Orientation::Square)]
#[case(720, 1280, Orientation::Tall)]
#[case(1080, 1081, Orientation::Tall)]
#[case(1920, 1080, Orientation::Wide)]
#[case(u32::MAX, 1, Orientation::Wide)]
fn test_classify(#[case] width: u32, #[case] height: u32, #[case] expected: Orientation) {
    assert_eq!(classify(width, height), expected);
}

#[test]
fn test_example_brand_logo_only_tall_frame() {
    let assets = Assets::new();
    assets.logo("ExampleWTF_logo.png", 200, 100, 0);

    let desc = assets
        .builder()
        .build(&Brand::new("ExampleWTF"), FrameSize::new(720, 1280))
        .unwrap();

    assert_eq!(desc.orientation, Orientation::Tall);
    assert_eq!(desc.overlay_count(), 1);
    assert_eq!(desc.terminal_count(), 1);
    assert_eq!(desc.layers, vec!["logo"]);
    assert!(desc.had_layers);

    // 0.15 * 720 = 108 wide, aspect kept: 108 * 100 / 200 = 54
    assert!(desc.filter_complex.contains("scale=108:54"));
    assert!(desc.filter_complex.ends_with("overlay=W-w-40:H-h-40[vout]"));
    assert!(!desc.filter_complex.contains("[wm]"));
    assert!(!desc.filter_complex.contains("_watermark"));
    assert!(!desc.filter_complex.contains("geq="));
    // transparent logo needs no keying
    assert!(!desc.filter_complex.contains("colorkey"));
}

#[test]
fn test_opaque_logo_is_keyed() {
    let assets = Assets::new();
    assets.logo("Opaque_logo.png", 100, 100, 255);

    let desc = assets
        .builder()
        .build(&Brand::new("Opaque"), FrameSize::new(1080, 1920))
        .unwrap();

    assert!(desc.filter_complex.contains("scale=162:162,format=rgba,colorkey=black:0.1:0.1[logo]"));
}

#[test]
fn test_no_assets_no_text_is_passthrough() {
    let assets = Assets::new();
    let desc = assets
        .builder()
        .build(&Brand::new("Unknown"), FrameSize::new(1920, 1080))
        .unwrap();

    assert_eq!(desc.filter_complex, "[0:v]null[vout]");
    assert_eq!(desc.terminal_count(), 1);
    assert!(desc.is_passthrough());
    assert!(!desc.had_layers);
    assert!(matches!(
        desc.nodes(),
        [FilterNode::Passthrough {
            input: Pad::Input,
            output: Pad::Terminal
        }]
    ));
}

#[test]
fn test_disabled_or_blank_text_is_skipped() {
    let assets = Assets::new();
    let blank = Brand::new("Quiet").with_text(text("   "));
    let mut disabled_layer = text("Hello");
    disabled_layer.enabled = false;
    let disabled = Brand::new("Quiet").with_text(disabled_layer);

    for brand in [blank, disabled] {
        let desc = assets.builder().build(&brand, FrameSize::new(1080, 1920)).unwrap();
        assert!(desc.is_passthrough());
    }
}

#[rstest]
#[case(true, false, false, 1)]
#[case(false, true, false, 1)]
#[case(true, false, true, 2)]
#[case(false, true, true, 2)]
#[case(true, true, true, 3)]
fn test_layer_ops_match_resolved_layers(
    #[case] watermark: bool,
    #[case] logo: bool,
    #[case] with_text: bool,
    #[case] expected_ops: usize,
) {
    let assets = Assets::new();
    if watermark {
        assets.watermark(Orientation::Tall, "Layered_watermark.png");
    }
    if logo {
        assets.logo("Layered_logo.png", 50, 50, 0);
    }
    let mut brand = Brand::new("Layered");
    if with_text {
        brand = brand.with_text(text("Follow us"));
    }

    let desc = assets.builder().build(&brand, FrameSize::new(1080, 1920)).unwrap();

    assert_eq!(desc.composite_ops(), expected_ops);
    assert_eq!(desc.terminal_count(), 1);
    assert_eq!(desc.filter_complex.matches("[vout]").count(), 1);
}

#[test]
fn test_layer_order_is_watermark_logo_text() {
    let assets = Assets::new();
    assets.watermark(Orientation::Square, "Ordered_watermark.png");
    assets.logo("Ordered_logo.png", 50, 50, 0);
    let brand = Brand::new("Ordered").with_text(text("Hi"));

    let desc = assets.builder().build(&brand, FrameSize::new(1080, 1080)).unwrap();
    let fc = &desc.filter_complex;

    let wm = fc.find("[0:v][wm]overlay").unwrap();
    let logo = fc.find("[v1][logo]overlay").unwrap();
    let text = fc.find("[v2]drawtext=").unwrap();
    assert!(wm < logo && logo < text);
    assert!(fc.ends_with("[vout]"));
    assert_eq!(desc.layers, vec!["watermark", "logo", "text"]);
}

#[test]
fn test_build_is_deterministic() {
    let assets = Assets::new();
    assets.watermark(Orientation::Wide, "Same_watermark.png");
    assets.logo("Same_logo.png", 80, 40, 0);
    let brand = Brand::new("Same").with_text(text("Repeat: 100% 'quoted'"));
    let builder = assets.builder();
    let frame = FrameSize::new(1920, 1080);

    let first = builder.build(&brand, frame).unwrap();
    let second = builder.build(&brand, frame).unwrap();
    assert_eq!(first.filter_complex, second.filter_complex);
    assert_eq!(first.assets, second.assets);
}

#[rstest]
#[case("Don't miss", r"text='Don\'\''t miss'")]
#[case("100% real", r"text='100\\% real'")]
#[case("Time: 10am", r"text='Time\: 10am'")]
#[case("Watch [vout] now", r"text='Watch [vout] now'")]
#[case(r"C:\promo", r"text='C\:\\\\promo'")]
fn test_text_is_quoted_for_the_filtergraph(#[case] content: &str, #[case] expected: &str) {
    let assets = Assets::new();
    let brand = Brand::new("Quoted").with_text(text(content));

    let desc = assets.builder().build(&brand, FrameSize::new(1080, 1920)).unwrap();

    assert_eq!(
        desc.filter_complex,
        format!(
            "[0:v]drawtext={}:fontsize=48:fontcolor=#FFFFFF:x=(w-text_w)/2:y=h-text_h-40[vout]",
            expected
        )
    );
    assert_eq!(desc.terminal_count(), 1);
}

#[test]
fn test_stored_asset_path_with_apostrophe_is_quoted() {
    let assets = Assets::new();
    let stored = assets.dir.path().join("custom/it's_logo.png");
    write_png(&stored, 50, 50, 0);
    let brand = Brand::new("Stored").with_logo("custom/it's_logo.png");

    let desc = assets.builder().build(&brand, FrameSize::new(1080, 1920)).unwrap();

    let root = assets.dir.path().display().to_string();
    assert_eq!(
        desc.filter_complex,
        format!(
            r"movie='{}/custom/it\'\''s_logo.png',scale=162:162,format=rgba[logo];[0:v][logo]overlay=W-w-40:H-h-40[vout]",
            root
        )
    );
    assert_eq!(desc.assets, vec![stored]);
}

#[test]
fn test_watermark_follows_orientation() {
    let assets = Assets::new();
    let tall = assets.watermark(Orientation::Tall, "Multi_watermark.png");
    let wide = assets.watermark(Orientation::Wide, "Multi_watermark.png");
    let builder = assets.builder();
    let brand = Brand::new("Multi");

    let desc = builder.build(&brand, FrameSize::new(1080, 1920)).unwrap();
    assert_eq!(desc.assets, vec![tall]);

    let desc = builder.build(&brand, FrameSize::new(1920, 1080)).unwrap();
    assert_eq!(desc.assets, vec![wide]);
    assert!(desc.filter_complex.contains("scale=2208:1242"));

    // no square asset
    let desc = builder.build(&brand, FrameSize::new(1080, 1080)).unwrap();
    assert!(desc.is_passthrough());
}

#[test]
fn test_convention_fallback_for_tall_watermark() {
    let assets = Assets::new();
    let expected = assets.watermark(Orientation::Tall, "Fallback_watermark.png");
    let resolver = AssetResolver::new(assets.layout.clone());

    let found = resolver
        .resolve_watermark(&Brand::new("FallbackWTF"), Orientation::Tall)
        .unwrap()
        .unwrap();
    assert_eq!(found.path, expected);
    assert_eq!(found.source, AssetSource::Convention);
}

#[test]
fn test_stored_reference_wins_and_stale_reference_falls_back() {
    let assets = Assets::new();
    let convention = assets.watermark(Orientation::Tall, "Stored_watermark.png");
    let custom = assets.dir.path().join("custom/stored-tall.png");
    write_png(&custom, 10, 10, 255);
    let resolver = AssetResolver::new(assets.layout.clone());

    let brand = Brand::new("Stored").with_watermark(Orientation::Tall, "custom/stored-tall.png");
    let found = resolver.resolve_watermark(&brand, Orientation::Tall).unwrap().unwrap();
    assert_eq!(found.path, custom);
    assert_eq!(found.source, AssetSource::Stored);

    let stale = Brand::new("Stored").with_watermark(Orientation::Tall, "custom/gone.png");
    let found = resolver.resolve_watermark(&stale, Orientation::Tall).unwrap().unwrap();
    assert_eq!(found.path, convention);
    assert_eq!(found.source, AssetSource::Convention);
}

#[test]
fn test_malformed_brand_is_fatal() {
    let assets = Assets::new();
    let err = assets
        .builder()
        .build(&Brand::new("  "), FrameSize::new(1080, 1920))
        .unwrap_err();
    assert!(matches!(err, BuildError::Asset(_)));
    assert!(err.to_string().starts_with("Malformed brand"));
}

#[test]
fn test_invalid_frame_is_rejected() {
    let assets = Assets::new();
    let err = assets
        .builder()
        .build(&Brand::new("Any"), FrameSize::new(1080, 0))
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::InvalidFrame {
            width: 1080,
            height: 0
        }
    );
}

/// Appends two terminal-labelled nodes.
struct DoubleTerminal;

impl LayerStage for DoubleTerminal {
    fn name(&self) -> &str {
        "double-terminal"
    }

    fn apply(&self, _ctx: &BuildContext<'_>, graph: &mut FilterGraph) -> Result<bool, BuildError> {
        for _ in 0..2 {
            graph.push(FilterNode::Passthrough {
                input: Pad::Input,
                output: Pad::Terminal,
            });
        }
        Ok(true)
    }
}

#[test]
fn test_two_terminals_fail_the_build() {
    let assets = Assets::new();
    assets.logo("Faulty_logo.png", 50, 50, 0);
    let builder = assets.builder().with_stage(DoubleTerminal);

    let err = builder
        .build(&Brand::new("Faulty"), FrameSize::new(1080, 1920))
        .unwrap_err();

    match &err {
        BuildError::TerminalCount { found, attempted } => {
            assert_eq!(*found, 2);
            assert_eq!(attempted, &vec!["watermark", "logo", "text", "double-terminal"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("double-terminal"));
}

/// Appends a stage that reports a layer but leaves the graph alone.
struct SilentStage;

impl LayerStage for SilentStage {
    fn name(&self) -> &str {
        "silent"
    }

    fn apply(&self, _ctx: &BuildContext<'_>, _graph: &mut FilterGraph) -> Result<bool, BuildError> {
        Ok(false)
    }
}

#[test]
fn test_extra_stage_that_skips_keeps_single_terminal() {
    let assets = Assets::new();
    let builder = assets.builder().with_stage(SilentStage);
    assert_eq!(builder.stage_names(), vec!["watermark", "logo", "text", "silent"]);

    let desc = builder
        .build(&Brand::new("Plain"), FrameSize::new(1080, 1920))
        .unwrap();
    assert_eq!(desc.terminal_count(), 1);
    assert!(desc.is_passthrough());
}
