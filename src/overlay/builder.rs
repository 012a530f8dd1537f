//! Pipeline builder.
//!
//! Composes resolver and geometry output into a validated filter graph.
//! Layers are applied by stages in a fixed order:
//!
//! 1. watermark (orientation-specific, full frame, alpha-scaled)
//! 2. logo (bottom-right, background keyed when needed)
//! 3. text (drawtext with optional box)
//!
//! Each stage composites atop the running result of the previous ones.
//! Extra stages registered with [`PipelineBuilder::with_stage`] run after
//! the standard three.

use std::fmt;
use std::path::PathBuf;

use crate::brand::Brand;
use crate::constants::{LOGO_LABEL, TERMINAL_LABEL, WATERMARK_LABEL};

use super::assets::AssetResolver;
use super::error::BuildError;
use super::geometry::{
    compute_logo_geometry, compute_text_geometry, compute_watermark_geometry, Coord, FrameSize,
};
use super::graph::{ColorKey, FilterGraph, FilterNode, Pad};
use super::text::TextStyle;
use super::Orientation;

/// Inputs shared by every stage of one build.
pub struct BuildContext<'a> {
    pub brand: &'a Brand,
    pub frame: FrameSize,
    pub orientation: Orientation,
    pub resolver: &'a AssetResolver,
}

/// One layer of the pipeline.
pub trait LayerStage: Send + Sync {
    fn name(&self) -> &str;

    /// Append this layer's nodes. Returns `false` when the layer was skipped.
    fn apply(&self, ctx: &BuildContext<'_>, graph: &mut FilterGraph) -> Result<bool, BuildError>;
}

/// Full-frame watermark for the frame's orientation.
#[derive(Debug, Default, Clone, Copy)]
pub struct WatermarkStage;

impl LayerStage for WatermarkStage {
    fn name(&self) -> &str {
        "watermark"
    }

    fn apply(&self, ctx: &BuildContext<'_>, graph: &mut FilterGraph) -> Result<bool, BuildError> {
        let asset = match ctx.resolver.resolve_watermark(ctx.brand, ctx.orientation)? {
            Some(asset) => asset,
            None => return Ok(false),
        };

        let params = &ctx.brand.params;
        let geometry =
            compute_watermark_geometry(ctx.frame, params.watermark_scale, params.watermark_opacity);

        let layer = Pad::label(WATERMARK_LABEL);
        graph.push(FilterNode::LoadImage {
            path: asset.path,
            width: geometry.draw_w,
            height: Some(geometry.draw_h),
            alpha: Some(geometry.alpha_expr),
            colorkey: None,
            output: layer.clone(),
        });

        let base = graph.current().clone();
        let output = graph.next_pad();
        graph.push(FilterNode::Overlay {
            base,
            layer,
            x: Coord::Px(geometry.offset_x),
            y: Coord::Px(geometry.offset_y),
            output,
        });

        Ok(true)
    }
}

/// Bottom-right logo.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogoStage;

impl LayerStage for LogoStage {
    fn name(&self) -> &str {
        "logo"
    }

    fn apply(&self, ctx: &BuildContext<'_>, graph: &mut FilterGraph) -> Result<bool, BuildError> {
        let asset = match ctx.resolver.resolve_logo(ctx.brand)? {
            Some(asset) => asset,
            None => return Ok(false),
        };

        let inspection = ctx
            .resolver
            .inspect_logo(&asset.path, ctx.brand.logo_background);
        let params = &ctx.brand.params;
        let geometry = compute_logo_geometry(
            ctx.frame,
            params.logo_scale,
            params.logo_padding,
            inspection.dimensions,
        );

        let layer = Pad::label(LOGO_LABEL);
        graph.push(FilterNode::LoadImage {
            path: asset.path,
            width: geometry.draw_w,
            height: geometry.draw_h,
            alpha: None,
            colorkey: inspection.chroma_key.then(ColorKey::black),
            output: layer.clone(),
        });

        let base = graph.current().clone();
        let output = graph.next_pad();
        graph.push(FilterNode::Overlay {
            base,
            layer,
            x: geometry.x(),
            y: geometry.y(),
            output,
        });

        Ok(true)
    }
}

/// Optional text layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextStage;

impl LayerStage for TextStage {
    fn name(&self) -> &str {
        "text"
    }

    fn apply(&self, ctx: &BuildContext<'_>, graph: &mut FilterGraph) -> Result<bool, BuildError> {
        let text = &ctx.brand.text;
        if !text.is_drawable() {
            return Ok(false);
        }

        let geometry = compute_text_geometry(text.position, text.margin);
        let input = graph.current().clone();
        let output = graph.next_pad();
        graph.push(FilterNode::DrawText {
            input,
            style: TextStyle::from_layer(text),
            x: geometry.x,
            y: geometry.y,
            output,
        });

        Ok(true)
    }
}

/// A validated pipeline, ready for the compositing engine.
#[derive(Debug, Clone)]
pub struct PipelineDescription {
    /// Semicolon-joined filtergraph, ending in exactly one terminal label
    pub filter_complex: String,
    /// Asset files referenced by the description, in load order
    pub assets: Vec<PathBuf>,
    /// Names of the stages that appended a layer
    pub layers: Vec<String>,
    pub orientation: Orientation,
    pub frame: FrameSize,
    pub had_layers: bool,
    graph: FilterGraph,
}

impl PipelineDescription {
    /// Terminal label the engine should map.
    pub fn terminal(&self) -> &'static str {
        TERMINAL_LABEL
    }

    pub fn nodes(&self) -> &[FilterNode] {
        self.graph.nodes()
    }

    /// Overlay and drawtext operations.
    pub fn composite_ops(&self) -> usize {
        self.graph.nodes().iter().filter(|n| n.is_layer_op()).count()
    }

    pub fn overlay_count(&self) -> usize {
        self.graph
            .nodes()
            .iter()
            .filter(|n| matches!(n, FilterNode::Overlay { .. }))
            .count()
    }

    pub fn terminal_count(&self) -> usize {
        self.graph.terminal_count()
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self.graph.nodes().last(), Some(FilterNode::Passthrough { .. })) && !self.had_layers
    }
}

impl fmt::Display for PipelineDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filter_complex)
    }
}

/// Builds pipeline descriptions. Holds no per-build state, so one builder
/// can serve concurrent builds.
pub struct PipelineBuilder {
    resolver: AssetResolver,
    stages: Vec<Box<dyn LayerStage>>,
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("resolver", &self.resolver)
            .field(
                "stages",
                &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl PipelineBuilder {
    pub fn new(resolver: AssetResolver) -> Self {
        Self {
            resolver,
            stages: vec![
                Box::new(WatermarkStage),
                Box::new(LogoStage),
                Box::new(TextStage),
            ],
        }
    }

    /// Append a stage after the standard ones.
    pub fn with_stage(mut self, stage: impl LayerStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn resolver(&self) -> &AssetResolver {
        &self.resolver
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn build(&self, brand: &Brand, frame: FrameSize) -> Result<PipelineDescription, BuildError> {
        if !frame.is_valid() {
            return Err(BuildError::InvalidFrame {
                width: frame.width,
                height: frame.height,
            });
        }

        let orientation = frame.orientation();
        let ctx = BuildContext {
            brand,
            frame,
            orientation,
            resolver: &self.resolver,
        };

        let mut graph = FilterGraph::new();
        let mut attempted = Vec::with_capacity(self.stages.len());
        let mut layers = Vec::new();

        for stage in &self.stages {
            attempted.push(stage.name().to_string());
            if stage.apply(&ctx, &mut graph)? {
                layers.push(stage.name().to_string());
            } else {
                tracing::debug!(brand = %brand.name, stage = stage.name(), %orientation, "layer skipped");
            }
        }

        let had_layers = graph.mark_final();

        // Counted on the typed graph: quoted values may contain the label text.
        let found = graph.terminal_count();
        if found != 1 {
            return Err(BuildError::TerminalCount { found, attempted });
        }
        let filter_complex = graph.render();

        tracing::debug!(
            brand = %brand.name,
            %frame,
            %orientation,
            layers = ?layers,
            "pipeline built"
        );

        Ok(PipelineDescription {
            filter_complex,
            assets: graph.assets(),
            layers,
            orientation,
            frame,
            had_layers,
            graph,
        })
    }
}
