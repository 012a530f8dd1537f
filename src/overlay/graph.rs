//! Typed filter graph.
//!
//! The pipeline is kept as a list of operation nodes connected by pads.
//! Composite nodes (overlay, drawtext, passthrough) advance the "current"
//! pad; load nodes produce a side layer that a later overlay consumes.
//! `mark_final` relabels the last composite output as the terminal pad, so
//! the terminal is assigned on the node itself rather than patched into
//! the rendered string.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{INPUT_LABEL, TERMINAL_LABEL};

use super::geometry::Coord;
use super::text::{quote_filter_value, TextStyle};

/// A stream pad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pad {
    /// The source video stream
    Input,
    /// A named intermediate
    Label(String),
    /// The single output consumed by the engine
    Terminal,
}

impl Pad {
    pub fn label(name: impl Into<String>) -> Self {
        Pad::Label(name.into())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Pad::Terminal)
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pad::Input => write!(f, "[{}]", INPUT_LABEL),
            Pad::Label(name) => write!(f, "[{}]", name),
            Pad::Terminal => write!(f, "[{}]", TERMINAL_LABEL),
        }
    }
}

/// Chroma key applied to a loaded layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorKey {
    pub color: String,
    pub similarity: f64,
    pub blend: f64,
}

impl ColorKey {
    /// Solid black background removal.
    pub fn black() -> Self {
        Self {
            color: "black".to_string(),
            similarity: 0.1,
            blend: 0.1,
        }
    }
}

/// One compositing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// Load an image asset, scale it and convert to RGBA
    LoadImage {
        path: PathBuf,
        width: u32,
        /// `None` keeps the aspect ratio (engine picks an even height)
        height: Option<u32>,
        /// Alpha-channel expression applied after the format conversion
        alpha: Option<String>,
        colorkey: Option<ColorKey>,
        output: Pad,
    },
    /// Overlay `layer` atop `base`
    Overlay {
        base: Pad,
        layer: Pad,
        x: Coord,
        y: Coord,
        output: Pad,
    },
    /// Draw text atop `input`
    DrawText {
        input: Pad,
        style: TextStyle,
        x: Coord,
        y: Coord,
        output: Pad,
    },
    /// Identity copy of `input`
    Passthrough { input: Pad, output: Pad },
}

impl FilterNode {
    pub fn output(&self) -> &Pad {
        match self {
            FilterNode::LoadImage { output, .. }
            | FilterNode::Overlay { output, .. }
            | FilterNode::DrawText { output, .. }
            | FilterNode::Passthrough { output, .. } => output,
        }
    }

    fn output_mut(&mut self) -> &mut Pad {
        match self {
            FilterNode::LoadImage { output, .. }
            | FilterNode::Overlay { output, .. }
            | FilterNode::DrawText { output, .. }
            | FilterNode::Passthrough { output, .. } => output,
        }
    }

    pub fn inputs(&self) -> Vec<&Pad> {
        match self {
            FilterNode::LoadImage { .. } => Vec::new(),
            FilterNode::Overlay { base, layer, .. } => vec![base, layer],
            FilterNode::DrawText { input, .. } | FilterNode::Passthrough { input, .. } => {
                vec![input]
            }
        }
    }

    /// Composite nodes advance the running layer; loads do not.
    pub fn is_composite(&self) -> bool {
        !matches!(self, FilterNode::LoadImage { .. })
    }

    /// Overlay and drawtext count as composite operations; passthrough does not.
    pub fn is_layer_op(&self) -> bool {
        matches!(
            self,
            FilterNode::Overlay { .. } | FilterNode::DrawText { .. }
        )
    }

    pub fn asset_path(&self) -> Option<&Path> {
        match self {
            FilterNode::LoadImage { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Render as one filtergraph clause.
    pub fn render(&self) -> String {
        match self {
            FilterNode::LoadImage {
                path,
                width,
                height,
                alpha,
                colorkey,
                output,
            } => {
                let height = height.map_or_else(|| "-2".to_string(), |h| h.to_string());
                let mut clause = format!(
                    "movie={},scale={}:{},format=rgba",
                    quote_filter_value(&path.to_string_lossy()),
                    width,
                    height
                );
                if let Some(alpha) = alpha {
                    clause.push_str(&format!(
                        ",geq=r='r(X,Y)':g='g(X,Y)':b='b(X,Y)':a='{}'",
                        alpha
                    ));
                }
                if let Some(key) = colorkey {
                    clause.push_str(&format!(
                        ",colorkey={}:{}:{}",
                        key.color, key.similarity, key.blend
                    ));
                }
                format!("{}{}", clause, output)
            }
            FilterNode::Overlay {
                base,
                layer,
                x,
                y,
                output,
            } => format!("{}{}overlay={}:{}{}", base, layer, x, y, output),
            FilterNode::DrawText {
                input,
                style,
                x,
                y,
                output,
            } => {
                let mut clause = format!("{}drawtext={}:x={}:y={}", input, style.render_options(), x, y);
                if let Some(bx) = style.render_box() {
                    clause.push(':');
                    clause.push_str(&bx);
                }
                format!("{}{}", clause, output)
            }
            FilterNode::Passthrough { input, output } => format!("{}null{}", input, output),
        }
    }
}

/// Ordered operation list with a running "current layer" pad.
#[derive(Debug, Clone)]
pub struct FilterGraph {
    nodes: Vec<FilterNode>,
    current: Pad,
    next_intermediate: usize,
}

impl Default for FilterGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            current: Pad::Input,
            next_intermediate: 1,
        }
    }

    /// The pad the next composite operation should read from.
    pub fn current(&self) -> &Pad {
        &self.current
    }

    /// Allocate the next intermediate pad (`v1`, `v2`, ...).
    pub fn next_pad(&mut self) -> Pad {
        let pad = Pad::Label(format!("v{}", self.next_intermediate));
        self.next_intermediate += 1;
        pad
    }

    pub fn push(&mut self, node: FilterNode) {
        if node.is_composite() {
            self.current = node.output().clone();
        }
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether any layer operation was appended.
    pub fn has_layers(&self) -> bool {
        self.nodes.iter().any(FilterNode::is_layer_op)
    }

    /// Label the final layer as the terminal. With no layers, append a
    /// passthrough from the input instead. Returns whether layers existed.
    pub fn mark_final(&mut self) -> bool {
        let had_layers = self.has_layers();

        let last = self
            .nodes
            .iter()
            .rposition(|n| n.is_composite() && *n.output() == self.current);

        match last {
            Some(index) => *self.nodes[index].output_mut() = Pad::Terminal,
            None => self.nodes.push(FilterNode::Passthrough {
                input: Pad::Input,
                output: Pad::Terminal,
            }),
        }

        self.current = Pad::Terminal;
        had_layers
    }

    /// Occurrences of the terminal pad across all node inputs and outputs.
    pub fn terminal_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| {
                n.inputs().into_iter().filter(|p| p.is_terminal()).count()
                    + usize::from(n.output().is_terminal())
            })
            .sum()
    }

    /// Asset paths in load order.
    pub fn assets(&self) -> Vec<PathBuf> {
        self.nodes
            .iter()
            .filter_map(|n| n.asset_path().map(Path::to_path_buf))
            .collect()
    }

    pub fn clauses(&self) -> Vec<String> {
        self.nodes.iter().map(FilterNode::render).collect()
    }

    /// Semicolon-joined filtergraph description.
    pub fn render(&self) -> String {
        self.clauses().join(";")
    }
}
