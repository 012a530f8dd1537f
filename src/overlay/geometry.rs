//! Overlay geometry.
//!
//! Pixel sizes and anchor offsets for each layer, computed from the frame
//! size and the brand's parameters.
//!
//! # Layers
//!
//! - **Watermark**: full frame, overscaled by a multiplier and centered so the
//!   excess bleeds off all four edges equally.
//! - **Logo**: a fraction of the frame width, anchored bottom-right with a
//!   fixed padding. Height follows the asset's aspect ratio.
//! - **Text**: horizontally centered; vertical anchor from the text position.
//!
//! # Example
//!
//! ```
//! use brandmark::overlay::geometry::{compute_watermark_geometry, FrameSize};
//!
//! let geometry = compute_watermark_geometry(FrameSize::new(1080, 1920), 1.15, 0.4);
//! assert_eq!((geometry.draw_w, geometry.draw_h), (1242, 2208));
//! assert_eq!((geometry.offset_x, geometry.offset_y), (-81, -144)); // centered overscale
//! ```
//!
//! Scaled dimensions are always even: the encoder rejects odd widths and
//! heights for yuv420p output.

use crate::brand::TextPosition;
use crate::constants::{DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, MIN_LAYER_DIMENSION};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Orientation;

/// Pixel dimensions of the (normalized) source frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 1080x1920 portrait, substituted when probing fails.
    pub fn default_portrait() -> Self {
        Self::new(DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::classify(self.width, self.height)
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::default_portrait()
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel dimensions of an image asset, read from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetDimensions {
    pub width: u32,
    pub height: u32,
}

/// An overlay coordinate: absolute pixels or an engine-evaluated expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coord {
    Px(i64),
    Expr(String),
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coord::Px(v) => write!(f, "{}", v),
            Coord::Expr(e) => f.write_str(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkGeometry {
    pub draw_w: u32,
    pub draw_h: u32,
    pub offset_x: i64,
    pub offset_y: i64,
    /// Per-pixel alpha expression: source alpha scaled by the opacity
    pub alpha_expr: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogoGeometry {
    pub draw_w: u32,
    /// Known only when the asset's dimensions could be read
    pub draw_h: Option<u32>,
    pub padding: u32,
    pub offset_x: i64,
    pub offset_y: Option<i64>,
}

impl LogoGeometry {
    /// Frame-relative x anchor, equal to `offset_x` once the engine scales.
    pub fn x(&self) -> Coord {
        Coord::Expr(format!("W-w-{}", self.padding))
    }

    pub fn y(&self) -> Coord {
        Coord::Expr(format!("H-h-{}", self.padding))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextGeometry {
    pub x: Coord,
    pub y: Coord,
}

/// Round to the nearest pixel, drop to even, never below the minimum.
pub fn even_dimension(value: f64) -> u32 {
    let rounded = if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    };
    (rounded & !1).max(MIN_LAYER_DIMENSION)
}

/// Shortest decimal form of a 0-1 scalar, at most three places.
pub fn format_scalar(value: f64) -> String {
    let s = format!("{:.3}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Full-frame watermark, overscaled and centered.
pub fn compute_watermark_geometry(frame: FrameSize, scale: f64, opacity: f64) -> WatermarkGeometry {
    let draw_w = even_dimension(frame.width as f64 * scale);
    let draw_h = even_dimension(frame.height as f64 * scale);

    // 1242 - 1080 = 162 -> -81
    let offset_x = -((draw_w as i64 - frame.width as i64) / 2);
    let offset_y = -((draw_h as i64 - frame.height as i64) / 2);

    WatermarkGeometry {
        draw_w,
        draw_h,
        offset_x,
        offset_y,
        alpha_expr: format!("{}*alpha(X,Y)", format_scalar(opacity.clamp(0.0, 1.0))),
    }
}

/// Bottom-right logo.
pub fn compute_logo_geometry(
    frame: FrameSize,
    logo_scale: f64,
    padding: u32,
    source: Option<AssetDimensions>,
) -> LogoGeometry {
    let draw_w = even_dimension(frame.width as f64 * logo_scale);

    let draw_h = source
        .filter(|s| s.width > 0 && s.height > 0)
        .map(|s| even_dimension(draw_w as f64 * s.height as f64 / s.width as f64));

    let offset_x = frame.width as i64 - draw_w as i64 - padding as i64;
    let offset_y = draw_h.map(|h| frame.height as i64 - h as i64 - padding as i64);

    LogoGeometry {
        draw_w,
        draw_h,
        padding,
        offset_x,
        offset_y,
    }
}

/// Text anchor. Text height is only known to the engine, so vertical
/// anchors other than `top` are expressions.
pub fn compute_text_geometry(position: TextPosition, margin: u32) -> TextGeometry {
    let y = match position {
        TextPosition::Top => Coord::Px(margin as i64),
        TextPosition::Center => Coord::Expr("(h-text_h)/2".to_string()),
        TextPosition::Bottom => Coord::Expr(format!("h-text_h-{}", margin)),
    };

    TextGeometry {
        x: Coord::Expr("(w-text_w)/2".to_string()),
        y,
    }
}
