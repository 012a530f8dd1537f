//! Brand records.
//!
//! A brand is a named visual identity: up to three orientation-specific
//! watermark assets, one logo, an optional text layer and the numeric
//! parameters that drive overlay geometry.
//!
//! Brands are stored in YAML like this:
//!
//! ```yaml
//! brands:
//!   - name: ExampleWTF
//!     display_name: Example
//!     ownership: { kind: system }
//!     locked: true
//!     watermarks:
//!       tall: Watermarks/Vertical_HD/Example_watermark.png
//!     logo: Logos/Circle/ExampleWTF_logo.png
//!     params:
//!       watermark_opacity: 0.35
//!     text:
//!       enabled: true
//!       content: "Follow for more"
//!       position: bottom
//! ```

pub mod seed;
pub mod store;

pub use store::{BrandRegistry, BrandStore, BrandStoreError, MemoryBrandStore};

use crate::constants::{
    DEFAULT_LOGO_PADDING, DEFAULT_LOGO_SCALE, DEFAULT_TEXT_BG_COLOR, DEFAULT_TEXT_BG_OPACITY,
    DEFAULT_TEXT_COLOR, DEFAULT_TEXT_MARGIN, DEFAULT_TEXT_SIZE, DEFAULT_WATERMARK_OPACITY,
    DEFAULT_WATERMARK_SCALE,
};
use crate::overlay::Orientation;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn default_true() -> bool {
    true
}

fn default_watermark_scale() -> f64 {
    DEFAULT_WATERMARK_SCALE
}

fn default_watermark_opacity() -> f64 {
    DEFAULT_WATERMARK_OPACITY
}

fn default_logo_scale() -> f64 {
    DEFAULT_LOGO_SCALE
}

fn default_logo_padding() -> u32 {
    DEFAULT_LOGO_PADDING
}

fn default_text_size() -> u32 {
    DEFAULT_TEXT_SIZE
}

fn default_text_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}

fn default_text_bg_color() -> String {
    DEFAULT_TEXT_BG_COLOR.to_string()
}

fn default_text_bg_opacity() -> f64 {
    DEFAULT_TEXT_BG_OPACITY
}

fn default_text_margin() -> u32 {
    DEFAULT_TEXT_MARGIN
}

fn slug_regex() -> &'static Regex {
    static SLUG: OnceLock<Regex> = OnceLock::new();
    SLUG.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 _.\-]*$").expect("valid slug regex"))
}

/// Who owns a brand record. System and user ownership are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Ownership {
    /// Seeded from the master asset directory
    #[default]
    System,
    /// Created by a user account
    User { user_id: u64 },
}

/// How the logo's background is removed before compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoBackground {
    /// Inspect the asset: keep alpha if present, otherwise chroma-key black
    #[default]
    Auto,
    /// Always key out a solid black background
    ChromaKey,
    /// The asset already carries transparency
    Transparent,
}

/// Stored watermark references, one per orientation class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tall: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wide: Option<PathBuf>,
}

impl WatermarkSlots {
    pub fn get(&self, orientation: Orientation) -> Option<&Path> {
        match orientation {
            Orientation::Tall => self.tall.as_deref(),
            Orientation::Square => self.square.as_deref(),
            Orientation::Wide => self.wide.as_deref(),
        }
    }

    pub fn set(&mut self, orientation: Orientation, path: Option<PathBuf>) {
        match orientation {
            Orientation::Tall => self.tall = path,
            Orientation::Square => self.square = path,
            Orientation::Wide => self.wide = path,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tall.is_none() && self.square.is_none() && self.wide.is_none()
    }
}

/// Numeric overlay parameters shared by watermark and logo layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayParams {
    /// Watermark overscale multiplier (1.0 = exactly frame size)
    #[serde(default = "default_watermark_scale")]
    pub watermark_scale: f64,

    /// Watermark opacity (0.0 - 1.0)
    #[serde(default = "default_watermark_opacity")]
    pub watermark_opacity: f64,

    /// Logo width as a fraction of the frame width
    #[serde(default = "default_logo_scale")]
    pub logo_scale: f64,

    /// Logo padding from the bottom-right corner in pixels
    #[serde(default = "default_logo_padding")]
    pub logo_padding: u32,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            watermark_scale: DEFAULT_WATERMARK_SCALE,
            watermark_opacity: DEFAULT_WATERMARK_OPACITY,
            logo_scale: DEFAULT_LOGO_SCALE,
            logo_padding: DEFAULT_LOGO_PADDING,
        }
    }
}

impl OverlayParams {
    pub fn validate(&self) -> Result<(), String> {
        if !self.watermark_scale.is_finite() || self.watermark_scale <= 0.0 {
            return Err(format!(
                "watermark_scale must be a finite value greater than 0, got {}",
                self.watermark_scale
            ));
        }

        if !self.watermark_opacity.is_finite() || !(0.0..=1.0).contains(&self.watermark_opacity) {
            return Err(format!(
                "watermark_opacity must be a finite value between 0.0 and 1.0, got {}",
                self.watermark_opacity
            ));
        }

        if !self.logo_scale.is_finite() || self.logo_scale <= 0.0 || self.logo_scale > 1.0 {
            return Err(format!(
                "logo_scale must be a finite value in (0.0, 1.0], got {}",
                self.logo_scale
            ));
        }

        Ok(())
    }
}

/// Per-request replacements for individual overlay parameters. Unset
/// fields keep the brand's own value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark_scale: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark_opacity: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_scale: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_padding: Option<u32>,
}

impl ParamOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply(&self, base: &OverlayParams) -> OverlayParams {
        OverlayParams {
            watermark_scale: self.watermark_scale.unwrap_or(base.watermark_scale),
            watermark_opacity: self.watermark_opacity.unwrap_or(base.watermark_opacity),
            logo_scale: self.logo_scale.unwrap_or(base.logo_scale),
            logo_padding: self.logo_padding.unwrap_or(base.logo_padding),
        }
    }

    /// Check the set fields against the same bounds as [`OverlayParams`].
    pub fn validate(&self) -> Result<(), String> {
        self.apply(&OverlayParams::default()).validate()
    }
}

/// Vertical anchor of the text layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    Top,
    Center,
    #[default]
    Bottom,
}

/// Box drawn behind the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBackground {
    #[serde(default = "default_text_bg_color")]
    pub color: String,
    #[serde(default = "default_text_bg_opacity")]
    pub opacity: f64,
}

impl Default for TextBackground {
    fn default() -> Self {
        Self {
            color: default_text_bg_color(),
            opacity: default_text_bg_opacity(),
        }
    }
}

/// Optional text drawn over the composited video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub position: TextPosition,

    #[serde(default = "default_text_size")]
    pub font_size: u32,

    #[serde(default = "default_text_color")]
    pub color: String,

    /// Font file handed to the engine; the engine default is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<TextBackground>,

    #[serde(default = "default_text_margin")]
    pub margin: u32,
}

impl Default for TextLayer {
    fn default() -> Self {
        Self {
            enabled: false,
            content: String::new(),
            position: TextPosition::default(),
            font_size: DEFAULT_TEXT_SIZE,
            color: default_text_color(),
            font_file: None,
            background: None,
            margin: DEFAULT_TEXT_MARGIN,
        }
    }
}

impl TextLayer {
    /// True when the layer should be drawn: enabled with non-blank content.
    pub fn is_drawable(&self) -> bool {
        self.enabled && !self.content.trim().is_empty()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.font_size == 0 {
            return Err("text font_size must be greater than 0".to_string());
        }

        validate_color("text color", &self.color)?;

        if let Some(bg) = &self.background {
            validate_color("text background color", &bg.color)?;
            if !bg.opacity.is_finite() || !(0.0..=1.0).contains(&bg.opacity) {
                return Err(format!(
                    "text background opacity must be a finite value between 0.0 and 1.0, got {}",
                    bg.opacity
                ));
            }
        }

        Ok(())
    }
}

/// Accepts `#RGB`, `#RRGGBB` or a bare colour name such as `white`.
pub fn validate_color(field: &str, value: &str) -> Result<(), String> {
    if let Some(hex_part) = value.strip_prefix('#') {
        let len = hex_part.len();
        if (len != 3 && len != 6) || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!(
                "{} must be in #RGB or #RRGGBB format with valid hex characters, got '{}'",
                field, value
            ));
        }
        return Ok(());
    }

    if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!(
            "{} must be a hex string starting with '#' or a colour name, got '{}'",
            field, value
        ));
    }

    Ok(())
}

/// A brand record as held by the brand store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    /// Unique slug; also the base of convention asset filenames
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub ownership: Ownership,

    /// Locked system brands reject edits
    #[serde(default)]
    pub locked: bool,

    /// Inactive brands are soft-deleted
    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default, skip_serializing_if = "WatermarkSlots::is_empty")]
    pub watermarks: WatermarkSlots,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<PathBuf>,

    #[serde(default)]
    pub logo_background: LogoBackground,

    #[serde(default)]
    pub params: OverlayParams,

    #[serde(default)]
    pub text: TextLayer,
}

impl Brand {
    /// A user-less, unlocked brand with default parameters and no stored assets.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            ownership: Ownership::System,
            locked: false,
            active: true,
            watermarks: WatermarkSlots::default(),
            logo: None,
            logo_background: LogoBackground::Auto,
            params: OverlayParams::default(),
            text: TextLayer::default(),
        }
    }

    /// Brand used when the store has no record: filesystem conventions only.
    pub fn convention_only(name: impl Into<String>, params: OverlayParams) -> Self {
        Self {
            params,
            ..Self::new(name)
        }
    }

    pub fn with_params(mut self, params: OverlayParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo = Some(path.into());
        self
    }

    pub fn with_watermark(mut self, orientation: Orientation, path: impl Into<PathBuf>) -> Self {
        self.watermarks.set(orientation, Some(path.into()));
        self
    }

    pub fn with_text(mut self, text: TextLayer) -> Self {
        self.text = text;
        self
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Whether the identity field is usable for asset lookup.
    pub fn has_identity(&self) -> bool {
        let name = self.name.trim();
        !name.is_empty() && !name.contains("..") && slug_regex().is_match(name)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.has_identity() {
            return Err(format!(
                "brand name must be a non-empty slug without path separators, got '{}'",
                self.name
            ));
        }

        self.params.validate()?;

        if self.text.enabled {
            self.text.validate()?;
        }

        Ok(())
    }
}
