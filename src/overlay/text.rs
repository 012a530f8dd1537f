//! Text layer styling and filter-argument escaping.

use crate::brand::TextLayer;
use std::path::PathBuf;

use super::geometry::format_scalar;

/// Escape a value for the option parser: `\\`, `'` and `:` get a backslash.
pub fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
}

/// Quote an option value for a filtergraph.
///
/// The graph parser removes one level of quoting before the option parser
/// sees the value, and a `'` cannot appear inside single quotes. Each
/// apostrophe in the option-escaped value therefore closes the quote, is
/// emitted as `\'` and reopens it.
pub fn quote_filter_value(value: &str) -> String {
    format!("'{}'", escape_filter_value(value).replace('\'', "'\\''"))
}

/// Escape drawtext content before quoting. drawtext reads `\\` as an escape
/// and `%` as the start of an expansion.
pub fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\").replace('%', "\\%")
}

/// Normalize a colour for the engine: `#RGB` expands to `#RRGGBB`,
/// hex is upper-cased and names are lower-cased.
pub fn normalize_color(color: &str) -> String {
    match color.strip_prefix('#') {
        Some(hex) if hex.len() == 3 => {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            format!("#{}", expanded.to_ascii_uppercase())
        }
        Some(hex) => format!("#{}", hex.to_ascii_uppercase()),
        None => color.to_ascii_lowercase(),
    }
}

/// Colour with an alpha suffix in the engine's `color@alpha` form.
pub fn color_with_alpha(color: &str, opacity: f64) -> String {
    format!(
        "{}@{}",
        normalize_color(color),
        format_scalar(opacity.clamp(0.0, 1.0))
    )
}

/// Box behind the text.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStyle {
    pub color: String,
    pub border: u32,
}

/// Styling fields of a drawtext operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub text: String,
    pub font_size: u32,
    pub color: String,
    pub font_file: Option<PathBuf>,
    pub background: Option<BoxStyle>,
}

impl TextStyle {
    pub fn from_layer(layer: &TextLayer) -> Self {
        let background = layer.background.as_ref().map(|bg| BoxStyle {
            color: color_with_alpha(&bg.color, bg.opacity),
            border: layer.margin / 2,
        });

        Self {
            text: layer.content.trim().to_string(),
            font_size: layer.font_size,
            color: normalize_color(&layer.color),
            font_file: layer.font_file.clone(),
            background,
        }
    }

    /// drawtext options up to (not including) the position fields.
    pub fn render_options(&self) -> String {
        let mut opts = format!(
            "text={}:fontsize={}:fontcolor={}",
            quote_filter_value(&escape_drawtext(&self.text)),
            self.font_size,
            self.color
        );

        if let Some(font) = &self.font_file {
            opts.push_str(&format!(
                ":fontfile={}",
                quote_filter_value(&font.to_string_lossy())
            ));
        }

        opts
    }

    pub fn render_box(&self) -> Option<String> {
        self.background.as_ref().map(|bg| {
            format!(
                "box=1:boxcolor={}:boxborderw={}",
                bg.color, bg.border
            )
        })
    }
}
