//! Asset resolution.
//!
//! Each layer asset is looked up in two steps:
//!
//! 1. The brand record's stored reference, when the file exists.
//! 2. The filesystem naming convention, inside the orientation-specific
//!    watermark directory or the single logo directory.
//!
//! A miss in both steps is reported as `None`, and the builder skips the
//! layer. Only a brand without a usable name is an error.

use std::path::{Path, PathBuf};

use crate::brand::{Brand, LogoBackground};
use crate::config::AssetsConfig;
use crate::constants::{BRAND_NAME_TOKEN, LOGO_SUFFIX, WATERMARK_SUFFIX};

use super::error::AssetError;
use super::geometry::AssetDimensions;
use super::Orientation;

/// Where a resolved asset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSource {
    /// The brand record's stored reference
    Stored,
    /// A filename derived from the brand name
    Convention,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub path: PathBuf,
    pub source: AssetSource,
}

/// What the logo needs before it can be overlaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoInspection {
    pub dimensions: Option<AssetDimensions>,
    pub chroma_key: bool,
}

/// Brand name with the "WTF" token removed and whitespace trimmed.
pub fn normalized_name(name: &str) -> String {
    name.replace(BRAND_NAME_TOKEN, "").trim().to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn push_unique(out: &mut Vec<String>, candidate: String) {
    if !out.contains(&candidate) {
        out.push(candidate);
    }
}

fn name_variants(clean: &str) -> Vec<String> {
    if clean.is_empty() {
        return Vec::new();
    }
    vec![clean.to_string(), clean.to_lowercase(), capitalize(clean)]
}

/// Candidate watermark filenames, most specific first.
pub fn watermark_candidates(name: &str) -> Vec<String> {
    let mut out = Vec::new();
    for variant in name_variants(&normalized_name(name)) {
        push_unique(&mut out, format!("{}{}", variant, WATERMARK_SUFFIX));
    }
    push_unique(&mut out, format!("{}{}", name.trim(), WATERMARK_SUFFIX));
    out
}

/// Candidate logo filenames. Logos are named after the full brand name.
pub fn logo_candidates(name: &str) -> Vec<String> {
    let mut out = vec![format!("{}{}", name.trim(), LOGO_SUFFIX)];
    for variant in name_variants(&normalized_name(name)) {
        push_unique(&mut out, format!("{}{}", variant, LOGO_SUFFIX));
    }
    out
}

/// Stateless resolver over the master asset layout. Safe to share across threads.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    layout: AssetsConfig,
}

impl AssetResolver {
    pub fn new(layout: AssetsConfig) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &AssetsConfig {
        &self.layout
    }

    fn check_identity(brand: &Brand) -> Result<(), AssetError> {
        if brand.has_identity() {
            Ok(())
        } else {
            Err(AssetError::MalformedBrand(format!(
                "brand name '{}' is not a usable identifier",
                brand.name
            )))
        }
    }

    fn stored(&self, brand: &Brand, reference: Option<&Path>, layer: &str) -> Option<ResolvedAsset> {
        let reference = reference?;
        let path = self.layout.locate(reference);
        if path.is_file() {
            return Some(ResolvedAsset {
                path,
                source: AssetSource::Stored,
            });
        }

        tracing::warn!(
            brand = %brand.name,
            layer = layer,
            path = %path.display(),
            "stored asset reference missing on disk, falling back to convention"
        );
        None
    }

    fn search(dir: &Path, candidates: Vec<String>) -> Option<ResolvedAsset> {
        candidates
            .into_iter()
            .map(|file| dir.join(file))
            .find(|path| path.is_file())
            .map(|path| ResolvedAsset {
                path,
                source: AssetSource::Convention,
            })
    }

    /// Watermark for one orientation class.
    pub fn resolve_watermark(
        &self,
        brand: &Brand,
        orientation: Orientation,
    ) -> Result<Option<ResolvedAsset>, AssetError> {
        Self::check_identity(brand)?;

        if let Some(found) = self.stored(brand, brand.watermarks.get(orientation), "watermark") {
            return Ok(Some(found));
        }

        Ok(Self::search(
            &self.layout.watermark_dir(orientation),
            watermark_candidates(&brand.name),
        ))
    }

    pub fn resolve_logo(&self, brand: &Brand) -> Result<Option<ResolvedAsset>, AssetError> {
        Self::check_identity(brand)?;

        if let Some(found) = self.stored(brand, brand.logo.as_deref(), "logo") {
            return Ok(Some(found));
        }

        Ok(Self::search(&self.layout.logo_dir(), logo_candidates(&brand.name)))
    }

    /// Read the logo's dimensions and decide whether its background needs
    /// keying. An unreadable file keeps the chroma key.
    pub fn inspect_logo(&self, path: &Path, background: LogoBackground) -> LogoInspection {
        let dimensions = image::image_dimensions(path)
            .ok()
            .map(|(width, height)| AssetDimensions { width, height });

        let chroma_key = match background {
            LogoBackground::ChromaKey => true,
            LogoBackground::Transparent => false,
            LogoBackground::Auto => !has_transparency(path),
        };

        LogoInspection {
            dimensions,
            chroma_key,
        }
    }
}

fn has_transparency(path: &Path) -> bool {
    match image::open(path) {
        Ok(img) => img.color().has_alpha() && img.to_rgba8().pixels().any(|p| p[3] < u8::MAX),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "logo not decodable, assuming keyable background");
            false
        }
    }
}
