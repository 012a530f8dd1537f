// Brand seeding from the master asset directory
//
// Every `<name>_logo.png` in the logo directory becomes a locked system
// brand. Watermarks are attached per orientation using the same naming
// convention the resolver uses at render time.

use std::path::{Path, PathBuf};

use super::{Brand, BrandStoreError, OverlayParams, Ownership};
use crate::config::AssetsConfig;
use crate::constants::LOGO_SUFFIX;
use crate::overlay::{AssetResolver, Orientation};

fn relative_to(root: &Path, path: PathBuf) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => path,
    }
}

/// Scan the master asset directory and return one system brand per logo,
/// sorted by name.
pub fn scan_master_assets(
    layout: &AssetsConfig,
    params: &OverlayParams,
) -> Result<Vec<Brand>, BrandStoreError> {
    let logo_dir = layout.logo_dir();
    if !logo_dir.is_dir() {
        tracing::warn!(dir = %logo_dir.display(), "logo directory not found, nothing to seed");
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(&logo_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str().and_then(|f| f.strip_suffix(LOGO_SUFFIX)) else {
            continue;
        };
        names.push(name.to_string());
    }
    names.sort();
    names.dedup();

    let resolver = AssetResolver::new(layout.clone());
    let mut brands = Vec::with_capacity(names.len());

    for name in names {
        let mut brand = Brand {
            ownership: Ownership::System,
            locked: true,
            ..Brand::convention_only(name, params.clone())
        };

        if !brand.has_identity() {
            tracing::warn!(brand = %brand.name, "skipping logo with unusable brand name");
            continue;
        }

        for orientation in Orientation::ALL {
            // Identity checked above, so resolution cannot fail here
            if let Ok(Some(found)) = resolver.resolve_watermark(&brand, orientation) {
                brand
                    .watermarks
                    .set(orientation, Some(relative_to(&layout.root, found.path)));
            }
        }

        if let Ok(Some(found)) = resolver.resolve_logo(&brand) {
            brand.logo = Some(relative_to(&layout.root, found.path));
        }

        tracing::debug!(brand = %brand.name, "seeded brand");
        brands.push(brand);
    }

    tracing::info!(count = brands.len(), root = %layout.root.display(), "brand seeding scan complete");
    Ok(brands)
}
