// Brand store: lookup, soft delete and the YAML registry file

use super::{Brand, OverlayParams, Ownership};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Errors raised by brand store operations.
#[derive(Debug, thiserror::Error)]
pub enum BrandStoreError {
    #[error("brand '{0}' not found")]
    NotFound(String),

    #[error("brand '{0}' is a locked system brand")]
    Locked(String),

    #[error("brand '{0}' is inactive")]
    Inactive(String),

    #[error("invalid brand '{name}': {reason}")]
    Invalid { name: String, reason: String },

    #[error("brand registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("brand registry parse error: {0}")]
    Parse(String),
}

/// Brand lookup used by the job driver and the CLI.
///
/// Records are never hard-deleted; `deactivate` flips the active flag so
/// job history keeps pointing at a real brand.
pub trait BrandStore: Send + Sync {
    /// Fetch a record by name, active or not.
    fn get(&self, name: &str) -> Option<Brand>;

    /// All records in name order.
    fn list(&self, include_inactive: bool) -> Vec<Brand>;

    /// Insert or replace a record. Locked system records cannot be replaced.
    fn upsert(&self, brand: Brand) -> Result<(), BrandStoreError>;

    /// Soft delete.
    fn deactivate(&self, name: &str) -> Result<(), BrandStoreError>;

    /// Brand to build under `name`. A name with no record falls back to
    /// convention-only resolution with `defaults`; an inactive record is refused.
    fn for_render(&self, name: &str, defaults: &OverlayParams) -> Result<Brand, BrandStoreError> {
        match self.get(name) {
            Some(brand) if !brand.active => Err(BrandStoreError::Inactive(name.to_string())),
            Some(brand) => Ok(brand),
            None => {
                tracing::debug!(brand = %name, "no stored record, using convention-only resolution");
                Ok(Brand::convention_only(name, defaults.clone()))
            }
        }
    }
}

/// In-memory brand store.
#[derive(Debug, Default)]
pub struct MemoryBrandStore {
    brands: RwLock<BTreeMap<String, Brand>>,
}

impl MemoryBrandStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from trusted records (seeding, registry load), bypassing
    /// the lock check.
    pub fn from_brands(brands: impl IntoIterator<Item = Brand>) -> Self {
        let map = brands
            .into_iter()
            .map(|brand| (brand.name.clone(), brand))
            .collect();
        Self {
            brands: RwLock::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.brands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.brands.read().is_empty()
    }
}

fn is_protected(brand: &Brand) -> bool {
    brand.locked && brand.ownership == Ownership::System
}

impl BrandStore for MemoryBrandStore {
    fn get(&self, name: &str) -> Option<Brand> {
        self.brands.read().get(name).cloned()
    }

    fn list(&self, include_inactive: bool) -> Vec<Brand> {
        self.brands
            .read()
            .values()
            .filter(|b| include_inactive || b.active)
            .cloned()
            .collect()
    }

    fn upsert(&self, brand: Brand) -> Result<(), BrandStoreError> {
        brand.validate().map_err(|reason| BrandStoreError::Invalid {
            name: brand.name.clone(),
            reason,
        })?;

        let mut brands = self.brands.write();
        if let Some(existing) = brands.get(&brand.name) {
            if is_protected(existing) {
                return Err(BrandStoreError::Locked(brand.name));
            }
        }

        tracing::debug!(brand = %brand.name, "brand upserted");
        brands.insert(brand.name.clone(), brand);
        Ok(())
    }

    fn deactivate(&self, name: &str) -> Result<(), BrandStoreError> {
        let mut brands = self.brands.write();
        let brand = brands
            .get_mut(name)
            .ok_or_else(|| BrandStoreError::NotFound(name.to_string()))?;

        if is_protected(brand) {
            return Err(BrandStoreError::Locked(name.to_string()));
        }

        brand.active = false;
        tracing::info!(brand = %name, "brand deactivated");
        Ok(())
    }
}

/// On-disk brand registry (`brands.yaml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandRegistry {
    #[serde(default)]
    pub brands: Vec<Brand>,
}

impl BrandRegistry {
    pub fn from_yaml(yaml: &str) -> Result<Self, BrandStoreError> {
        let registry: BrandRegistry =
            serde_yaml::from_str(yaml).map_err(|e| BrandStoreError::Parse(e.to_string()))?;

        for brand in &registry.brands {
            brand.validate().map_err(|reason| BrandStoreError::Invalid {
                name: brand.name.clone(),
                reason,
            })?;
        }

        Ok(registry)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BrandStoreError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String, BrandStoreError> {
        serde_yaml::to_string(self).map_err(|e| BrandStoreError::Parse(e.to_string()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), BrandStoreError> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn from_store(store: &dyn BrandStore) -> Self {
        Self {
            brands: store.list(true),
        }
    }

    pub fn into_store(self) -> MemoryBrandStore {
        MemoryBrandStore::from_brands(self.brands)
    }
}
