//! Layer catalog
//!
//! Selectable starting points for new layers: every generator at its
//! defaults (`value_fbm`) and every preset (`value_fbm:soft_clouds`).

use serde::Serialize;

use crate::generators::{get_generator, list_generators, NoiseGenerator, NoiseParams, Preset};

/// One selectable catalog entry
#[derive(Clone, Copy)]
pub struct CatalogEntry {
    pub generator: &'static dyn NoiseGenerator,
    pub preset: Option<&'static Preset>,
}

/// Serializable listing row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogListing {
    pub id: String,
    pub label: String,
    pub generator_id: &'static str,
    pub preset_id: Option<&'static str>,
}

impl CatalogEntry {
    pub fn id(&self) -> String {
        match self.preset {
            Some(preset) => format!("{}:{}", self.generator.id(), preset.id),
            None => self.generator.id().to_string(),
        }
    }

    pub fn label(&self) -> String {
        match self.preset {
            Some(preset) => format!("{} ({})", self.generator.label(), preset.label),
            None => self.generator.label().to_string(),
        }
    }

    /// Sanitized parameters this entry starts a layer with
    pub fn params(&self) -> NoiseParams {
        self.preset
            .and_then(|preset| self.generator.preset_params(preset.id))
            .unwrap_or_else(|| self.generator.defaults())
    }

    pub fn listing(&self) -> CatalogListing {
        CatalogListing {
            id: self.id(),
            label: self.label(),
            generator_id: self.generator.id(),
            preset_id: self.preset.map(|p| p.id),
        }
    }
}

/// Every entry, generator first then its presets
pub fn catalog() -> Vec<CatalogEntry> {
    list_generators()
        .flat_map(|generator| {
            std::iter::once(CatalogEntry {
                generator,
                preset: None,
            })
            .chain(generator.presets().iter().map(move |preset| CatalogEntry {
                generator,
                preset: Some(preset),
            }))
        })
        .collect()
}

/// Resolve `generator` or `generator:preset`
pub fn find_entry(entry_id: &str) -> Option<CatalogEntry> {
    let (generator_id, preset_id) = match entry_id.trim().split_once(':') {
        Some((g, p)) => (g, Some(p)),
        None => (entry_id.trim(), None),
    };
    let generator = get_generator(generator_id)?;
    let preset = match preset_id {
        Some(id) => Some(generator.preset(id)?),
        None => None,
    };
    Some(CatalogEntry { generator, preset })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_generators_and_presets() {
        let entries = catalog();
        let generators = list_generators().count();
        let presets: usize = list_generators().map(|g| g.presets().len()).sum();
        assert_eq!(entries.len(), generators + presets);
        assert_eq!(entries[0].id(), "value_fbm");
        assert_eq!(entries[1].id(), "value_fbm:soft_clouds");
    }

    #[test]
    fn test_find_entry() {
        let entry = find_entry("tile_grid:cobbles").unwrap();
        assert_eq!(entry.generator.id(), "tile_grid");
        assert_eq!(entry.params().get_f64("jitter"), 0.4);
        assert_eq!(entry.label(), "Tile Grid (Cobbles)");

        assert!(find_entry("tile_grid").unwrap().preset.is_none());
        assert!(find_entry("tile_grid:marble").is_none());
        assert!(find_entry("marble").is_none());
    }

    #[test]
    fn test_every_entry_resolves_to_itself() {
        for entry in catalog() {
            let found = find_entry(&entry.id()).unwrap();
            assert_eq!(found.id(), entry.id());
        }
    }
}
