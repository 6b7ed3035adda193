//! Tile layer style catalog
//!
//! The fixed set of map styles offered by the application. Selection is by
//! index; the catalog is immutable at runtime.

use serde::Serialize;

/// A tile layer style: URL template plus the attribution its provider requires
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MapStyle {
    /// Display name
    pub name: &'static str,
    /// Tile URL template with `{z}`/`{x}`/`{y}` slots and optional
    /// `{s}` (subdomain) and `{r}` (retina suffix) slots
    pub url_template: &'static str,
    /// Attribution text for the tile provider
    pub attribution: &'static str,
}

/// The supported map styles, in selection order
pub const MAP_STYLES: [MapStyle; 5] = [
    MapStyle {
        name: "Street",
        url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: "© OpenStreetMap contributors",
    },
    MapStyle {
        name: "Satellite",
        url_template: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
        attribution: "Tiles © Esri — Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community",
    },
    MapStyle {
        name: "Topo",
        url_template: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
        attribution: "Map data: © OpenStreetMap contributors, SRTM | Map style: © OpenTopoMap",
    },
    MapStyle {
        name: "Midnight",
        url_template: "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
        attribution: "© OpenStreetMap contributors © CARTO",
    },
    MapStyle {
        name: "Light",
        url_template: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
        attribution: "© OpenStreetMap contributors © CARTO",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_five_styles() {
        assert_eq!(MAP_STYLES.len(), 5);
        let names: Vec<&str> = MAP_STYLES.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["Street", "Satellite", "Topo", "Midnight", "Light"]
        );
    }

    #[test]
    fn test_templates_carry_tile_slots() {
        for style in &MAP_STYLES {
            assert!(style.url_template.contains("{z}"), "{}", style.name);
            assert!(style.url_template.contains("{x}"), "{}", style.name);
            assert!(style.url_template.contains("{y}"), "{}", style.name);
            assert!(!style.attribution.is_empty(), "{}", style.name);
        }
    }
}
