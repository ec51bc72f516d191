//! Series color registry
//!
//! Colors are loaded from palettes.json (embedded at compile time) and keyed
//! by role: one palette for the kinematic channels (black trace plus the
//! red/green/blue rotation triple), one for the per-sensor normal/shear pair,
//! one for net-force components. Palettes wrap around when a panel carries
//! more series than the palette has colors.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../../palettes.json");

/// Global palette registry, initialized lazily on first access
pub static PALETTE_REGISTRY: Lazy<PaletteRegistry> = Lazy::new(|| {
    PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
        eprintln!("ERROR: failed to load embedded palettes.json: {}", e);
        PaletteRegistry::default()
    })
});

/// Palette for the prismatic trace and the rotation triple
pub const KINEMATICS_PALETTE: &str = "Kinematics";

/// Palette for the per-sensor normal/shear pair
pub const FORCE_PAIR_PALETTE: &str = "ForcePair";

/// Palette for net-force components and magnitude
pub const NET_FORCE_PALETTE: &str = "NetForce";

/// A single palette definition from palettes.json
#[derive(Debug, Clone, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    pub colors: Vec<String>,
}

impl PaletteDefinition {
    /// Get a color by index, wrapping around past the end of the palette
    pub fn color(&self, index: usize) -> [u8; 3] {
        if self.colors.is_empty() {
            return [128, 128, 128]; // Gray fallback
        }
        let idx = index % self.colors.len();
        parse_hex_color(&self.colors[idx]).unwrap_or([128, 128, 128])
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Registry of all available palettes
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    /// Palettes by name (lowercase keys for case-insensitive lookup)
    palettes: HashMap<String, PaletteDefinition>,
}

impl PaletteRegistry {
    /// Load palettes from a JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)
            .map_err(|e| format!("failed to parse palettes JSON: {}", e))?;

        let mut registry = Self::default();
        for def in definitions {
            registry.palettes.insert(def.name.to_lowercase(), def);
        }
        Ok(registry)
    }

    /// Get a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }
}

/// Color for series `index` of the named palette
///
/// Falls back to gray if the palette is unknown, so a bad palette name can
/// never take down a render.
pub fn series_color(palette: &str, index: usize) -> [u8; 3] {
    PALETTE_REGISTRY
        .get(palette)
        .map(|p| p.color(index))
        .unwrap_or([128, 128, 128])
}

/// Parse a hex color string to an RGB array
///
/// Supports `#RRGGBB` and `#RRGGBBAA` (alpha ignored), with or without `#`.
fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some([255, 0, 0]));
        assert_eq!(parse_hex_color("#1F77B4"), Some([31, 119, 180]));
        assert_eq!(parse_hex_color("FF0000"), Some([255, 0, 0]));

        // 8-digit hex keeps RGB, drops alpha
        assert_eq!(parse_hex_color("#440154FF"), Some([68, 1, 84]));

        // Invalid
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("GGGGGG"), None);
    }

    #[test]
    fn test_registry_loads_role_palettes() {
        let registry = &*PALETTE_REGISTRY;
        for name in [KINEMATICS_PALETTE, FORCE_PAIR_PALETTE, NET_FORCE_PALETTE] {
            let palette = registry.get(name).expect("role palette missing");
            assert!(!palette.is_empty());
        }
    }

    #[test]
    fn test_kinematics_colors_match_capture_scripts() {
        // Black prismatic trace, red/green/blue rotations
        assert_eq!(series_color(KINEMATICS_PALETTE, 0), [0, 0, 0]);
        assert_eq!(series_color(KINEMATICS_PALETTE, 1), [255, 0, 0]);
        assert_eq!(series_color(KINEMATICS_PALETTE, 2), [0, 128, 0]);
        assert_eq!(series_color(KINEMATICS_PALETTE, 3), [0, 0, 255]);
    }

    #[test]
    fn test_palette_color_wrapping() {
        let palette = PALETTE_REGISTRY.get(FORCE_PAIR_PALETTE).unwrap();
        let len = palette.len();
        assert_eq!(palette.color(0), palette.color(len));
        assert_eq!(palette.color(1), palette.color(len + 1));
    }

    #[test]
    fn test_unknown_palette_falls_back_to_gray() {
        assert_eq!(series_color("NoSuchPalette", 0), [128, 128, 128]);
    }
}
