//! Periodic band generators: line bands and tile/grid subdivision

use super::params::{NoiseParams, ParamSpec, Preset, PresetValue};
use super::NoiseGenerator;
use crate::engine::ScalarField;
use crate::impl_generator_common;
use crate::kernel::{hash_unit, mix_seed, rotate, seed_from_text, smoothstep};

const LINE_BANDS_PARAMS: &[ParamSpec] = &[
    ParamSpec::integer("count", "Band Count", 1.0, 256.0, 16.0),
    ParamSpec::range("width", "Band Width", 0.01, 1.0, 0.35),
    ParamSpec::range("softness", "Softness", 0.0, 1.0, 0.25),
    ParamSpec::range("jitter", "Jitter", 0.0, 1.0, 0.0),
    ParamSpec::select("axis", "Axis", &["horizontal", "vertical"], "horizontal"),
    ParamSpec::range("rotation", "Rotation", -180.0, 180.0, 0.0),
];

const TILE_GRID_PARAMS: &[ParamSpec] = &[
    ParamSpec::integer("columns", "Columns", 1.0, 64.0, 4.0),
    ParamSpec::integer("rows", "Rows", 1.0, 64.0, 4.0),
    ParamSpec::range("grooveWidth", "Groove Width", 0.005, 0.5, 0.06),
    ParamSpec::range("grooveSoftness", "Groove Softness", 0.0, 1.0, 0.5),
    ParamSpec::range("jitter", "Jitter", 0.0, 1.0, 0.0),
    ParamSpec::range("baseLevel", "Base Level", 0.0, 1.0, 0.85),
    ParamSpec::range("grooveDepth", "Groove Depth", 0.0, 1.0, 0.7),
];

const LINE_BANDS_PRESETS: &[Preset] = &[
    Preset {
        id: "pinstripe",
        label: "Pinstripe",
        overrides: &[
            ("count", PresetValue::Num(48.0)),
            ("width", PresetValue::Num(0.12)),
            ("softness", PresetValue::Num(0.1)),
        ],
    },
    Preset {
        id: "wide_ribs",
        label: "Wide Ribs",
        overrides: &[
            ("count", PresetValue::Num(6.0)),
            ("width", PresetValue::Num(0.6)),
            ("softness", PresetValue::Num(0.6)),
        ],
    },
];

const TILE_GRID_PRESETS: &[Preset] = &[
    Preset {
        id: "subway_tile",
        label: "Subway Tile",
        overrides: &[
            ("columns", PresetValue::Num(4.0)),
            ("rows", PresetValue::Num(8.0)),
            ("grooveWidth", PresetValue::Num(0.04)),
        ],
    },
    Preset {
        id: "floor_plates",
        label: "Floor Plates",
        overrides: &[
            ("columns", PresetValue::Num(2.0)),
            ("rows", PresetValue::Num(2.0)),
            ("grooveWidth", PresetValue::Num(0.02)),
            ("grooveSoftness", PresetValue::Num(0.2)),
        ],
    },
    Preset {
        id: "cobbles",
        label: "Cobbles",
        overrides: &[
            ("columns", PresetValue::Num(6.0)),
            ("rows", PresetValue::Num(6.0)),
            ("jitter", PresetValue::Num(0.4)),
            ("grooveWidth", PresetValue::Num(0.12)),
        ],
    },
];

/// Periodic band signal along one axis.
///
/// `t` is split into `count` cells. Each cell holds one band of relative
/// `width`; its centre is jittered per cell by a hash of the cell index.
/// The falloff is a hard window at `softness = 0` and a smooth ramp
/// across the whole half-width at `softness = 1`.
pub fn band_signal(t: f64, count: f64, width: f64, softness: f64, jitter: f64, seed: u32) -> f64 {
    let p = t * count;
    let cell = p.floor();
    let f = p - cell;
    let center = 0.5 + (hash_unit(cell as i32, 0, seed) - 0.5) * jitter * (1.0 - width);
    let distance = (f - center).abs();
    let half = width * 0.5;
    1.0 - smoothstep(half * (1.0 - softness), half, distance)
}

// ============================================================================
// Line Bands
// ============================================================================

/// Parallel bands along one axis
#[derive(Debug, Clone, Copy, Default)]
pub struct LineBands;

impl NoiseGenerator for LineBands {
    impl_generator_common!(
        "line_bands",
        "Line Bands",
        "Repeating soft-edged stripes with optional per-band jitter",
        LINE_BANDS_PARAMS,
        LINE_BANDS_PRESETS
    );

    fn render(&self, width: u32, height: u32, params: &NoiseParams) -> ScalarField {
        let seed = seed_from_text(params.get_str("seed"));
        let count = params.get_f64("count");
        let band_width = params.get_f64("width");
        let softness = params.get_f64("softness");
        let jitter = params.get_f64("jitter");
        let rotation = params.get_f64("rotation");
        let horizontal = params.get_str("axis") != "vertical";

        ScalarField::from_uv_fn(width, height, |u, v| {
            let (x, y) = rotate(u - 0.5, v - 0.5, rotation);
            // Horizontal bands repeat down the v axis
            let t = if horizontal { y + 0.5 } else { x + 0.5 };
            band_signal(t, count, band_width, softness, jitter, seed)
        })
    }
}

// ============================================================================
// Tile Grid
// ============================================================================

/// Tiles separated by grooves; the groove mask is subtracted from a flat base
#[derive(Debug, Clone, Copy, Default)]
pub struct TileGrid;

impl NoiseGenerator for TileGrid {
    impl_generator_common!(
        "tile_grid",
        "Tile Grid",
        "Grid subdivision with grooves cut into a flat base",
        TILE_GRID_PARAMS,
        TILE_GRID_PRESETS
    );

    fn render(&self, width: u32, height: u32, params: &NoiseParams) -> ScalarField {
        let seed = seed_from_text(params.get_str("seed"));
        let column_seed = mix_seed(seed, 1);
        let row_seed = mix_seed(seed, 2);
        let columns = params.get_f64("columns");
        let rows = params.get_f64("rows");
        let groove_width = params.get_f64("grooveWidth");
        let softness = params.get_f64("grooveSoftness");
        let jitter = params.get_f64("jitter");
        let base = params.get_f64("baseLevel");
        let depth = params.get_f64("grooveDepth");

        ScalarField::from_uv_fn(width, height, |u, v| {
            // Half-cell phase shift puts each band on a tile boundary
            let vertical = band_signal(
                u + 0.5 / columns,
                columns,
                groove_width,
                softness,
                jitter,
                column_seed,
            );
            let horizontal =
                band_signal(v + 0.5 / rows, rows, groove_width, softness, jitter, row_seed);
            base - vertical.max(horizontal) * depth
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_band_signal_hard_window() {
        // width 0.5, no softness: inside the central half of each cell only
        assert_eq!(band_signal(0.5, 1.0, 0.5, 0.0, 0.0, 1), 1.0);
        assert_eq!(band_signal(0.3, 1.0, 0.5, 0.0, 0.0, 1), 1.0);
        assert_eq!(band_signal(0.1, 1.0, 0.5, 0.0, 0.0, 1), 0.0);
        assert_eq!(band_signal(0.9, 1.0, 0.5, 0.0, 0.0, 1), 0.0);
    }

    #[test]
    fn test_band_signal_soft_falloff_is_monotonic() {
        let a = band_signal(0.5, 1.0, 0.8, 1.0, 0.0, 1);
        let b = band_signal(0.6, 1.0, 0.8, 1.0, 0.0, 1);
        let c = band_signal(0.8, 1.0, 0.8, 1.0, 0.0, 1);
        assert_relative_eq!(a, 1.0);
        assert!(a > b && b > c);
    }

    #[test]
    fn test_horizontal_bands_constant_along_rows() {
        let field = LineBands.generate(16, 16, &NoiseParams::new());
        for y in 0..16 {
            let first = field.get(0, y).unwrap();
            assert!((0..16).all(|x| field.get(x, y).unwrap() == first));
        }
    }

    #[test]
    fn test_tile_grid_groove_and_face() {
        let params = NoiseParams::new()
            .with_param("columns", 2.0)
            .with_param("rows", 2.0)
            .with_param("grooveWidth", 0.1)
            .with_param("grooveSoftness", 0.0);
        let field = TileGrid.generate(64, 64, &params);
        // Tile centre sits on the flat base
        assert_relative_eq!(field.get(16, 16).unwrap(), 0.85, epsilon = 1e-6);
        // Boundary at u = 0.5 is fully grooved
        assert_relative_eq!(field.get(32, 16).unwrap(), 0.15, epsilon = 1e-6);
    }
}
