//! Fractal value-noise generators
//!
//! Value, ridged and directional fBm share one sampling grid: pixel UVs are
//! centred, rotated by `rotation` degrees and scaled before sampling.

use super::params::{NoiseParams, ParamSpec, Preset, PresetValue};
use super::NoiseGenerator;
use crate::engine::ScalarField;
use crate::impl_generator_common;
use crate::kernel::{fbm, rotate, seed_from_text, FbmSettings};

// ============================================================================
// Schemas
// ============================================================================

const VALUE_FBM_PARAMS: &[ParamSpec] = &[
    ParamSpec::range("scale", "Scale", 0.5, 256.0, 8.0),
    ParamSpec::integer("octaves", "Octaves", 1.0, 8.0, 5.0),
    ParamSpec::range("gain", "Gain", 0.1, 0.95, 0.5),
    ParamSpec::range("lacunarity", "Lacunarity", 1.5, 4.0, 2.0),
    ParamSpec::range("rotation", "Rotation", -180.0, 180.0, 0.0),
];

const RIDGED_FBM_PARAMS: &[ParamSpec] = &[
    ParamSpec::range("scale", "Scale", 0.5, 256.0, 6.0),
    ParamSpec::integer("octaves", "Octaves", 1.0, 8.0, 5.0),
    ParamSpec::range("gain", "Gain", 0.1, 0.95, 0.5),
    ParamSpec::range("lacunarity", "Lacunarity", 1.5, 4.0, 2.0),
    ParamSpec::range("rotation", "Rotation", -180.0, 180.0, 0.0),
    ParamSpec::range("sharpness", "Ridge Sharpness", 0.25, 4.0, 1.0),
];

const DIRECTIONAL_FBM_PARAMS: &[ParamSpec] = &[
    ParamSpec::range("scale", "Scale", 0.5, 256.0, 8.0),
    ParamSpec::integer("octaves", "Octaves", 1.0, 8.0, 5.0),
    ParamSpec::range("gain", "Gain", 0.1, 0.95, 0.5),
    ParamSpec::range("lacunarity", "Lacunarity", 1.5, 4.0, 2.0),
    ParamSpec::range("rotation", "Rotation", -180.0, 180.0, 0.0),
    ParamSpec::range("stretchU", "Horizontal Stretch", 0.05, 16.0, 4.0),
    ParamSpec::range("stretchV", "Vertical Stretch", 0.05, 16.0, 1.0),
];

const VALUE_FBM_PRESETS: &[Preset] = &[
    Preset {
        id: "soft_clouds",
        label: "Soft Clouds",
        overrides: &[
            ("scale", PresetValue::Num(4.0)),
            ("octaves", PresetValue::Num(6.0)),
            ("gain", PresetValue::Num(0.55)),
        ],
    },
    Preset {
        id: "fine_mottling",
        label: "Fine Mottling",
        overrides: &[
            ("scale", PresetValue::Num(32.0)),
            ("octaves", PresetValue::Num(4.0)),
            ("gain", PresetValue::Num(0.45)),
        ],
    },
];

const RIDGED_FBM_PRESETS: &[Preset] = &[
    Preset {
        id: "veins",
        label: "Veins",
        overrides: &[
            ("scale", PresetValue::Num(6.0)),
            ("sharpness", PresetValue::Num(2.5)),
        ],
    },
    Preset {
        id: "eroded",
        label: "Eroded",
        overrides: &[
            ("scale", PresetValue::Num(12.0)),
            ("octaves", PresetValue::Num(7.0)),
            ("gain", PresetValue::Num(0.6)),
            ("sharpness", PresetValue::Num(1.5)),
        ],
    },
];

const DIRECTIONAL_FBM_PRESETS: &[Preset] = &[
    Preset {
        id: "brushed_metal",
        label: "Brushed Metal",
        overrides: &[
            ("scale", PresetValue::Num(24.0)),
            ("octaves", PresetValue::Num(4.0)),
            ("stretchU", PresetValue::Num(12.0)),
            ("stretchV", PresetValue::Num(0.5)),
        ],
    },
    Preset {
        id: "wood_grain",
        label: "Wood Grain",
        overrides: &[
            ("scale", PresetValue::Num(10.0)),
            ("stretchU", PresetValue::Num(1.0)),
            ("stretchV", PresetValue::Num(8.0)),
        ],
    },
];

// ============================================================================
// Shared sampling
// ============================================================================

pub(crate) fn fbm_settings(params: &NoiseParams) -> FbmSettings {
    FbmSettings::new(
        params.get_u32("octaves"),
        params.get_f64("gain"),
        params.get_f64("lacunarity"),
    )
}

/// Render `sample(x, y)` over the centred, rotated UV grid
fn render_rotated<F>(width: u32, height: u32, rotation: f64, mut sample: F) -> ScalarField
where
    F: FnMut(f64, f64) -> f64,
{
    ScalarField::from_uv_fn(width, height, |u, v| {
        let (x, y) = rotate(u - 0.5, v - 0.5, rotation);
        sample(x, y)
    })
}

// ============================================================================
// Value fBm
// ============================================================================

/// Plain fractal value noise
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueFbm;

impl NoiseGenerator for ValueFbm {
    impl_generator_common!(
        "value_fbm",
        "Value fBm",
        "Multi-octave smoothed value noise",
        VALUE_FBM_PARAMS,
        VALUE_FBM_PRESETS
    );

    fn render(&self, width: u32, height: u32, params: &NoiseParams) -> ScalarField {
        let seed = seed_from_text(params.get_str("seed"));
        let scale = params.get_f64("scale");
        let settings = fbm_settings(params);

        render_rotated(width, height, params.get_f64("rotation"), |x, y| {
            fbm(x * scale, y * scale, seed, settings)
        })
    }
}

// ============================================================================
// Ridged fBm
// ============================================================================

/// fBm folded around its midpoint to produce ridge lines
#[derive(Debug, Clone, Copy, Default)]
pub struct RidgedFbm;

impl NoiseGenerator for RidgedFbm {
    impl_generator_common!(
        "ridged_fbm",
        "Ridged fBm",
        "fBm folded with 1 - |2v - 1| into sharp ridges",
        RIDGED_FBM_PARAMS,
        RIDGED_FBM_PRESETS
    );

    fn render(&self, width: u32, height: u32, params: &NoiseParams) -> ScalarField {
        let seed = seed_from_text(params.get_str("seed"));
        let scale = params.get_f64("scale");
        let sharpness = params.get_f64("sharpness");
        let settings = fbm_settings(params);

        render_rotated(width, height, params.get_f64("rotation"), |x, y| {
            let v = fbm(x * scale, y * scale, seed, settings);
            let ridge = 1.0 - (2.0 * v - 1.0).abs();
            ridge.max(0.0).powf(sharpness)
        })
    }
}

// ============================================================================
// Directional fBm
// ============================================================================

/// fBm with independent horizontal/vertical stretch
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionalFbm;

impl NoiseGenerator for DirectionalFbm {
    impl_generator_common!(
        "directional_fbm",
        "Directional fBm",
        "fBm sampled through per-axis stretch factors",
        DIRECTIONAL_FBM_PARAMS,
        DIRECTIONAL_FBM_PRESETS
    );

    fn render(&self, width: u32, height: u32, params: &NoiseParams) -> ScalarField {
        let seed = seed_from_text(params.get_str("seed"));
        let scale = params.get_f64("scale");
        let stretch_u = params.get_f64("stretchU");
        let stretch_v = params.get_f64("stretchV");
        let settings = fbm_settings(params);

        render_rotated(width, height, params.get_f64("rotation"), |x, y| {
            fbm(x * scale / stretch_u, y * scale / stretch_v, seed, settings)
        })
    }
}
