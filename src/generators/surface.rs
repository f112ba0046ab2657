//! Surface-detail generators: edge wear, micro grain, streak flow, blotch

use super::fbm::fbm_settings;
use super::params::{NoiseParams, ParamSpec, Preset, PresetValue};
use super::NoiseGenerator;
use crate::engine::ScalarField;
use crate::impl_generator_common;
use crate::kernel::{fbm, lerp, mix_seed, rotate, seed_from_text, smoothstep, FbmSettings};

const EDGE_WEAR_PARAMS: &[ParamSpec] = &[
    ParamSpec::range("edgeWidth", "Edge Width", 0.005, 0.5, 0.08),
    ParamSpec::range("softness", "Softness", 0.0, 1.0, 0.5),
    ParamSpec::range("breakupScale", "Breakup Scale", 1.0, 128.0, 16.0),
    ParamSpec::range("breakupStrength", "Breakup Strength", 0.0, 1.0, 0.6),
    ParamSpec::integer("octaves", "Octaves", 1.0, 8.0, 4.0),
];

const MICRO_GRAIN_PARAMS: &[ParamSpec] = &[
    ParamSpec::range("scale", "Scale", 16.0, 1024.0, 256.0),
    ParamSpec::integer("octaves", "Octaves", 1.0, 4.0, 2.0),
    ParamSpec::range("gain", "Gain", 0.1, 0.95, 0.5),
    ParamSpec::range("lacunarity", "Lacunarity", 1.5, 4.0, 2.0),
];

const STREAK_FLOW_PARAMS: &[ParamSpec] = &[
    ParamSpec::range("direction", "Direction", -180.0, 180.0, 0.0),
    ParamSpec::range("scale", "Scale", 1.0, 128.0, 12.0),
    ParamSpec::range("stretch", "Stretch", 1.0, 32.0, 6.0),
    ParamSpec::range("warp", "Warp", 0.0, 2.0, 0.4),
    ParamSpec::range("warpScale", "Warp Scale", 0.5, 32.0, 3.0),
    ParamSpec::integer("octaves", "Octaves", 1.0, 8.0, 4.0),
];

const BLOTCH_PARAMS: &[ParamSpec] = &[
    ParamSpec::range("scale", "Scale", 0.5, 16.0, 3.0),
    ParamSpec::integer("octaves", "Octaves", 1.0, 8.0, 3.0),
    ParamSpec::range("threshold", "Threshold", 0.0, 1.0, 0.5),
    ParamSpec::range("softness", "Softness", 0.001, 0.5, 0.15),
];

const EDGE_WEAR_PRESETS: &[Preset] = &[
    Preset {
        id: "chipped_paint",
        label: "Chipped Paint",
        overrides: &[
            ("edgeWidth", PresetValue::Num(0.05)),
            ("breakupScale", PresetValue::Num(32.0)),
            ("breakupStrength", PresetValue::Num(0.85)),
        ],
    },
    Preset {
        id: "soft_rub",
        label: "Soft Rub",
        overrides: &[
            ("edgeWidth", PresetValue::Num(0.15)),
            ("softness", PresetValue::Num(0.9)),
            ("breakupStrength", PresetValue::Num(0.3)),
        ],
    },
];

const MICRO_GRAIN_PRESETS: &[Preset] = &[
    Preset {
        id: "fine",
        label: "Fine",
        overrides: &[
            ("scale", PresetValue::Num(512.0)),
            ("octaves", PresetValue::Num(1.0)),
        ],
    },
    Preset {
        id: "sandy",
        label: "Sandy",
        overrides: &[
            ("scale", PresetValue::Num(160.0)),
            ("octaves", PresetValue::Num(3.0)),
            ("gain", PresetValue::Num(0.6)),
        ],
    },
];

const STREAK_FLOW_PRESETS: &[Preset] = &[
    Preset {
        id: "rain_streaks",
        label: "Rain Streaks",
        overrides: &[
            ("direction", PresetValue::Num(90.0)),
            ("scale", PresetValue::Num(20.0)),
            ("stretch", PresetValue::Num(16.0)),
            ("warp", PresetValue::Num(0.2)),
        ],
    },
    Preset {
        id: "grime_flow",
        label: "Grime Flow",
        overrides: &[
            ("direction", PresetValue::Num(90.0)),
            ("scale", PresetValue::Num(8.0)),
            ("stretch", PresetValue::Num(6.0)),
            ("warp", PresetValue::Num(0.9)),
        ],
    },
];

const BLOTCH_PRESETS: &[Preset] = &[
    Preset {
        id: "stains",
        label: "Stains",
        overrides: &[
            ("scale", PresetValue::Num(4.0)),
            ("threshold", PresetValue::Num(0.6)),
            ("softness", PresetValue::Num(0.08)),
        ],
    },
    Preset {
        id: "patches",
        label: "Patches",
        overrides: &[
            ("scale", PresetValue::Num(2.0)),
            ("threshold", PresetValue::Num(0.45)),
            ("softness", PresetValue::Num(0.25)),
        ],
    },
];

// ============================================================================
// Edge Wear
// ============================================================================

/// Perimeter mask broken up by fBm
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeWear;

impl NoiseGenerator for EdgeWear {
    impl_generator_common!(
        "edge_wear",
        "Edge Wear",
        "Wear concentrated along the UV border, broken up by fBm",
        EDGE_WEAR_PARAMS,
        EDGE_WEAR_PRESETS
    );

    fn render(&self, width: u32, height: u32, params: &NoiseParams) -> ScalarField {
        let seed = seed_from_text(params.get_str("seed"));
        let edge_width = params.get_f64("edgeWidth");
        let softness = params.get_f64("softness");
        let breakup_scale = params.get_f64("breakupScale");
        let breakup_strength = params.get_f64("breakupStrength");
        let breakup = FbmSettings::new(params.get_u32("octaves"), 0.5, 2.0);

        ScalarField::from_uv_fn(width, height, |u, v| {
            let perimeter = u.min(1.0 - u).min(v).min(1.0 - v);
            let mask = 1.0 - smoothstep(edge_width * (1.0 - softness), edge_width, perimeter);
            if mask <= 0.0 {
                return 0.0;
            }
            let noise = fbm(u * breakup_scale, v * breakup_scale, seed, breakup);
            mask * lerp(1.0, noise, breakup_strength)
        })
    }
}

// ============================================================================
// Micro Grain
// ============================================================================

/// High-frequency, low-octave fBm
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroGrain;

impl NoiseGenerator for MicroGrain {
    impl_generator_common!(
        "micro_grain",
        "Micro Grain",
        "Fine surface grain from few octaves at a large scale factor",
        MICRO_GRAIN_PARAMS,
        MICRO_GRAIN_PRESETS
    );

    fn render(&self, width: u32, height: u32, params: &NoiseParams) -> ScalarField {
        let seed = seed_from_text(params.get_str("seed"));
        let scale = params.get_f64("scale");
        let settings = fbm_settings(params);

        ScalarField::from_uv_fn(width, height, |u, v| fbm(u * scale, v * scale, seed, settings))
    }
}

// ============================================================================
// Streak Flow
// ============================================================================

/// fBm stretched along a flow direction with a warped along-axis
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakFlow;

impl NoiseGenerator for StreakFlow {
    impl_generator_common!(
        "streak_flow",
        "Streak Flow",
        "Directional streaks stretched along a warped flow axis",
        STREAK_FLOW_PARAMS,
        STREAK_FLOW_PRESETS
    );

    fn render(&self, width: u32, height: u32, params: &NoiseParams) -> ScalarField {
        let seed = seed_from_text(params.get_str("seed"));
        let warp_seed = mix_seed(seed, 21);
        let direction = params.get_f64("direction");
        let scale = params.get_f64("scale");
        let stretch = params.get_f64("stretch");
        let warp = params.get_f64("warp");
        let warp_scale = params.get_f64("warpScale");
        let settings = FbmSettings::new(params.get_u32("octaves"), 0.5, 2.0);
        let warp_settings = FbmSettings::new(2, 0.5, 2.0);

        ScalarField::from_uv_fn(width, height, |u, v| {
            // Rotating by -direction maps the flow direction onto the along axis
            let (along, cross) = rotate(u - 0.5, v - 0.5, -direction);
            let offset = (fbm(along * warp_scale, cross * warp_scale, warp_seed, warp_settings)
                - 0.5)
                * warp;
            fbm((along + offset) * scale / stretch, cross * scale, seed, settings)
        })
    }
}

// ============================================================================
// Blotch
// ============================================================================

/// Low-frequency fBm through a soft threshold
#[derive(Debug, Clone, Copy, Default)]
pub struct Blotch;

impl NoiseGenerator for Blotch {
    impl_generator_common!(
        "blotch",
        "Blotch",
        "Large soft-edged patches from thresholded low-frequency fBm",
        BLOTCH_PARAMS,
        BLOTCH_PRESETS
    );

    fn render(&self, width: u32, height: u32, params: &NoiseParams) -> ScalarField {
        let seed = seed_from_text(params.get_str("seed"));
        let scale = params.get_f64("scale");
        let threshold = params.get_f64("threshold");
        let softness = params.get_f64("softness");
        let settings = FbmSettings::new(params.get_u32("octaves"), 0.5, 2.0);

        ScalarField::from_uv_fn(width, height, |u, v| {
            let n = fbm(u * scale, v * scale, seed, settings);
            smoothstep(threshold - softness, threshold + softness, n)
        })
    }
}
