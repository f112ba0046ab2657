//! Worley-based generators: cellular and crackle/fracture

use super::params::{NoiseParams, ParamSpec, Preset, PresetValue};
use super::NoiseGenerator;
use crate::engine::ScalarField;
use crate::impl_generator_common;
use crate::kernel::{
    clamp01, fbm, hash_unit, lerp, mix_seed, seed_from_text, smoothstep, FbmSettings,
};

const CELLULAR_PARAMS: &[ParamSpec] = &[
    ParamSpec::range("scale", "Scale", 1.0, 128.0, 8.0),
    ParamSpec::range("jitter", "Jitter", 0.0, 1.0, 1.0),
    ParamSpec::range("edgeBlend", "Edge Blend", 0.0, 1.0, 0.35),
];

const CRACKLE_PARAMS: &[ParamSpec] = &[
    ParamSpec::range("scale", "Scale", 1.0, 64.0, 6.0),
    ParamSpec::range("distortion", "Distortion", 0.0, 1.0, 0.25),
    ParamSpec::range("distortionScale", "Distortion Scale", 0.5, 32.0, 4.0),
    ParamSpec::range("width", "Crack Width", 0.005, 0.5, 0.05),
    ParamSpec::range("softness", "Softness", 0.0, 1.0, 0.5),
];

const CELLULAR_PRESETS: &[Preset] = &[
    Preset {
        id: "pebbles",
        label: "Pebbles",
        overrides: &[
            ("scale", PresetValue::Num(10.0)),
            ("edgeBlend", PresetValue::Num(0.1)),
        ],
    },
    Preset {
        id: "cell_walls",
        label: "Cell Walls",
        overrides: &[
            ("scale", PresetValue::Num(6.0)),
            ("edgeBlend", PresetValue::Num(0.9)),
        ],
    },
];

const CRACKLE_PRESETS: &[Preset] = &[
    Preset {
        id: "dried_mud",
        label: "Dried Mud",
        overrides: &[
            ("scale", PresetValue::Num(5.0)),
            ("width", PresetValue::Num(0.08)),
            ("distortion", PresetValue::Num(0.35)),
        ],
    },
    Preset {
        id: "hairline",
        label: "Hairline",
        overrides: &[
            ("scale", PresetValue::Num(10.0)),
            ("width", PresetValue::Num(0.015)),
            ("softness", PresetValue::Num(0.3)),
        ],
    },
];

/// Distance from `(x, y)` to the nearest and second-nearest feature points.
///
/// Searches the 3x3 neighbourhood of unit cells. Each cell's feature point
/// sits at the cell centre displaced by up to `jitter / 2` per axis.
pub fn worley(x: f64, y: f64, seed: u32, jitter: f64) -> (f64, f64) {
    let cx = x.floor() as i32;
    let cy = y.floor() as i32;
    let seed_y = mix_seed(seed, 0x5BD1);
    let mut d1 = f64::MAX;
    let mut d2 = f64::MAX;

    for oy in -1..=1 {
        for ox in -1..=1 {
            let ix = cx.wrapping_add(ox);
            let iy = cy.wrapping_add(oy);
            let px = ix as f64 + 0.5 + (hash_unit(ix, iy, seed) - 0.5) * jitter;
            let py = iy as f64 + 0.5 + (hash_unit(ix, iy, seed_y) - 0.5) * jitter;
            let d = ((x - px).powi(2) + (y - py).powi(2)).sqrt();
            if d < d1 {
                d2 = d1;
                d1 = d;
            } else if d < d2 {
                d2 = d;
            }
        }
    }

    (d1, d2)
}

// ============================================================================
// Cellular
// ============================================================================

/// Worley noise mixing a cell-body term with a cell-edge term
#[derive(Debug, Clone, Copy, Default)]
pub struct Cellular;

impl NoiseGenerator for Cellular {
    impl_generator_common!(
        "cellular",
        "Cellular",
        "Worley cells: body falloff blended with d2 - d1 edges",
        CELLULAR_PARAMS,
        CELLULAR_PRESETS
    );

    fn render(&self, width: u32, height: u32, params: &NoiseParams) -> ScalarField {
        let seed = seed_from_text(params.get_str("seed"));
        let scale = params.get_f64("scale");
        let jitter = params.get_f64("jitter");
        let edge_blend = params.get_f64("edgeBlend");

        ScalarField::from_uv_fn(width, height, |u, v| {
            let (d1, d2) = worley(u * scale, v * scale, seed, jitter);
            let body = 1.0 - clamp01(d1);
            let edge = clamp01(d2 - d1);
            lerp(body, edge, edge_blend)
        })
    }
}

// ============================================================================
// Crackle
// ============================================================================

/// Thin crack lines from a thresholded, domain-distorted Worley edge metric
#[derive(Debug, Clone, Copy, Default)]
pub struct Crackle;

impl NoiseGenerator for Crackle {
    impl_generator_common!(
        "crackle",
        "Crackle",
        "Fracture lines along distorted Worley cell borders",
        CRACKLE_PARAMS,
        CRACKLE_PRESETS
    );

    fn render(&self, width: u32, height: u32, params: &NoiseParams) -> ScalarField {
        let seed = seed_from_text(params.get_str("seed"));
        let warp_u_seed = mix_seed(seed, 11);
        let warp_v_seed = mix_seed(seed, 12);
        let scale = params.get_f64("scale");
        let distortion = params.get_f64("distortion");
        let distortion_scale = params.get_f64("distortionScale");
        let crack_width = params.get_f64("width");
        let softness = params.get_f64("softness");
        let warp = FbmSettings::new(3, 0.5, 2.0);

        ScalarField::from_uv_fn(width, height, |u, v| {
            let du = (fbm(u * distortion_scale, v * distortion_scale, warp_u_seed, warp) - 0.5)
                * distortion;
            let dv = (fbm(u * distortion_scale, v * distortion_scale, warp_v_seed, warp) - 0.5)
                * distortion;
            let (d1, d2) = worley((u + du) * scale, (v + dv) * scale, seed, 1.0);
            1.0 - smoothstep(crack_width * (1.0 - softness), crack_width, d2 - d1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worley_orders_distances() {
        for i in 0..50 {
            let x = i as f64 * 0.31;
            let (d1, d2) = worley(x, x * 1.7, 9, 1.0);
            assert!(d1 <= d2);
            assert!(d1 >= 0.0);
        }
    }

    #[test]
    fn test_worley_without_jitter_is_regular_grid() {
        // Feature points at cell centres: sampling a centre gives d1 = 0
        let (d1, d2) = worley(2.5, 3.5, 77, 0.0);
        assert_eq!(d1, 0.0);
        assert_eq!(d2, 1.0);
    }

    #[test]
    fn test_cellular_edge_blend_extremes() {
        let body = Cellular.generate(32, 32, &NoiseParams::new().with_param("edgeBlend", 0.0));
        let edge = Cellular.generate(32, 32, &NoiseParams::new().with_param("edgeBlend", 1.0));
        assert_ne!(body, edge);
    }

    #[test]
    fn test_crackle_is_mostly_background() {
        let field = Crackle.generate(64, 64, &NoiseParams::new().with_param("width", 0.02));
        let stats = field.stats();
        assert!(stats.mean < 0.5, "cracks should be thin, mean {}", stats.mean);
        assert!(stats.max > 0.5, "expected at least one crack sample");
    }
}
