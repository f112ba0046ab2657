//! Generator Library
//!
//! A fixed registry of noise kinds. Each kind is a stateless strategy object
//! bundling its parameter schema, presets and a pure field renderer.
//! All generators implement the `NoiseGenerator` trait for uniform dispatch.

mod bands;
mod cellular;
mod fbm;
mod params;
mod post;
mod registry;
mod surface;

pub use bands::{band_signal, LineBands, TileGrid};
pub use cellular::{worley, Cellular, Crackle};
pub use fbm::{DirectionalFbm, RidgedFbm, ValueFbm};
pub use params::{
    default_params, sanitize_params, truncate_text, NoiseParams, ParamSpec, ParamType,
    ParamValue, Preset, PresetValue, MAX_TEXT_LEN,
};
pub use post::apply_post_process;
pub use registry::{
    get_generator, list_generators, resolve_generator, DEFAULT_GENERATOR_ID,
};
pub use surface::{Blotch, EdgeWear, MicroGrain, StreakFlow};

use crate::engine::ScalarField;

/// Post-processing parameters shared by every generator
pub const COMMON_PARAMS: &[ParamSpec] = &[
    ParamSpec::text("seed", "Seed", "fabrica"),
    ParamSpec::toggle("invert", "Invert", false),
    ParamSpec::range("bias", "Bias", -1.0, 1.0, 0.0),
    ParamSpec::range("contrast", "Contrast", 0.0, 4.0, 1.0),
];

/// Base trait for all noise kinds
///
/// Implementations must be pure: `render` output depends only on its
/// arguments, so identical inputs give bit-identical fields.
pub trait NoiseGenerator: Send + Sync {
    /// Stable kind tag stored in layers and recipes
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn label(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Generator-specific parameters (without `COMMON_PARAMS`)
    fn own_params(&self) -> &'static [ParamSpec];

    /// Named presets
    fn presets(&self) -> &'static [Preset];

    /// Render raw values from already-sanitized parameters.
    ///
    /// Post-processing (invert/bias/contrast) is applied by `generate`.
    fn render(&self, width: u32, height: u32, params: &NoiseParams) -> ScalarField;

    /// Full schema: own parameters followed by the shared ones
    fn schema(&self) -> Vec<ParamSpec> {
        self.own_params()
            .iter()
            .chain(COMMON_PARAMS.iter())
            .copied()
            .collect()
    }

    fn defaults(&self) -> NoiseParams {
        default_params(&self.schema())
    }

    /// Clamp a raw map into this generator's declared ranges
    fn sanitize(&self, raw: &NoiseParams) -> NoiseParams {
        sanitize_params(&self.schema(), raw)
    }

    fn preset(&self, preset_id: &str) -> Option<&'static Preset> {
        self.presets().iter().find(|p| p.id == preset_id)
    }

    /// Sanitized defaults with a preset's overrides applied
    fn preset_params(&self, preset_id: &str) -> Option<NoiseParams> {
        self.preset(preset_id)
            .map(|preset| self.sanitize(&preset.apply_to(&self.defaults())))
    }

    /// Sanitize, render and post-process
    fn generate(&self, width: u32, height: u32, raw: &NoiseParams) -> ScalarField {
        let params = self.sanitize(raw);
        let mut field = self.render(width, height, &params);
        apply_post_process(&mut field, &params);
        field
    }
}

/// Helper macro to implement the descriptive NoiseGenerator methods
#[macro_export]
macro_rules! impl_generator_common {
    ($id:expr, $label:expr, $description:expr, $params:expr, $presets:expr) => {
        fn id(&self) -> &'static str {
            $id
        }

        fn label(&self) -> &'static str {
            $label
        }

        fn description(&self) -> &'static str {
            $description
        }

        fn own_params(&self) -> &'static [$crate::generators::ParamSpec] {
            $params
        }

        fn presets(&self) -> &'static [$crate::generators::Preset] {
            $presets
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_generator_renders_in_range() {
        for generator in list_generators() {
            let field = generator.generate(16, 12, &NoiseParams::new());
            assert_eq!(field.len(), 16 * 12, "{}", generator.id());
            assert!(
                field.data().iter().all(|v| (0.0..=1.0).contains(v)),
                "{} produced out-of-range values",
                generator.id()
            );
        }
    }

    #[test]
    fn test_every_generator_is_deterministic() {
        for generator in list_generators() {
            let params = NoiseParams::new().with_param("seed", "determinism");
            let a = generator.generate(9, 7, &params);
            let b = generator.generate(9, 7, &params);
            assert_eq!(a.digest(), b.digest(), "{}", generator.id());
        }
    }

    #[test]
    fn test_seed_changes_output() {
        for id in ["value_fbm", "cellular", "crackle", "micro_grain"] {
            let generator = get_generator(id).unwrap();
            let a = generator.generate(8, 8, &NoiseParams::new().with_param("seed", "a"));
            let b = generator.generate(8, 8, &NoiseParams::new().with_param("seed", "b"));
            assert_ne!(a, b, "{} ignored its seed", id);
        }
    }

    #[test]
    fn test_presets_only_override_declared_keys() {
        for generator in list_generators() {
            let schema = generator.schema();
            assert!(generator.presets().len() >= 2, "{}", generator.id());
            for preset in generator.presets() {
                for (key, _) in preset.overrides {
                    assert!(
                        schema.iter().any(|spec| spec.key == *key),
                        "{}:{} overrides unknown key {}",
                        generator.id(),
                        preset.id,
                        key
                    );
                }
            }
        }
    }

    #[test]
    fn test_schema_ends_with_common_params() {
        let generator = get_generator("value_fbm").unwrap();
        let schema = generator.schema();
        let tail: Vec<&str> = schema[schema.len() - COMMON_PARAMS.len()..]
            .iter()
            .map(|s| s.key)
            .collect();
        assert_eq!(tail, vec!["seed", "invert", "bias", "contrast"]);
    }
}
