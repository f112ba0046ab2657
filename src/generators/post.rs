//! Shared invert/bias/contrast post-processing

use super::params::NoiseParams;
use crate::engine::ScalarField;

/// Apply `v' = clamp01(0.5 + (x - 0.5) * contrast + bias)` where `x` is
/// `1 - v` when inverted and `v` otherwise.
///
/// Neutral settings leave the field untouched so the samples stay bit-exact.
pub fn apply_post_process(field: &mut ScalarField, params: &NoiseParams) {
    let invert = params.get_bool("invert");
    let bias = params.get_f64("bias");
    let contrast = params.get_f64("contrast");

    if !invert && bias == 0.0 && contrast == 1.0 {
        return;
    }

    field.map_in_place(|v| {
        let x = if invert { 1.0 - v as f64 } else { v as f64 };
        (0.5 + (x - 0.5) * contrast + bias).clamp(0.0, 1.0) as f32
    });
}
