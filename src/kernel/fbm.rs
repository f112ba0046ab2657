//! Value noise and fractal Brownian motion

use super::hash::{hash_unit, mix_seed};
use super::{lerp, quintic};

/// Octave ceiling; bounds the per-sample cost of every fBm call
pub const MAX_OCTAVES: u32 = 8;

/// Octave settings for a fractal sum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FbmSettings {
    pub octaves: u32,
    /// Amplitude multiplier per octave
    pub gain: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
}

impl Default for FbmSettings {
    fn default() -> Self {
        Self {
            octaves: 4,
            gain: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl FbmSettings {
    pub fn new(octaves: u32, gain: f64, lacunarity: f64) -> Self {
        Self {
            octaves,
            gain,
            lacunarity,
        }
    }
}

/// Smoothed value noise in [0, 1].
///
/// Interpolates hashed lattice values at the four surrounding corners with
/// a quintic curve; linear interpolation would leave visible grid seams.
pub fn value_noise(x: f64, y: f64, seed: u32) -> f64 {
    let x0 = x.floor();
    let y0 = y.floor();
    let ix = x0 as i32;
    let iy = y0 as i32;
    let tx = quintic(x - x0);
    let ty = quintic(y - y0);

    let v00 = hash_unit(ix, iy, seed);
    let v10 = hash_unit(ix.wrapping_add(1), iy, seed);
    let v01 = hash_unit(ix, iy.wrapping_add(1), seed);
    let v11 = hash_unit(ix.wrapping_add(1), iy.wrapping_add(1), seed);

    let a = lerp(v00, v10, tx);
    let b = lerp(v01, v11, tx);
    lerp(a, b, ty)
}

/// Fractal sum of value noise, normalized to [0, 1].
///
/// `octaves` is clamped to `1..=MAX_OCTAVES`. Each octave samples its own
/// seed stream so octaves do not line up at the origin.
pub fn fbm(x: f64, y: f64, seed: u32, settings: FbmSettings) -> f64 {
    let octaves = settings.octaves.clamp(1, MAX_OCTAVES);
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut sum = 0.0;
    let mut norm = 0.0;

    for octave in 0..octaves {
        let octave_seed = mix_seed(seed, octave);
        sum += amplitude * value_noise(x * frequency, y * frequency, octave_seed);
        norm += amplitude;
        amplitude *= settings.gain;
        frequency *= settings.lacunarity;
    }

    if norm <= 0.0 {
        return 0.5;
    }
    (sum / norm).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_noise_hits_lattice_values() {
        // At integer coordinates the smoothing weight is zero.
        let v = value_noise(3.0, 4.0, 11);
        assert_eq!(v, hash_unit(3, 4, 11));
    }

    #[test]
    fn test_value_noise_range() {
        for i in 0..200 {
            let x = i as f64 * 0.173 - 10.0;
            let v = value_noise(x, x * 0.7, 5);
            assert!((0.0..=1.0).contains(&v), "value {} out of range", v);
        }
    }

    #[test]
    fn test_fbm_range_and_determinism() {
        let settings = FbmSettings::new(6, 0.55, 2.1);
        for i in 0..100 {
            let x = i as f64 * 0.37;
            let a = fbm(x, -x, 1234, settings);
            let b = fbm(x, -x, 1234, settings);
            assert_eq!(a.to_bits(), b.to_bits());
            assert!((0.0..=1.0).contains(&a));
        }
    }

    #[test]
    fn test_fbm_octaves_clamped() {
        let high = FbmSettings::new(40, 0.5, 2.0);
        let capped = FbmSettings::new(MAX_OCTAVES, 0.5, 2.0);
        assert_eq!(fbm(0.3, 0.9, 7, high), fbm(0.3, 0.9, 7, capped));

        let zero = FbmSettings::new(0, 0.5, 2.0);
        let one = FbmSettings::new(1, 0.5, 2.0);
        assert_eq!(fbm(0.3, 0.9, 7, zero), fbm(0.3, 0.9, 7, one));
    }
}
