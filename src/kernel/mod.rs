//! Hash/Noise Kernel
//!
//! Deterministic lattice hashing, smoothed value noise and fractal sums.
//! Every generator builds on these; nothing here holds state.

mod fbm;
mod hash;

pub use fbm::{fbm, value_noise, FbmSettings, MAX_OCTAVES};
pub use hash::{hash_u32, hash_unit, mix_seed, seed_from_text};

/// Quintic smoothing curve (C2 continuous)
#[inline]
pub fn quintic(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Hermite smoothstep between two edges.
///
/// Degenerate edges collapse to a hard step at `edge1`.
#[inline]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let delta = edge1 - edge0;
    if delta.abs() <= f64::EPSILON {
        return if x >= edge1 { 1.0 } else { 0.0 };
    }
    let t = ((x - edge0) / delta).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
pub fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Rotate a 2D vector by `degrees` (counter-clockwise)
#[inline]
pub fn rotate(x: f64, y: f64, degrees: f64) -> (f64, f64) {
    if degrees == 0.0 {
        return (x, y);
    }
    let (s, c) = degrees.to_radians().sin_cos();
    (x * c - y * s, x * s + y * c)
}
