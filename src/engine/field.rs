//! Scalar field buffer
//!
//! Row-major `f32` samples, nominally in [0, 1]. Every generator, the
//! transform and the compositor exchange data through this type.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 2D scalar field stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

/// Summary statistics for a field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl ScalarField {
    /// Create a field filled with zeros
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0.0)
    }

    /// Create a field filled with a constant value
    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    /// Build a field from raw row-major data.
    ///
    /// Returns `None` if the length does not match `width * height`.
    pub fn from_vec(width: u32, height: u32, data: Vec<f32>) -> Option<Self> {
        if data.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Build a field by sampling `f(u, v)` at every pixel centre.
    ///
    /// `u = (x + 0.5) / width`, `v = (y + 0.5) / height`. Results are
    /// clamped to [0, 1].
    pub fn from_uv_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(f64, f64) -> f64,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        let w = width as f64;
        let h = height as f64;
        for y in 0..height {
            let v = (y as f64 + 0.5) / h;
            for x in 0..width {
                let u = (x as f64 + 0.5) / w;
                data.push(f(u, v).clamp(0.0, 1.0) as f32);
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at integer coordinates (no bounds wrapping)
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y as usize * self.width as usize + x as usize).copied()
    }

    /// Sample with toroidal wrap-around addressing
    #[inline]
    pub fn get_wrapped(&self, x: i64, y: i64) -> f32 {
        let w = self.width as i64;
        let h = self.height as i64;
        let xi = x.rem_euclid(w) as usize;
        let yi = y.rem_euclid(h) as usize;
        self.data[yi * self.width as usize + xi]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Apply `f` to every sample in place
    pub fn map_in_place<F>(&mut self, mut f: F)
    where
        F: FnMut(f32) -> f32,
    {
        for sample in self.data.iter_mut() {
            *sample = f(*sample);
        }
    }

    /// Compute min/max/mean. An empty field reports zeros.
    pub fn stats(&self) -> FieldStats {
        if self.data.is_empty() {
            return FieldStats {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
            };
        }
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
            sum += v as f64;
        }
        FieldStats {
            min,
            max,
            mean: (sum / self.data.len() as f64) as f32,
        }
    }

    /// SHA-256 of the dimensions and little-endian sample bytes, hex encoded.
    ///
    /// Two fields share a digest only if they are bit-identical.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        for v in &self.data {
            hasher.update(v.to_le_bytes());
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_uv_fn_uses_pixel_centres() {
        let field = ScalarField::from_uv_fn(2, 2, |u, v| u + v * 0.0);
        assert_eq!(field.data(), &[0.25, 0.75, 0.25, 0.75]);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert!(ScalarField::from_vec(2, 2, vec![0.0; 3]).is_none());
        assert!(ScalarField::from_vec(2, 2, vec![0.0; 4]).is_some());
    }

    #[test]
    fn test_get_wrapped() {
        let field = ScalarField::from_vec(2, 1, vec![0.1, 0.9]).unwrap();
        assert_eq!(field.get_wrapped(-1, 0), 0.9);
        assert_eq!(field.get_wrapped(2, 5), 0.1);
    }

    #[test]
    fn test_stats() {
        let field = ScalarField::from_vec(2, 2, vec![0.0, 0.5, 1.0, 0.5]).unwrap();
        let stats = field.stats();
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 1.0);
        assert_eq!(stats.mean, 0.5);
    }

    #[test]
    fn test_digest_tracks_content() {
        let a = ScalarField::filled(4, 4, 0.5);
        let b = ScalarField::filled(4, 4, 0.5);
        let c = ScalarField::filled(4, 4, 0.25);
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
        assert_eq!(a.digest().len(), 64);
    }
}
