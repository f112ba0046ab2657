//! Per-layer UV transform
//!
//! A layer's generated field is remapped by scale, rotation and offset with
//! wrapped bilinear resampling, so the kernel never re-runs for a placement
//! change.

use serde::{Deserialize, Serialize};

use super::field::ScalarField;
use crate::kernel::rotate;

// ============================================================================
// Constants
// ============================================================================

pub const MIN_SCALE: f64 = 0.05;
pub const MAX_SCALE: f64 = 64.0;

/// Coordinate space a transform request was authored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingSpace {
    #[default]
    Uv,
    /// Not supported; requests are downgraded to UV
    World,
}

/// UV-space affine placement of a layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UvTransform {
    pub scale: f64,
    pub rotation_deg: f64,
    pub offset_u: f64,
    pub offset_v: f64,
}

impl Default for UvTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Partial transform update; `None` keeps the current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformPatch {
    pub scale: Option<f64>,
    pub rotation_deg: Option<f64>,
    pub offset_u: Option<f64>,
    pub offset_v: Option<f64>,
    pub space: Option<SamplingSpace>,
}

impl TransformPatch {
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation_deg = Some(degrees);
        self
    }

    pub fn offset(mut self, u: f64, v: f64) -> Self {
        self.offset_u = Some(u);
        self.offset_v = Some(v);
        self
    }

    pub fn space(mut self, space: SamplingSpace) -> Self {
        self.space = Some(space);
        self
    }

    /// Whether this patch asks for world-space sampling
    pub fn requests_world_space(&self) -> bool {
        self.space == Some(SamplingSpace::World)
    }
}

impl UvTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        rotation_deg: 0.0,
        offset_u: 0.0,
        offset_v: 0.0,
    };

    /// Exact identity: scale 1, rotation a whole number of turns, no offset
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0
            && self.rotation_deg.rem_euclid(360.0) == 0.0
            && self.offset_u == 0.0
            && self.offset_v == 0.0
    }

    /// Clamp scale, normalize rotation into (-180, 180] and wrap offsets into [0, 1)
    pub fn sanitized(&self) -> Self {
        let scale = if self.scale.is_finite() {
            self.scale.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            1.0
        };
        Self {
            scale,
            rotation_deg: normalize_degrees(self.rotation_deg),
            offset_u: wrap_unit(self.offset_u),
            offset_v: wrap_unit(self.offset_v),
        }
    }

    /// Merge a patch over this transform and re-sanitize.
    ///
    /// The `space` field is ignored here; callers report world-space requests.
    pub fn patched(&self, patch: &TransformPatch) -> Self {
        Self {
            scale: patch.scale.unwrap_or(self.scale),
            rotation_deg: patch.rotation_deg.unwrap_or(self.rotation_deg),
            offset_u: patch.offset_u.unwrap_or(self.offset_u),
            offset_v: patch.offset_v.unwrap_or(self.offset_v),
        }
        .sanitized()
    }

    /// Resample `source` through this transform.
    ///
    /// Each output pixel centre is rotated by `-rotation_deg` about the
    /// middle, scaled, offset, and bilinearly sampled with toroidal wrap.
    /// The identity transform returns an exact copy.
    pub fn apply(&self, source: &ScalarField) -> ScalarField {
        if self.is_identity() || source.is_empty() {
            return source.clone();
        }

        let w = source.width() as f64;
        let h = source.height() as f64;
        let mut out = Vec::with_capacity(source.len());

        for y in 0..source.height() {
            let v = (y as f64 + 0.5) / h;
            for x in 0..source.width() {
                let u = (x as f64 + 0.5) / w;
                let (cu, cv) = rotate(u - 0.5, v - 0.5, -self.rotation_deg);
                let su = cu * self.scale + 0.5 + self.offset_u;
                let sv = cv * self.scale + 0.5 + self.offset_v;
                out.push(sample_bilinear_wrapped(source, su * w - 0.5, sv * h - 0.5));
            }
        }

        ScalarField::from_vec(source.width(), source.height(), out)
            .unwrap_or_else(|| source.clone())
    }
}

/// Bilinear sample at continuous pixel coordinates with wrap-around
fn sample_bilinear_wrapped(field: &ScalarField, px: f64, py: f64) -> f32 {
    let x0 = px.floor();
    let y0 = py.floor();
    let fx = px - x0;
    let fy = py - y0;
    let ix = x0 as i64;
    let iy = y0 as i64;

    let a = field.get_wrapped(ix, iy) as f64;
    let b = field.get_wrapped(ix + 1, iy) as f64;
    let c = field.get_wrapped(ix, iy + 1) as f64;
    let d = field.get_wrapped(ix + 1, iy + 1) as f64;

    let top = a + (b - a) * fx;
    let bottom = c + (d - c) * fx;
    (top + (bottom - top) * fy) as f32
}

fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    // Values already in range are kept bit-exact
    if degrees > -180.0 && degrees <= 180.0 {
        return degrees;
    }
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

fn wrap_unit(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    if (0.0..1.0).contains(&value) {
        return value;
    }
    let wrapped = value.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp() -> ScalarField {
        ScalarField::from_vec(4, 1, vec![0.0, 0.25, 0.5, 0.75]).unwrap()
    }

    #[test]
    fn test_identity_is_bit_exact() {
        let field = ScalarField::from_uv_fn(7, 5, |u, v| (u * 13.1 + v * 3.7).fract());
        let out = UvTransform::IDENTITY.apply(&field);
        assert_eq!(out.digest(), field.digest());

        let full_turn = UvTransform {
            rotation_deg: 720.0,
            ..UvTransform::IDENTITY
        };
        assert!(full_turn.is_identity());
    }

    #[test]
    fn test_offset_by_whole_pixel_shifts() {
        let transform = UvTransform {
            offset_u: 0.25,
            ..UvTransform::IDENTITY
        };
        let out = transform.apply(&ramp());
        assert_relative_eq!(out.data()[0], 0.25);
        assert_relative_eq!(out.data()[3], 0.0);
    }

    #[test]
    fn test_half_pixel_offset_blends_neighbours() {
        let transform = UvTransform {
            offset_u: 0.125,
            ..UvTransform::IDENTITY
        };
        let out = transform.apply(&ramp());
        assert_relative_eq!(out.data()[0], 0.125);
        // Wraps from the last pixel back to the first
        assert_relative_eq!(out.data()[3], 0.375);
    }

    #[test]
    fn test_sanitize_bounds() {
        let t = UvTransform {
            scale: 500.0,
            rotation_deg: 270.0,
            offset_u: -0.25,
            offset_v: 3.5,
        }
        .sanitized();
        assert_eq!(t.scale, MAX_SCALE);
        assert_eq!(t.rotation_deg, -90.0);
        assert_eq!(t.offset_u, 0.75);
        assert_eq!(t.offset_v, 0.5);

        let t = UvTransform {
            scale: f64::NAN,
            rotation_deg: -180.0,
            offset_u: f64::INFINITY,
            offset_v: 0.0,
        }
        .sanitized();
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.rotation_deg, 180.0);
        assert_eq!(t.offset_u, 0.0);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let t = UvTransform {
            scale: 0.01,
            rotation_deg: -540.3,
            offset_u: -1e-18,
            offset_v: 12.75,
        }
        .sanitized();
        assert_eq!(t.sanitized(), t);
    }

    #[test]
    fn test_patch_merges_over_current() {
        let current = UvTransform {
            scale: 2.0,
            ..UvTransform::IDENTITY
        };
        let patched = current.patched(&TransformPatch::default().rotation(45.0));
        assert_eq!(patched.scale, 2.0);
        assert_eq!(patched.rotation_deg, 45.0);
    }

    #[test]
    fn test_rotation_half_turn_mirrors() {
        let field = ScalarField::from_vec(2, 2, vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let t = UvTransform {
            rotation_deg: 180.0,
            ..UvTransform::IDENTITY
        };
        let out = t.apply(&field);
        assert_relative_eq!(out.data()[0], 0.4, epsilon = 1e-6);
        assert_relative_eq!(out.data()[3], 0.1, epsilon = 1e-6);
    }
}
