//! Equirectangular to unit-sphere projection

use std::f32::consts::{PI, TAU};

use crate::core::types::Vec3;

/// Maps equirectangular texture coordinates onto the unit sphere.
///
/// `u` runs along longitude and `v` from the north pole (`v = 0`) to the
/// south pole (`v = 1`). Longitude wraps, so `u = 0` and `u = 1` land on the
/// same meridian. Both poles collapse to a single point.
#[derive(Clone, Copy, Debug, Default)]
pub struct SphericalProjector;

impl SphericalProjector {
    /// Project `(u, v)` in `[0, 1]²` to a point on the unit sphere.
    #[inline]
    pub fn project(u: f32, v: f32) -> Vec3 {
        let phi = u.rem_euclid(1.0) * TAU;
        let theta = v.clamp(0.0, 1.0) * PI;
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi)
    }

    /// Texture coordinate of a pixel, edge-inclusive.
    ///
    /// Column 0 maps to `u = 0` and column `size - 1` to `u = 1`, so the
    /// first and last columns sample the same meridian.
    #[inline]
    pub fn pixel_uv(px: u32, py: u32, size: u32) -> (f32, f32) {
        if size < 2 {
            return (0.0, 0.0);
        }
        let last = (size - 1) as f32;
        (px as f32 / last, py as f32 / last)
    }

    /// Project the pixel at `(px, py)` of a `size`×`size` texture.
    #[inline]
    pub fn project_pixel(px: u32, py: u32, size: u32) -> Vec3 {
        let (u, v) = Self::pixel_uv(px, py, size);
        Self::project(u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_unit_length() {
        for i in 0..=16 {
            for j in 0..=16 {
                let p = SphericalProjector::project(i as f32 / 16.0, j as f32 / 16.0);
                assert!((p.length() - 1.0).abs() < 1e-5, "({}, {}) -> {:?}", i, j, p);
            }
        }
    }

    #[test]
    fn test_project_wraps_longitude() {
        for j in 0..=8 {
            let v = j as f32 / 8.0;
            assert_eq!(SphericalProjector::project(0.0, v), SphericalProjector::project(1.0, v));
        }
    }

    #[test]
    fn test_project_poles() {
        let north = SphericalProjector::project(0.37, 0.0);
        assert_eq!(north, Vec3::new(0.0, 1.0, 0.0));

        let south_a = SphericalProjector::project(0.1, 1.0);
        let south_b = SphericalProjector::project(0.8, 1.0);
        assert!((south_a - south_b).length() < 1e-6);
        assert!((south_a.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_project_equator() {
        let p = SphericalProjector::project(0.0, 0.5);
        assert!((p.x - 1.0).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);

        let q = SphericalProjector::project(0.25, 0.5);
        assert!((q.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_pixel_uv_edges() {
        assert_eq!(SphericalProjector::pixel_uv(0, 0, 256), (0.0, 0.0));
        assert_eq!(SphericalProjector::pixel_uv(255, 255, 256), (1.0, 1.0));
        assert_eq!(SphericalProjector::pixel_uv(3, 3, 1), (0.0, 0.0));
    }
}
