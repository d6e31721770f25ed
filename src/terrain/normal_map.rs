//! Tangent-space normal maps from height grids.

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::texture::buffer::{HeightGrid, PixelBuffer};

/// Vectors shorter than this are replaced by the flat normal.
const MIN_NORMAL_LENGTH: f32 = 1e-8;

/// Central-difference normal synthesis with toroidal wraparound.
#[derive(Clone, Copy, Debug)]
pub struct NormalMapSynthesizer {
    strength: f32,
}

impl NormalMapSynthesizer {
    pub fn new(strength: f32) -> Self {
        Self { strength }
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Unit normal at a grid cell.
    pub fn normal_at(&self, grid: &HeightGrid, x: u32, y: u32) -> Vec3 {
        let (x, y) = (x as i64, y as i64);
        let left = grid.get_wrapped(x - 1, y);
        let right = grid.get_wrapped(x + 1, y);
        let up = grid.get_wrapped(x, y - 1);
        let down = grid.get_wrapped(x, y + 1);

        let dx = (left - right) * self.strength * 0.5;
        let dy = (up - down) * self.strength * 0.5;

        let n = Vec3::new(dx, dy, 1.0);
        let len = n.length();
        if !len.is_finite() || len < MIN_NORMAL_LENGTH {
            return Vec3::Z;
        }
        n / len
    }

    /// Build the normal map for `grid`, which must be `size`×`size`.
    pub fn synthesize(&self, grid: &HeightGrid, size: u32) -> Result<PixelBuffer> {
        if grid.size() != size {
            return Err(Error::DimensionMismatch { expected: size, actual: grid.size() });
        }

        let mut out = PixelBuffer::new(size);
        for y in 0..size {
            for x in 0..size {
                out.set(x, y, encode_normal(self.normal_at(grid, x, y)));
            }
        }
        Ok(out)
    }
}

/// Map a unit normal from `[-1, 1]` to RGBA bytes.
#[inline]
pub fn encode_normal(n: Vec3) -> [u8; 4] {
    let enc = |v: f32| ((v * 0.5 + 0.5) * 255.0).round().clamp(0.0, 255.0) as u8;
    [enc(n.x), enc(n.y), enc(n.z), 255]
}

/// Inverse of [`encode_normal`], without renormalizing.
#[inline]
pub fn decode_normal(rgba: [u8; 4]) -> Vec3 {
    let dec = |b: u8| b as f32 / 255.0 * 2.0 - 1.0;
    Vec3::new(dec(rgba[0]), dec(rgba[1]), dec(rgba[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_grid(size: u32) -> HeightGrid {
        let values = (0..size * size).map(|i| (i % size) as f32 / size as f32).collect();
        HeightGrid::from_values(size, values).unwrap()
    }

    #[test]
    fn test_flat_grid_gives_flat_normals() {
        let grid = HeightGrid::from_values(4, vec![0.5; 16]).unwrap();
        let map = NormalMapSynthesizer::new(2.0).synthesize(&grid, 4).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(map.get(x, y), [128, 128, 255, 255]);
            }
        }
    }

    #[test]
    fn test_slope_direction() {
        let grid = ramp_grid(8);
        let synth = NormalMapSynthesizer::new(1.0);
        // Heights increase to the right, so the normal leans left.
        let n = synth.normal_at(&grid, 3, 3);
        assert!(n.x < 0.0);
        assert!(n.y.abs() < 1e-6);
        assert!((n.length() - 1.0).abs() < 1e-6);

        let expected_dx = (2.0 / 8.0 - 4.0 / 8.0) * 0.5;
        let expected = Vec3::new(expected_dx, 0.0, 1.0).normalize();
        assert!((n - expected).length() < 1e-6);
    }

    #[test]
    fn test_wraparound_at_edges() {
        let grid = ramp_grid(8);
        let synth = NormalMapSynthesizer::new(1.0);
        // Column 0's left neighbour is column 7, the top of the ramp.
        let n = synth.normal_at(&grid, 0, 0);
        assert!(n.x > 0.0);
    }

    #[test]
    fn test_zero_strength_is_flat() {
        let grid = ramp_grid(8);
        let map = NormalMapSynthesizer::new(0.0).synthesize(&grid, 8).unwrap();
        assert!(map.pixels().iter().all(|p| *p == [128, 128, 255, 255]));
    }

    #[test]
    fn test_non_finite_strength_falls_back_to_flat() {
        let grid = ramp_grid(4);
        let n = NormalMapSynthesizer::new(f32::INFINITY).normal_at(&grid, 1, 1);
        assert_eq!(n, Vec3::Z);
    }

    #[test]
    fn test_dimension_mismatch() {
        let grid = HeightGrid::new(4);
        let err = NormalMapSynthesizer::new(1.0).synthesize(&grid, 8).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 8, actual: 4 }));
    }

    #[test]
    fn test_encode_decode() {
        assert_eq!(encode_normal(Vec3::Z), [128, 128, 255, 255]);
        assert_eq!(encode_normal(Vec3::new(-1.0, 1.0, 0.0)), [0, 255, 128, 255]);
        let d = decode_normal([128, 128, 255, 255]);
        assert!((d.length() - 1.0).abs() < 1e-3);
    }
}
