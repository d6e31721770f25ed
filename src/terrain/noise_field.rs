//! Seeded fractal noise evaluated on the unit sphere.

use noise::{NoiseFn, Perlin};

use crate::core::types::Vec3;
use super::params::NoiseSettings;

/// Multi-octave Perlin sum normalized into `[0, 1]`.
///
/// The sum is divided by the total amplitude, giving a theoretical
/// `[-1, 1]` range, then remapped and clamped. Heights are not rescaled
/// by the measured range of each texture, so the same seed and settings
/// always give the same heights.
pub struct SurfaceNoiseField {
    perlin: Perlin,
    settings: NoiseSettings,
}

impl SurfaceNoiseField {
    /// Create a field. `settings` should already be resolved.
    pub fn new(seed: u32, settings: NoiseSettings) -> Self {
        Self {
            perlin: Perlin::new(seed),
            settings,
        }
    }

    pub fn settings(&self) -> &NoiseSettings {
        &self.settings
    }

    /// Fractal sum at `point`, before normalization.
    ///
    /// Returns the raw total and the summed amplitude.
    pub fn fractal_sum(&self, point: Vec3) -> (f64, f64) {
        let p = [point.x as f64, point.y as f64, point.z as f64];
        let mut total = 0.0;
        let mut max_amplitude = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.settings.scale as f64;

        for _ in 0..self.settings.octaves.max(1) {
            total += self.perlin.get([p[0] * frequency, p[1] * frequency, p[2] * frequency]) * amplitude;
            max_amplitude += amplitude;
            amplitude *= self.settings.persistence as f64;
            frequency *= self.settings.lacunarity as f64;
        }

        (total, max_amplitude)
    }

    /// Height in `[0, 1]` at a point on the unit sphere.
    pub fn sample(&self, point: Vec3) -> f32 {
        let (total, max_amplitude) = self.fractal_sum(point);
        let normalized = if max_amplitude > 0.0 { total / max_amplitude } else { 0.0 };
        ((normalized * 0.5 + 0.5) as f32).clamp(0.0, 1.0)
    }
}
