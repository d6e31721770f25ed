//! Noise-height texture path for terrestrial-like bodies.

use crate::core::types::Result;
use crate::math::SphericalProjector;
use crate::texture::buffer::{HeightGrid, PixelBuffer, TextureBundle};
use super::classifier::SurfaceColorClassifier;
use super::noise_field::SurfaceNoiseField;
use super::normal_map::NormalMapSynthesizer;
use super::params::{ResolvedSurface, SurfaceParameters};

/// Builds color, normal and height layers from one resolved parameter set.
pub struct TerrainTextureBuilder {
    size: u32,
    noise: SurfaceNoiseField,
    classifier: SurfaceColorClassifier,
    normals: NormalMapSynthesizer,
}

impl TerrainTextureBuilder {
    /// Create a builder from already-resolved parameters.
    pub fn new(surface: &ResolvedSurface) -> Self {
        Self {
            size: surface.texture_size,
            noise: SurfaceNoiseField::new(surface.seed, surface.noise),
            classifier: SurfaceColorClassifier::new(surface.policy.clone()),
            normals: NormalMapSynthesizer::new(surface.normal_strength),
        }
    }

    /// Resolve `params` and create a builder.
    pub fn from_params(params: &SurfaceParameters) -> Result<Self> {
        Ok(Self::new(&params.resolve()?))
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Height at texture coordinate `(u, v)`.
    pub fn height_at(&self, u: f32, v: f32) -> f32 {
        self.noise.sample(SphericalProjector::project(u, v))
    }

    /// Run both passes and assemble the bundle.
    pub fn build(&self) -> Result<TextureBundle> {
        let start = std::time::Instant::now();
        let size = self.size;
        let mut color = PixelBuffer::new(size);
        let mut height = HeightGrid::new(size);

        for py in 0..size {
            for px in 0..size {
                let h = self.noise.sample(SphericalProjector::project_pixel(px, py, size));
                height.set(px, py, h);
                color.set(px, py, self.classifier.classify_rgb8(h).to_rgba());
            }
        }

        let normal = self.normals.synthesize(&height, size)?;

        log::debug!(
            "Built {}x{} terrain texture in {:.1}ms",
            size,
            size,
            start.elapsed().as_secs_f64() * 1000.0
        );

        TextureBundle::new(color, normal, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::params::{NoiseSettings, SurfaceType};

    fn small_params(seed: u32) -> SurfaceParameters {
        SurfaceParameters {
            seed,
            surface_type: SurfaceType::Rocky,
            texture_size: 32,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_dimensions() {
        let bundle = TerrainTextureBuilder::from_params(&small_params(1)).unwrap().build().unwrap();
        assert_eq!(bundle.size(), 32);
        assert_eq!(bundle.color_buffer().size(), 32);
        assert_eq!(bundle.normal_buffer().size(), 32);
        assert_eq!(bundle.height_grid().values().len(), 32 * 32);
    }

    #[test]
    fn test_build_deterministic() {
        let a = TerrainTextureBuilder::from_params(&small_params(12345)).unwrap().build().unwrap();
        let b = TerrainTextureBuilder::from_params(&small_params(12345)).unwrap().build().unwrap();
        assert_eq!(a.color_buffer(), b.color_buffer());
        assert_eq!(a.normal_buffer(), b.normal_buffer());
        assert_eq!(a.height_grid(), b.height_grid());
    }

    #[test]
    fn test_build_seam_columns_match() {
        let bundle = TerrainTextureBuilder::from_params(&small_params(77)).unwrap().build().unwrap();
        let last = bundle.size() - 1;
        assert_eq!(bundle.color_buffer().column(0), bundle.color_buffer().column(last));
        for y in 0..bundle.size() {
            assert_eq!(bundle.height_grid().get(0, y), bundle.height_grid().get(last, y));
        }
    }

    #[test]
    fn test_color_matches_height_classification() {
        let params = small_params(3);
        let resolved = params.resolve().unwrap();
        let builder = TerrainTextureBuilder::new(&resolved);
        let bundle = builder.build().unwrap();
        let classifier = SurfaceColorClassifier::new(resolved.policy.clone());
        for (x, y) in [(0, 0), (5, 9), (31, 31), (16, 20)] {
            let h = bundle.height_grid().get(x, y);
            assert_eq!(bundle.color_buffer().get(x, y), classifier.classify_rgb8(h).to_rgba());
        }
    }

    #[test]
    fn test_height_at_matches_grid() {
        let params = SurfaceParameters {
            noise: NoiseSettings { octaves: 2, ..Default::default() },
            ..small_params(9)
        };
        let builder = TerrainTextureBuilder::from_params(&params).unwrap();
        let bundle = builder.build().unwrap();
        let (u, v) = SphericalProjector::pixel_uv(7, 11, 32);
        assert_eq!(builder.height_at(u, v), bundle.height_grid().get(7, 11));
    }
}
