//! Rock and asteroid surfaces with smoothstep craters.

use serde::{Deserialize, Serialize};

use crate::core::color::{resolve_override, ColorValue, Rgb8};
use crate::core::types::{Result, Vec2, Vec3};
use crate::math::blend::{smoothstep, Lerp};
use crate::math::SphericalProjector;
use crate::render::{Fragment, FragmentProgram};
use crate::terrain::noise_field::SurfaceNoiseField;
use crate::terrain::params::{validate_texture_size, NoiseSettings};
use super::gas_giant::finite_or;
use super::{scale_color, BodyCategory, ParametricSurface};

const DEFAULT_BASE: Rgb8 = Rgb8::from_packed(0x6b625a);
const DEFAULT_HIGHLIGHT: Rgb8 = Rgb8::from_packed(0xa59c90);
const DEFAULT_CRATER: Rgb8 = Rgb8::from_packed(0x3a3531);

/// Parameters for a rock or asteroid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RockParameters {
    pub seed: u32,
    /// Optional base, highlight and crater overrides.
    pub colors: Vec<ColorValue>,
    pub noise: NoiseSettings,
    /// Frequency of the crater field relative to the base noise.
    pub crater_scale: f32,
    /// Crater field value where crater floors begin.
    pub crater_threshold: f32,
    /// Width of the crater rim transition.
    pub crater_width: f32,
    /// How far crater floors are lowered, in height units.
    pub crater_depth: f32,
    pub normal_strength: f32,
    pub texture_size: u32,
}

impl Default for RockParameters {
    fn default() -> Self {
        Self {
            seed: 12345,
            colors: Vec::new(),
            noise: NoiseSettings { octaves: 5, scale: 2.0, ..Default::default() },
            crater_scale: 6.0,
            crater_threshold: 0.7,
            crater_width: 0.05,
            crater_depth: 0.35,
            normal_strength: 2.0,
            texture_size: 512,
        }
    }
}

impl RockParameters {
    pub fn resolve(&self) -> Result<ResolvedRock> {
        let texture_size = validate_texture_size(self.texture_size)?;
        let defaults = [DEFAULT_BASE, DEFAULT_HIGHLIGHT, DEFAULT_CRATER];
        let palette = std::array::from_fn(|i| resolve_override(self.colors.get(i), defaults[i], "rock"));

        let crater_scale = if self.crater_scale.is_finite() && self.crater_scale > 0.0 {
            self.crater_scale
        } else {
            log::warn!("Invalid crater scale {}, using 6", self.crater_scale);
            6.0
        };

        Ok(ResolvedRock {
            seed: self.seed,
            palette,
            noise: self.noise.resolved(),
            crater_scale,
            crater_threshold: finite_or(self.crater_threshold, 0.7).clamp(0.0, 1.0),
            crater_width: finite_or(self.crater_width, 0.05).max(0.0),
            crater_depth: finite_or(self.crater_depth, 0.35).clamp(0.0, 1.0),
            normal_strength: finite_or(self.normal_strength, 1.0),
            texture_size,
        })
    }
}

/// Resolved rock parameters. Serializes to the cache key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedRock {
    pub seed: u32,
    /// Base, highlight and crater colors.
    pub palette: [Rgb8; 3],
    pub noise: NoiseSettings,
    pub crater_scale: f32,
    pub crater_threshold: f32,
    pub crater_width: f32,
    pub crater_depth: f32,
    pub normal_strength: f32,
    pub texture_size: u32,
}

impl ParametricSurface for ResolvedRock {
    const CATEGORY: BodyCategory = BodyCategory::Rock;

    fn texture_size(&self) -> u32 {
        self.texture_size
    }

    fn normal_strength(&self) -> f32 {
        self.normal_strength
    }

    fn program(&self) -> Box<dyn FragmentProgram> {
        Box::new(RockCraters::new(self))
    }
}

/// Fractal rock with a thresholded crater field.
pub struct RockCraters {
    base: SurfaceNoiseField,
    craters: SurfaceNoiseField,
    palette: [[f32; 3]; 3],
    threshold: f32,
    width: f32,
    depth: f32,
}

impl RockCraters {
    pub fn new(params: &ResolvedRock) -> Self {
        let crater_settings = NoiseSettings {
            octaves: 2,
            scale: params.noise.scale * params.crater_scale,
            ..params.noise
        };
        Self {
            base: SurfaceNoiseField::new(params.seed, params.noise),
            craters: SurfaceNoiseField::new(params.seed.wrapping_add(7919), crater_settings),
            palette: params.palette.map(Rgb8::to_unit),
            threshold: params.crater_threshold,
            width: params.crater_width,
            depth: params.crater_depth,
        }
    }

    /// Crater weight in `[0, 1]`; 1 on crater floors.
    pub fn crater_mask(&self, uv: Vec2) -> f32 {
        self.crater_at(SphericalProjector::project(uv.x, uv.y))
    }

    fn crater_at(&self, p: Vec3) -> f32 {
        let c = self.craters.sample(p);
        smoothstep(self.threshold - self.width, self.threshold + self.width, c)
    }
}

impl FragmentProgram for RockCraters {
    fn label(&self) -> &str {
        "rock_craters"
    }

    fn shade(&self, uv: Vec2) -> Fragment {
        let p = SphericalProjector::project(uv.x, uv.y);
        let h = self.base.sample(p);
        let crater = self.crater_at(p);

        let rock = self.palette[0].lerp(&self.palette[1], h);
        let color = scale_color(rock.lerp(&self.palette[2], crater), 1.0 - 0.3 * crater);
        let height = (h * (1.0 - self.depth * crater)).clamp(0.0, 1.0);
        Fragment::new(color, height)
    }
}
