//! Gas giant banding.
//!
//! Bands follow latitude. Their edges are pushed around by noise that
//! varies slowly with longitude and quickly with latitude, so the field
//! reads as horizontal streaks. The palette is picked by a discrete
//! atmospheric class.

use serde::{Deserialize, Serialize};

use crate::core::color::{resolve_override, ColorValue, Rgb8};
use crate::core::types::{Result, Vec2, Vec3};
use crate::math::SphericalProjector;
use crate::render::{Fragment, FragmentProgram};
use crate::terrain::noise_field::SurfaceNoiseField;
use crate::terrain::params::{validate_texture_size, NoiseSettings};
use super::{ramp3, scale_color, BodyCategory, ParametricSurface};

/// Sudarsky-style atmospheric class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GasGiantClass {
    /// Class I, ammonia clouds
    Ammonia,
    /// Class II, water clouds
    Water,
    /// Class III, cloudless
    Cloudless,
    /// Class IV, alkali metals
    Alkali,
    /// Class V, silicate clouds
    Silicate,
}

impl GasGiantClass {
    /// Map a class number `1..=5`. Out-of-range values are clamped.
    pub fn from_number(n: u8) -> Self {
        if !(1..=5).contains(&n) {
            log::warn!("Gas giant class {} out of range, clamping to 1..=5", n);
        }
        match n.clamp(1, 5) {
            1 => GasGiantClass::Ammonia,
            2 => GasGiantClass::Water,
            3 => GasGiantClass::Cloudless,
            4 => GasGiantClass::Alkali,
            _ => GasGiantClass::Silicate,
        }
    }

    /// Default light, mid and dark band colors.
    pub fn palette(&self) -> [Rgb8; 3] {
        let packed = match self {
            GasGiantClass::Ammonia => [0xe3d1b4, 0xc08a55, 0x7a4a2a],
            GasGiantClass::Water => [0xf4f2ea, 0xcfd9e0, 0x98aec4],
            GasGiantClass::Cloudless => [0x8cbbe6, 0x4a8fd0, 0x1f4c8f],
            GasGiantClass::Alkali => [0x6c7a88, 0x434f5d, 0x20262f],
            GasGiantClass::Silicate => [0xb9a46a, 0x7b8440, 0xc2562a],
        };
        packed.map(Rgb8::from_packed)
    }
}

/// Parameters for a gas giant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasGiantParameters {
    pub seed: u32,
    /// Atmospheric class, 1 to 5.
    pub class: u8,
    /// Number of light/dark band pairs from pole to pole.
    pub band_count: f32,
    /// How far noise displaces band edges.
    pub turbulence: f32,
    /// Optional light, mid and dark overrides.
    pub colors: Vec<ColorValue>,
    pub normal_strength: f32,
    pub texture_size: u32,
}

impl Default for GasGiantParameters {
    fn default() -> Self {
        Self {
            seed: 12345,
            class: 1,
            band_count: 7.0,
            turbulence: 0.35,
            colors: Vec::new(),
            normal_strength: 0.0,
            texture_size: 512,
        }
    }
}

impl GasGiantParameters {
    pub fn resolve(&self) -> Result<ResolvedGasGiant> {
        let texture_size = validate_texture_size(self.texture_size)?;
        let class = GasGiantClass::from_number(self.class);
        let defaults = class.palette();
        let palette = std::array::from_fn(|i| resolve_override(self.colors.get(i), defaults[i], "band"));

        let band_count = if self.band_count.is_finite() && self.band_count > 0.0 {
            self.band_count
        } else {
            log::warn!("Invalid band count {}, using 7", self.band_count);
            7.0
        };

        Ok(ResolvedGasGiant {
            seed: self.seed,
            class,
            palette,
            band_count,
            turbulence: finite_or(self.turbulence, 0.35).max(0.0),
            normal_strength: finite_or(self.normal_strength, 0.0),
            texture_size,
        })
    }
}

pub(crate) fn finite_or(v: f32, default: f32) -> f32 {
    if v.is_finite() { v } else { default }
}

/// Resolved gas giant parameters. Serializes to the cache key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedGasGiant {
    pub seed: u32,
    pub class: GasGiantClass,
    pub palette: [Rgb8; 3],
    pub band_count: f32,
    pub turbulence: f32,
    pub normal_strength: f32,
    pub texture_size: u32,
}

impl ParametricSurface for ResolvedGasGiant {
    const CATEGORY: BodyCategory = BodyCategory::GasGiant;

    fn texture_size(&self) -> u32 {
        self.texture_size
    }

    fn normal_strength(&self) -> f32 {
        self.normal_strength
    }

    fn program(&self) -> Box<dyn FragmentProgram> {
        Box::new(GasGiantBands::new(self))
    }
}

/// Banded color field.
pub struct GasGiantBands {
    streaks: SurfaceNoiseField,
    detail: SurfaceNoiseField,
    palette: [[f32; 3]; 3],
    band_count: f32,
    turbulence: f32,
}

impl GasGiantBands {
    pub fn new(params: &ResolvedGasGiant) -> Self {
        let streak_settings = NoiseSettings { octaves: 4, ..Default::default() };
        let detail_settings = NoiseSettings { octaves: 3, scale: 4.0, ..Default::default() };
        Self {
            streaks: SurfaceNoiseField::new(params.seed, streak_settings),
            detail: SurfaceNoiseField::new(params.seed.wrapping_add(1), detail_settings),
            palette: params.palette.map(Rgb8::to_unit),
            band_count: params.band_count,
            turbulence: params.turbulence,
        }
    }

    /// Band intensity in `[0, 1]` at a point on the unit sphere.
    pub fn band_at(&self, p: Vec3) -> f32 {
        let stretched = Vec3::new(p.x * 1.5, p.y * self.band_count * 0.75, p.z * 1.5);
        let n = self.streaks.sample(stretched) * 2.0 - 1.0;
        let phase = (p.y * self.band_count + n * self.turbulence) * std::f32::consts::PI;
        0.5 + 0.5 * phase.sin()
    }
}

impl FragmentProgram for GasGiantBands {
    fn label(&self) -> &str {
        "gas_giant_bands"
    }

    fn shade(&self, uv: Vec2) -> Fragment {
        let p = SphericalProjector::project(uv.x, uv.y);
        let band = self.band_at(p);
        let detail = self.detail.sample(Vec3::new(p.x, p.y * self.band_count * 0.5, p.z));
        let color = scale_color(ramp3(&self.palette, band), 0.9 + 0.2 * detail);
        Fragment::new(color, band)
    }
}
