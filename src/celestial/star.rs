//! Star surfaces: granulation plus edge glow.

use serde::{Deserialize, Serialize};

use crate::core::color::{ColorValue, Rgb8};
use crate::core::types::{Result, Vec2};
use crate::math::blend::{smoothstep, Lerp};
use crate::render::{Fragment, FragmentProgram};
use crate::terrain::params::{validate_texture_size, MAX_TEXTURE_SIZE};
use super::gas_giant::finite_or;
use super::{scale_color, BodyCategory, ParametricSurface};

/// Upper bound on granule cells; finer granules than texels add nothing.
pub const MAX_GRANULE_CELLS: u32 = MAX_TEXTURE_SIZE;

/// Parameters for a star.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarParameters {
    pub seed: u32,
    /// Effective temperature in Kelvin, used when `color` is absent.
    pub temperature: f32,
    /// Explicit base color, overriding the temperature ramp.
    pub color: Option<ColorValue>,
    /// Granule cells across the texture.
    pub granule_scale: f32,
    /// Brightness added at the rim.
    pub glow_strength: f32,
    /// Normalized radius where the glow starts.
    pub glow_start: f32,
    pub normal_strength: f32,
    pub texture_size: u32,
}

impl Default for StarParameters {
    fn default() -> Self {
        Self {
            seed: 12345,
            temperature: 5778.0,
            color: None,
            granule_scale: 48.0,
            glow_strength: 0.6,
            glow_start: 0.55,
            normal_strength: 0.0,
            texture_size: 512,
        }
    }
}

impl StarParameters {
    pub fn resolve(&self) -> Result<ResolvedStar> {
        let texture_size = validate_texture_size(self.texture_size)?;
        let from_temperature = temperature_color(self.temperature);
        let base = match &self.color {
            Some(c) => c.resolve_or(from_temperature, "star"),
            None => from_temperature,
        };
        let glow = Rgb8::from_unit(base.to_unit().lerp(&[1.0, 1.0, 1.0], 0.5));

        let granule_cells = if self.granule_scale.is_finite() && self.granule_scale >= 1.0 {
            let cells = self.granule_scale.round();
            if cells > MAX_GRANULE_CELLS as f32 {
                log::warn!("Granule scale {} too large, clamping to {}", self.granule_scale, MAX_GRANULE_CELLS);
                MAX_GRANULE_CELLS
            } else {
                cells as u32
            }
        } else {
            log::warn!("Invalid granule scale {}, using 48", self.granule_scale);
            48
        };

        Ok(ResolvedStar {
            seed: self.seed,
            base,
            glow,
            granule_cells,
            glow_strength: finite_or(self.glow_strength, 0.6).max(0.0),
            glow_start: finite_or(self.glow_start, 0.55).clamp(0.0, 0.99),
            normal_strength: finite_or(self.normal_strength, 0.0),
            texture_size,
        })
    }
}

/// Approximate blackbody color for a temperature in Kelvin.
pub fn temperature_color(kelvin: f32) -> Rgb8 {
    let t = if kelvin.is_finite() { kelvin.clamp(1000.0, 40000.0) } else { 5778.0 } / 100.0;

    let r = if t <= 66.0 {
        255.0
    } else {
        329.698_73 * (t - 60.0).powf(-0.133_204_76)
    };
    let g = if t <= 66.0 {
        99.470_8 * t.ln() - 161.119_57
    } else {
        288.122_16 * (t - 60.0).powf(-0.075_514_85)
    };
    let b = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.517_73 * (t - 10.0).ln() - 305.044_8
    };

    let to_byte = |v: f32| v.clamp(0.0, 255.0).round() as u8;
    Rgb8([to_byte(r), to_byte(g), to_byte(b)])
}

/// Resolved star parameters. Serializes to the cache key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedStar {
    pub seed: u32,
    pub base: Rgb8,
    pub glow: Rgb8,
    pub granule_cells: u32,
    pub glow_strength: f32,
    pub glow_start: f32,
    pub normal_strength: f32,
    pub texture_size: u32,
}

impl ParametricSurface for ResolvedStar {
    const CATEGORY: BodyCategory = BodyCategory::Star;

    fn texture_size(&self) -> u32 {
        self.texture_size
    }

    fn normal_strength(&self) -> f32 {
        self.normal_strength
    }

    fn program(&self) -> Box<dyn FragmentProgram> {
        Box::new(StarGranulation::new(self))
    }
}

/// Granulated photosphere with a radial rim glow.
pub struct StarGranulation {
    seed: u32,
    cells: u32,
    base: [f32; 3],
    glow: [f32; 3],
    glow_strength: f32,
    glow_start: f32,
}

impl StarGranulation {
    pub fn new(params: &ResolvedStar) -> Self {
        Self {
            seed: params.seed,
            cells: params.granule_cells.clamp(1, MAX_GRANULE_CELLS),
            base: params.base.to_unit(),
            glow: params.glow.to_unit(),
            glow_strength: params.glow_strength,
            glow_start: params.glow_start,
        }
    }

    /// Integer hash producing a value in [0, 1].
    fn hash_2d(ix: i32, iy: i32, seed: u32) -> f32 {
        let mut h = (ix as u32).wrapping_mul(374761393)
            .wrapping_add((iy as u32).wrapping_mul(668265263))
            .wrapping_add(seed.wrapping_mul(1274126177));
        h = (h ^ (h >> 13)).wrapping_mul(1103515245);
        h = h ^ (h >> 16);
        (h & 0x7FFFFFFF) as f32 / 0x7FFFFFFF_u32 as f32
    }

    /// Smooth 2D value noise over `cells`×`cells` cells, wrapping in `u`.
    fn value_noise(&self, uv: Vec2, cells: u32, seed: u32) -> f32 {
        let sx = uv.x * cells as f32;
        let sy = uv.y * cells as f32;

        let ix = sx.floor() as i32;
        let iy = sy.floor() as i32;
        let fx = sx - sx.floor();
        let fy = sy - sy.floor();

        // Smoothstep for C1 continuity
        let fx = fx * fx * (3.0 - 2.0 * fx);
        let fy = fy * fy * (3.0 - 2.0 * fy);

        let wrap = |x: i32| x.rem_euclid(cells as i32);
        let h00 = Self::hash_2d(wrap(ix), iy, seed);
        let h10 = Self::hash_2d(wrap(ix + 1), iy, seed);
        let h01 = Self::hash_2d(wrap(ix), iy + 1, seed);
        let h11 = Self::hash_2d(wrap(ix + 1), iy + 1, seed);

        let a = h00 + (h10 - h00) * fx;
        let b = h01 + (h11 - h01) * fx;
        a + (b - a) * fy
    }

    /// Three-octave granulation in `[0, 1]`.
    pub fn granulation(&self, uv: Vec2) -> f32 {
        let n1 = self.value_noise(uv, self.cells, self.seed);
        let n2 = self.value_noise(uv, self.cells * 2, self.seed.wrapping_add(101));
        let n3 = self.value_noise(uv, self.cells * 4, self.seed.wrapping_add(202));
        n1 * 0.6 + n2 * 0.3 + n3 * 0.1
    }

    /// Rim glow weight from the distance to the texture center.
    pub fn edge_glow(&self, uv: Vec2) -> f32 {
        let r = ((uv - Vec2::splat(0.5)) * 2.0).length();
        smoothstep(self.glow_start, 1.0, r) * self.glow_strength
    }
}

impl FragmentProgram for StarGranulation {
    fn label(&self) -> &str {
        "star_granulation"
    }

    fn shade(&self, uv: Vec2) -> Fragment {
        let granule = self.granulation(uv);
        let surface = scale_color(self.base, 0.75 + 0.5 * granule);
        let glow = self.edge_glow(uv).min(1.0);
        Fragment::new(surface.lerp(&self.glow, glow), granule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_color_ordering() {
        let cool = temperature_color(3000.0);
        let sun = temperature_color(5778.0);
        let hot = temperature_color(20000.0);
        assert_eq!(cool.0[0], 255);
        assert!(cool.0[2] < sun.0[2]);
        assert!(hot.0[2] == 255 && hot.0[0] < 255);
        assert_eq!(temperature_color(f32::NAN), sun);
    }

    #[test]
    fn test_explicit_color_overrides_temperature() {
        let params = StarParameters {
            color: Some(ColorValue::Hex("#ff0000".into())),
            ..Default::default()
        };
        let r = params.resolve().unwrap();
        assert_eq!(r.base, Rgb8([255, 0, 0]));
        assert_eq!(r.glow, Rgb8([255, 128, 128]));
    }

    #[test]
    fn test_huge_granule_scale_is_clamped() {
        let params = StarParameters { granule_scale: 1e10, ..Default::default() };
        let r = params.resolve().unwrap();
        assert_eq!(r.granule_cells, MAX_GRANULE_CELLS);

        let star = StarGranulation::new(&r);
        for i in 0..=8 {
            let uv = Vec2::new(i as f32 / 8.0, 0.5);
            assert!((0.0..=1.0).contains(&star.granulation(uv)));
        }
        assert_eq!(
            star.granulation(Vec2::new(0.0, 0.3)),
            star.granulation(Vec2::new(1.0, 0.3))
        );
    }

    #[test]
    fn test_hash_range() {
        for i in -50..50 {
            let h = StarGranulation::hash_2d(i, i * 7, 99);
            assert!((0.0..=1.0).contains(&h));
        }
    }

    #[test]
    fn test_granulation_wraps_horizontally() {
        let star = StarGranulation::new(&StarParameters::default().resolve().unwrap());
        for j in 0..=8 {
            let v = j as f32 / 8.0;
            assert_eq!(star.granulation(Vec2::new(0.0, v)), star.granulation(Vec2::new(1.0, v)));
        }
    }

    #[test]
    fn test_edge_glow_falloff() {
        let star = StarGranulation::new(&StarParameters::default().resolve().unwrap());
        assert_eq!(star.edge_glow(Vec2::new(0.5, 0.5)), 0.0);
        let rim = star.edge_glow(Vec2::new(0.0, 0.5));
        assert!((rim - 0.6).abs() < 1e-6);
        let mid = star.edge_glow(Vec2::new(0.2, 0.5));
        assert!(mid > 0.0 && mid < rim);
    }

    #[test]
    fn test_shade_depends_on_seed() {
        let a = StarGranulation::new(&StarParameters { seed: 1, ..Default::default() }.resolve().unwrap());
        let b = StarGranulation::new(&StarParameters { seed: 2, ..Default::default() }.resolve().unwrap());
        let uv = Vec2::new(0.31, 0.47);
        assert_ne!(a.shade(uv), b.shade(uv));
    }
}
