//! Surface parameters for noise-driven bodies and their resolved form.

use serde::{Deserialize, Serialize};

use crate::core::color::ColorValue;
use crate::core::error::Error;
use crate::core::types::Result;
use super::classifier::ColorPolicy;

/// Smallest accepted texture edge.
pub const MIN_TEXTURE_SIZE: u32 = 2;
/// Largest accepted texture edge.
pub const MAX_TEXTURE_SIZE: u32 = 8192;
/// Octave counts outside this range are clamped.
pub const MAX_OCTAVES: u32 = 8;

/// Surface type tag. Unrecognized tags parse to [`SurfaceType::Unknown`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SurfaceType {
    #[default]
    Rocky,
    Terrestrial,
    Barren,
    Desert,
    Ice,
    Lava,
    Ocean,
    Unknown,
}

impl SurfaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceType::Rocky => "rocky",
            SurfaceType::Terrestrial => "terrestrial",
            SurfaceType::Barren => "barren",
            SurfaceType::Desert => "desert",
            SurfaceType::Ice => "ice",
            SurfaceType::Lava => "lava",
            SurfaceType::Ocean => "ocean",
            SurfaceType::Unknown => "unknown",
        }
    }

    /// Parse a tag, case-insensitively.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "rocky" => SurfaceType::Rocky,
            "terrestrial" => SurfaceType::Terrestrial,
            "barren" => SurfaceType::Barren,
            "desert" => SurfaceType::Desert,
            "ice" => SurfaceType::Ice,
            "lava" => SurfaceType::Lava,
            "ocean" => SurfaceType::Ocean,
            _ => SurfaceType::Unknown,
        }
    }
}

impl From<String> for SurfaceType {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<SurfaceType> for String {
    fn from(t: SurfaceType) -> Self {
        t.as_str().to_string()
    }
}

/// Fractal noise controls.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    pub octaves: u32,     // Detail levels
    pub persistence: f32, // Amplitude falloff per octave (0.5 typical)
    pub lacunarity: f32,  // Frequency growth per octave (2.0 typical)
    pub scale: f32,       // Base frequency on the unit sphere
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            scale: 1.0,
        }
    }
}

impl NoiseSettings {
    /// Clamp or replace unusable values, warning about each change.
    pub fn resolved(&self) -> Self {
        let defaults = Self::default();
        let mut out = *self;

        if !(1..=MAX_OCTAVES).contains(&out.octaves) {
            let clamped = out.octaves.clamp(1, MAX_OCTAVES);
            log::warn!("Octave count {} out of range, using {}", out.octaves, clamped);
            out.octaves = clamped;
        }
        if !out.persistence.is_finite() {
            log::warn!("Non-finite persistence, using {}", defaults.persistence);
            out.persistence = defaults.persistence;
        }
        out.persistence = out.persistence.clamp(0.0, 1.0);
        if !(out.lacunarity.is_finite() && out.lacunarity > 0.0) {
            log::warn!("Invalid lacunarity {}, using {}", out.lacunarity, defaults.lacunarity);
            out.lacunarity = defaults.lacunarity;
        }
        if !(out.scale.is_finite() && out.scale > 0.0) {
            log::warn!("Invalid noise scale {}, using {}", out.scale, defaults.scale);
            out.scale = defaults.scale;
        }
        out
    }
}

/// Parameters for one noise-driven body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceParameters {
    pub seed: u32,
    pub surface_type: SurfaceType,
    /// Color stops. Multi-band types read up to five, two-tone types read
    /// the first two as (low, high). Missing entries use type defaults.
    pub colors: Vec<ColorValue>,
    /// Two-tone transition height. For oceans this is the water ratio.
    pub threshold: Option<f32>,
    /// Two-tone blend width.
    pub blend_width: Option<f32>,
    pub noise: NoiseSettings,
    pub normal_strength: f32,
    pub texture_size: u32,
}

impl Default for SurfaceParameters {
    fn default() -> Self {
        Self {
            seed: 12345,
            surface_type: SurfaceType::Rocky,
            colors: Vec::new(),
            threshold: None,
            blend_width: None,
            noise: NoiseSettings::default(),
            normal_strength: 1.0,
            texture_size: 512,
        }
    }
}

impl SurfaceParameters {
    /// Resolve defaults and normalize colors.
    ///
    /// Fails only on an unusable texture size. Everything else degrades.
    pub fn resolve(&self) -> Result<ResolvedSurface> {
        let texture_size = validate_texture_size(self.texture_size)?;
        let normal_strength = if self.normal_strength.is_finite() {
            self.normal_strength
        } else {
            log::warn!("Non-finite normal strength, using 1.0");
            1.0
        };

        Ok(ResolvedSurface {
            seed: self.seed,
            surface_type: self.surface_type,
            policy: ColorPolicy::resolve(
                self.surface_type,
                &self.colors,
                self.threshold,
                self.blend_width,
            ),
            noise: self.noise.resolved(),
            normal_strength,
            texture_size,
        })
    }
}

/// Check a requested texture edge against the accepted range.
pub fn validate_texture_size(size: u32) -> Result<u32> {
    if (MIN_TEXTURE_SIZE..=MAX_TEXTURE_SIZE).contains(&size) {
        if !size.is_power_of_two() {
            log::debug!("Texture size {} is not a power of two", size);
        }
        Ok(size)
    } else {
        Err(Error::InvalidParameters(format!(
            "texture size {} outside {}..={}",
            size, MIN_TEXTURE_SIZE, MAX_TEXTURE_SIZE
        )))
    }
}

/// Fully-resolved surface parameters. Its serialization is the cache key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedSurface {
    pub seed: u32,
    pub surface_type: SurfaceType,
    pub policy: ColorPolicy,
    pub noise: NoiseSettings,
    pub normal_strength: f32,
    pub texture_size: u32,
}

impl ResolvedSurface {
    /// Stable key for the texture cache.
    pub fn cache_key(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_type_parse() {
        assert_eq!(SurfaceType::parse("ROCKY"), SurfaceType::Rocky);
        assert_eq!(SurfaceType::parse(" ocean "), SurfaceType::Ocean);
        assert_eq!(SurfaceType::parse("plasma"), SurfaceType::Unknown);
    }

    #[test]
    fn test_surface_type_serde() {
        let t: SurfaceType = serde_json::from_str("\"Lava\"").unwrap();
        assert_eq!(t, SurfaceType::Lava);
        let t: SurfaceType = serde_json::from_str("\"crystal\"").unwrap();
        assert_eq!(t, SurfaceType::Unknown);
        assert_eq!(serde_json::to_string(&SurfaceType::Ice).unwrap(), "\"ice\"");
    }

    #[test]
    fn test_noise_settings_resolved() {
        let n = NoiseSettings { octaves: 0, persistence: 3.0, lacunarity: -1.0, scale: f32::NAN }.resolved();
        assert_eq!(n.octaves, 1);
        assert_eq!(n.persistence, 1.0);
        assert_eq!(n.lacunarity, 2.0);
        assert_eq!(n.scale, 1.0);

        let n = NoiseSettings { octaves: 20, ..Default::default() }.resolved();
        assert_eq!(n.octaves, MAX_OCTAVES);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: SurfaceParameters =
            serde_json::from_str(r#"{"seed": 7, "surface_type": "ocean", "noise": {"octaves": 6}}"#).unwrap();
        assert_eq!(params.seed, 7);
        assert_eq!(params.surface_type, SurfaceType::Ocean);
        assert_eq!(params.noise.octaves, 6);
        assert_eq!(params.noise.lacunarity, 2.0);
        assert_eq!(params.texture_size, 512);
    }

    #[test]
    fn test_resolve_rejects_bad_size() {
        let params = SurfaceParameters { texture_size: 0, ..Default::default() };
        assert!(matches!(params.resolve(), Err(Error::InvalidParameters(_))));

        let params = SurfaceParameters { texture_size: MAX_TEXTURE_SIZE + 1, ..Default::default() };
        assert!(params.resolve().is_err());
    }

    #[test]
    fn test_cache_key_normalizes_colors() {
        let a = SurfaceParameters {
            colors: vec![ColorValue::Hex("#808080".into())],
            ..Default::default()
        };
        let b = SurfaceParameters {
            colors: vec![ColorValue::Unit([0.5, 0.5, 0.5])],
            ..Default::default()
        };
        let ka = a.resolve().unwrap().cache_key().unwrap();
        let kb = b.resolve().unwrap().cache_key().unwrap();
        assert_eq!(ka, kb);
    }

    #[test]
    fn test_cache_key_depends_on_seed() {
        let a = SurfaceParameters::default();
        let b = SurfaceParameters { seed: a.seed + 1, ..Default::default() };
        assert_ne!(
            a.resolve().unwrap().cache_key().unwrap(),
            b.resolve().unwrap().cache_key().unwrap()
        );
    }
}
