//! Celestial body categories and their parametric surface programs.
//!
//! Terrestrial-like bodies go through the noise-height path in
//! [`crate::terrain`]. Gas giants, stars and rocks are procedural color
//! fields rendered through the pooled [`crate::render::RenderContext`].

pub mod gas_giant;
pub mod star;
pub mod rock;

pub use gas_giant::{GasGiantClass, GasGiantParameters, ResolvedGasGiant};
pub use star::{ResolvedStar, StarParameters};
pub use rock::{ResolvedRock, RockParameters};

use serde::{Deserialize, Serialize};

use crate::core::types::Result;
use crate::render::FragmentProgram;
use crate::terrain::params::SurfaceParameters;

/// Celestial categories, one cache each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyCategory {
    Terrestrial,
    GasGiant,
    Star,
    Rock,
}

impl BodyCategory {
    pub const ALL: [BodyCategory; 4] = [
        BodyCategory::Terrestrial,
        BodyCategory::GasGiant,
        BodyCategory::Star,
        BodyCategory::Rock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyCategory::Terrestrial => "terrestrial",
            BodyCategory::GasGiant => "gas_giant",
            BodyCategory::Star => "star",
            BodyCategory::Rock => "rock",
        }
    }
}

/// Parameters for any body, tagged by category.
///
/// ```json
/// { "category": "gas_giant", "seed": 3, "class": 2 }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum BodyParameters {
    Terrestrial(SurfaceParameters),
    GasGiant(GasGiantParameters),
    Star(StarParameters),
    Rock(RockParameters),
}

impl BodyParameters {
    pub fn category(&self) -> BodyCategory {
        match self {
            BodyParameters::Terrestrial(_) => BodyCategory::Terrestrial,
            BodyParameters::GasGiant(_) => BodyCategory::GasGiant,
            BodyParameters::Star(_) => BodyCategory::Star,
            BodyParameters::Rock(_) => BodyCategory::Rock,
        }
    }

    pub fn seed(&self) -> u32 {
        match self {
            BodyParameters::Terrestrial(p) => p.seed,
            BodyParameters::GasGiant(p) => p.seed,
            BodyParameters::Star(p) => p.seed,
            BodyParameters::Rock(p) => p.seed,
        }
    }
}

/// A resolved parametric body that can be rendered and cached.
pub trait ParametricSurface: Serialize {
    const CATEGORY: BodyCategory;

    fn texture_size(&self) -> u32;

    fn normal_strength(&self) -> f32;

    /// Build the shading program for this body.
    fn program(&self) -> Box<dyn FragmentProgram>;

    /// Stable key for the texture cache.
    fn cache_key(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Three-stop gradient over `t` in `[0, 1]`.
pub(crate) fn ramp3(stops: &[[f32; 3]; 3], t: f32) -> [f32; 3] {
    use crate::math::blend::Lerp;
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        stops[0].lerp(&stops[1], t * 2.0)
    } else {
        stops[1].lerp(&stops[2], (t - 0.5) * 2.0)
    }
}

/// Scale every channel, clamping into `[0, 1]`.
pub(crate) fn scale_color(c: [f32; 3], k: f32) -> [f32; 3] {
    [
        (c[0] * k).clamp(0.0, 1.0),
        (c[1] * k).clamp(0.0, 1.0),
        (c[2] * k).clamp(0.0, 1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_parameters_tagged_json() {
        let body: BodyParameters =
            serde_json::from_str(r#"{"category": "gas_giant", "seed": 3, "class": 2}"#).unwrap();
        assert_eq!(body.category(), BodyCategory::GasGiant);
        assert_eq!(body.seed(), 3);

        let body: BodyParameters =
            serde_json::from_str(r#"{"category": "terrestrial", "surface_type": "ice"}"#).unwrap();
        assert_eq!(body.category(), BodyCategory::Terrestrial);
        assert_eq!(body.seed(), SurfaceParameters::default().seed);
    }

    #[test]
    fn test_ramp3_endpoints() {
        let stops = [[0.0, 0.0, 0.0], [0.5, 0.5, 0.5], [1.0, 1.0, 1.0]];
        assert_eq!(ramp3(&stops, 0.0), stops[0]);
        assert_eq!(ramp3(&stops, 0.5), stops[1]);
        assert_eq!(ramp3(&stops, 1.0), stops[2]);
        assert_eq!(ramp3(&stops, 4.0), stops[2]);
    }
}
