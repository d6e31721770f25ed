//! Height to color classification.
//!
//! Every surface type resolves through [`SURFACE_TABLE`] to one
//! [`ColorPolicy`]. Adding a surface type means adding a table row.

use serde::Serialize;

use crate::core::color::{resolve_override, ColorValue, Rgb8};
use crate::math::blend::{smooth, Lerp};
use super::params::SurfaceType;

/// Height thresholds of the five multi-band stops.
pub const BAND_THRESHOLDS: [f32; 5] = [0.0, 0.3, 0.5, 0.7, 0.9];
/// Half-width of the blend band around each interior threshold.
pub const BAND_HALF_WIDTH: f32 = 0.05;

/// Per-type defaults, before caller overrides.
#[derive(Clone, Copy, Debug)]
enum PolicyDefaults {
    MultiBand([u32; 5]),
    TwoTone { low: u32, high: u32, threshold: f32, width: f32 },
}

struct SurfaceEntry {
    surface: SurfaceType,
    defaults: PolicyDefaults,
}

/// Default colors and thresholds per surface type.
const SURFACE_TABLE: &[SurfaceEntry] = &[
    SurfaceEntry {
        surface: SurfaceType::Rocky,
        defaults: PolicyDefaults::MultiBand([0x3b2f2a, 0x5a4a42, 0x7a6a5e, 0x9b8b7e, 0xc8beb4]),
    },
    SurfaceEntry {
        surface: SurfaceType::Terrestrial,
        defaults: PolicyDefaults::MultiBand([0x1a3d6e, 0xc2b280, 0x3f7f3a, 0x7d6e5a, 0xf2f5f7]),
    },
    SurfaceEntry {
        surface: SurfaceType::Barren,
        defaults: PolicyDefaults::MultiBand([0x2e2e2e, 0x4a4845, 0x6b6864, 0x8f8b86, 0xb9b5b0]),
    },
    SurfaceEntry {
        surface: SurfaceType::Desert,
        defaults: PolicyDefaults::TwoTone { low: 0xb5835a, high: 0xe3c59a, threshold: 0.5, width: 0.1 },
    },
    SurfaceEntry {
        surface: SurfaceType::Ice,
        defaults: PolicyDefaults::TwoTone { low: 0x9cc3db, high: 0xf4f9fc, threshold: 0.55, width: 0.08 },
    },
    SurfaceEntry {
        surface: SurfaceType::Lava,
        defaults: PolicyDefaults::TwoTone { low: 0xff5a1f, high: 0x1c1412, threshold: 0.45, width: 0.05 },
    },
    SurfaceEntry {
        surface: SurfaceType::Ocean,
        defaults: PolicyDefaults::TwoTone { low: 0x1d4f8c, high: 0x4f7a3a, threshold: 0.6, width: 0.05 },
    },
];

/// How heights turn into colors.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ColorPolicy {
    /// Five stops at [`BAND_THRESHOLDS`], smoothstep-blended across
    /// ±[`BAND_HALF_WIDTH`] around each interior threshold.
    MultiBand { stops: [Rgb8; 5] },
    /// One smoothstep transition of total `width` centered on `threshold`.
    TwoTone { low: Rgb8, high: Rgb8, threshold: f32, width: f32 },
    /// Constant color, used for unrecognized surface types.
    Flat { color: Rgb8 },
}

impl ColorPolicy {
    /// Resolve the policy for a surface type, applying caller overrides.
    ///
    /// Unparseable overrides fall back to the per-type default with a
    /// warning. Unknown surface types resolve to flat neutral gray.
    pub fn resolve(
        surface: SurfaceType,
        colors: &[ColorValue],
        threshold: Option<f32>,
        width: Option<f32>,
    ) -> Self {
        let Some(entry) = SURFACE_TABLE.iter().find(|e| e.surface == surface) else {
            log::warn!("Unrecognized surface type, using neutral gray");
            return ColorPolicy::Flat { color: Rgb8::NEUTRAL_GRAY };
        };

        match entry.defaults {
            PolicyDefaults::MultiBand(defaults) => {
                if colors.len() > defaults.len() {
                    log::warn!(
                        "{} color stops given for {}, ignoring all past {}",
                        colors.len(),
                        surface.as_str(),
                        defaults.len()
                    );
                }
                let stops = std::array::from_fn(|i| {
                    resolve_override(colors.get(i), Rgb8::from_packed(defaults[i]), "band stop")
                });
                ColorPolicy::MultiBand { stops }
            }
            PolicyDefaults::TwoTone { low, high, threshold: t0, width: w0 } => ColorPolicy::TwoTone {
                low: resolve_override(colors.first(), Rgb8::from_packed(low), "low"),
                high: resolve_override(colors.get(1), Rgb8::from_packed(high), "high"),
                threshold: resolve_unit(threshold, t0, "threshold"),
                width: resolve_width(width, w0),
            },
        }
    }
}

fn resolve_unit(value: Option<f32>, default: f32, what: &str) -> f32 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        Some(v) => {
            log::warn!("Invalid {} {}, using {}", what, v, default);
            default
        }
        None => default,
    }
}

fn resolve_width(value: Option<f32>, default: f32) -> f32 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        Some(v) => {
            log::warn!("Invalid blend width {}, using {}", v, default);
            default
        }
        None => default,
    }
}

/// Pure height-to-color mapping for one resolved policy.
#[derive(Clone, Debug)]
pub struct SurfaceColorClassifier {
    policy: ColorPolicy,
}

impl SurfaceColorClassifier {
    pub fn new(policy: ColorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ColorPolicy {
        &self.policy
    }

    /// Color for a height in `[0, 1]`, channels in `[0, 1]`.
    pub fn classify(&self, height: f32) -> [f32; 3] {
        match &self.policy {
            ColorPolicy::MultiBand { stops } => multi_band(stops, height),
            ColorPolicy::TwoTone { low, high, threshold, width } => {
                let t = smooth((height - threshold) / width + 0.5);
                low.to_unit().lerp(&high.to_unit(), t)
            }
            ColorPolicy::Flat { color } => color.to_unit(),
        }
    }

    /// Color for a height, quantized to 8 bits.
    #[inline]
    pub fn classify_rgb8(&self, height: f32) -> Rgb8 {
        Rgb8::from_unit(self.classify(height))
    }
}

fn multi_band(stops: &[Rgb8; 5], height: f32) -> [f32; 3] {
    for i in 1..BAND_THRESHOLDS.len() {
        let lo = BAND_THRESHOLDS[i] - BAND_HALF_WIDTH;
        let hi = BAND_THRESHOLDS[i] + BAND_HALF_WIDTH;
        if height < lo {
            return stops[i - 1].to_unit();
        }
        if height <= hi {
            let t = smooth((height - lo) / (hi - lo));
            return stops[i - 1].to_unit().lerp(&stops[i].to_unit(), t);
        }
    }
    stops[BAND_THRESHOLDS.len() - 1].to_unit()
}
