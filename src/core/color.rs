//! Color values accepted in parameters and their resolved 8-bit form.

use serde::{Deserialize, Serialize};

/// Resolved 8-bit sRGB color.
///
/// Serializes as `"#rrggbb"` so equivalent inputs produce identical
/// cache keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8(pub [u8; 3]);

impl Rgb8 {
    pub const NEUTRAL_GRAY: Self = Self([128, 128, 128]);

    /// Build from a packed `0xRRGGBB` value.
    pub const fn from_packed(v: u32) -> Self {
        Self([((v >> 16) & 0xFF) as u8, ((v >> 8) & 0xFF) as u8, (v & 0xFF) as u8])
    }

    /// Channels as floats in `[0, 1]`.
    #[inline]
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.0[0] as f32 / 255.0,
            self.0[1] as f32 / 255.0,
            self.0[2] as f32 / 255.0,
        ]
    }

    /// Quantize unit-range floats.
    #[inline]
    pub fn from_unit(c: [f32; 3]) -> Self {
        use crate::math::blend::unit_to_byte;
        Self([unit_to_byte(c[0]), unit_to_byte(c[1]), unit_to_byte(c[2])])
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }

    /// RGBA with full alpha.
    #[inline]
    pub fn to_rgba(self) -> [u8; 4] {
        [self.0[0], self.0[1], self.0[2], 255]
    }
}

impl Serialize for Rgb8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// A color as supplied by callers.
///
/// Accepts `"#rrggbb"`, `"rrggbb"`, `"#rgb"`, a packed `0xRRGGBB` integer,
/// or a float triple in `[0, 1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Hex(String),
    Packed(u32),
    Unit([f32; 3]),
}

impl ColorValue {
    /// Resolve to 8-bit sRGB, or `None` when the value cannot be parsed.
    pub fn resolve(&self) -> Option<Rgb8> {
        match self {
            ColorValue::Hex(s) => parse_hex(s),
            ColorValue::Packed(v) if *v <= 0xFF_FFFF => Some(Rgb8::from_packed(*v)),
            ColorValue::Packed(_) => None,
            ColorValue::Unit(c) => {
                if c.iter().all(|v| v.is_finite()) {
                    Some(Rgb8::from_unit(*c))
                } else {
                    None
                }
            }
        }
    }

    /// Resolve, falling back to `default` with a warning.
    pub fn resolve_or(&self, default: Rgb8, what: &str) -> Rgb8 {
        match self.resolve() {
            Some(c) => c,
            None => {
                log::warn!("Unparseable {} color {:?}, using {}", what, self, default.to_hex());
                default
            }
        }
    }
}

impl From<Rgb8> for ColorValue {
    fn from(c: Rgb8) -> Self {
        ColorValue::Hex(c.to_hex())
    }
}

fn parse_hex(s: &str) -> Option<Rgb8> {
    let digits = s.trim().trim_start_matches('#');
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match digits.len() {
        6 => u32::from_str_radix(digits, 16).ok().map(Rgb8::from_packed),
        3 => {
            let v = u32::from_str_radix(digits, 16).ok()?;
            let expand = |n: u32| (n * 17) as u8;
            Some(Rgb8([expand((v >> 8) & 0xF), expand((v >> 4) & 0xF), expand(v & 0xF)]))
        }
        _ => None,
    }
}

/// Resolve an optional override against a default.
pub(crate) fn resolve_override(value: Option<&ColorValue>, default: Rgb8, what: &str) -> Rgb8 {
    value.map_or(default, |v| v.resolve_or(default, what))
}
