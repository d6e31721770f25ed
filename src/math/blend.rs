//! Interpolation and easing helpers shared by the color stages.

// ---------------------------------------------------------------------------
// Lerp trait
// ---------------------------------------------------------------------------

/// Trait for types that can be linearly interpolated.
pub trait Lerp: Clone {
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for [f32; 3] {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        [
            self[0] + (other[0] - self[0]) * t,
            self[1] + (other[1] - self[1]) * t,
            self[2] + (other[2] - self[2]) * t,
        ]
    }
}

// ---------------------------------------------------------------------------
// Easing
// ---------------------------------------------------------------------------

/// Cubic ease `t·t·(3 − 2t)` with `t` clamped to `[0, 1]`.
#[inline]
pub fn smooth(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// GLSL-style smoothstep between two edges.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    smooth((x - edge0) / (edge1 - edge0))
}

/// Convert a unit-range channel to a byte.
#[inline]
pub fn unit_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_endpoints() {
        assert_eq!(smooth(0.0), 0.0);
        assert_eq!(smooth(1.0), 1.0);
        assert_eq!(smooth(0.5), 0.5);
        assert_eq!(smooth(-3.0), 0.0);
        assert_eq!(smooth(7.0), 1.0);
    }

    #[test]
    fn test_smoothstep_degenerate_edges() {
        assert_eq!(smoothstep(0.5, 0.5, 0.4), 0.0);
        assert_eq!(smoothstep(0.5, 0.5, 0.6), 1.0);
    }

    #[test]
    fn test_lerp_array() {
        let a = [0.0, 0.5, 1.0];
        let b = [1.0, 0.5, 0.0];
        assert_eq!(a.lerp(&b, 0.5), [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_unit_to_byte() {
        assert_eq!(unit_to_byte(0.0), 0);
        assert_eq!(unit_to_byte(1.0), 255);
        assert_eq!(unit_to_byte(0.5), 128);
        assert_eq!(unit_to_byte(2.0), 255);
    }
}
