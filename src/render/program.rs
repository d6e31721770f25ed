//! Per-texel shading programs run by the rendering context.

use crate::core::types::Vec2;

/// Output of one texel evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    /// Linear color, channels in `[0, 1]`.
    pub color: [f32; 3],
    /// Relief in `[0, 1]`, used to derive normals.
    pub height: f32,
}

impl Fragment {
    pub fn new(color: [f32; 3], height: f32) -> Self {
        Self { color, height }
    }
}

/// A procedural color field evaluated once per texel.
///
/// `uv` is edge-inclusive: the first and last columns receive `u = 0` and
/// `u = 1`. Programs must be pure functions of `uv` and their own state.
pub trait FragmentProgram {
    /// Short name for logging.
    fn label(&self) -> &str;

    fn shade(&self, uv: Vec2) -> Fragment;
}
