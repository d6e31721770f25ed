//! Mathematical utilities

pub mod projection;
pub mod blend;

pub use projection::SphericalProjector;
pub use blend::{smooth, smoothstep, Lerp};
