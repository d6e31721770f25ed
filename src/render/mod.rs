//! Pooled rendering context and GPU interfaces

pub mod context;
pub mod program;
pub mod gpu;

pub use context::{RenderBackend, RenderContext, RenderTarget};
pub use program::{Fragment, FragmentProgram};
pub use gpu::{GpuDevice, GpuTextures};
