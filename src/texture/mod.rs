//! Texture buffers, the bundle cache and the factory that fills it

pub mod buffer;
pub mod cache;
pub mod factory;

pub use buffer::{HeightGrid, PixelBuffer, TextureBundle};
pub use cache::{CacheStats, TextureCache};
pub use factory::TextureFactory;
