//! Noise-driven surface textures for terrestrial-like bodies.

pub mod params;
pub mod noise_field;
pub mod classifier;
pub mod normal_map;
pub mod builder;

pub use params::{NoiseSettings, ResolvedSurface, SurfaceParameters, SurfaceType};
pub use noise_field::SurfaceNoiseField;
pub use classifier::{ColorPolicy, SurfaceColorClassifier};
pub use normal_map::{decode_normal, encode_normal, NormalMapSynthesizer};
pub use builder::TerrainTextureBuilder;
