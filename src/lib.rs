//! Trigon: a software triangle renderer
//!
//! A perspective-correct rasterizer with no GPU in the loop:
//! - Homogeneous-space clipping against the full view frustum
//! - Depth-buffered, perspective-correct triangle fill
//! - Pluggable vertex/fragment shading
//! - Wavefront OBJ models and RON scene files
//! - Optional multi-threaded rendering with identical output

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod camera;
pub mod math;
pub mod model;
pub mod pipeline;
pub mod scene;
pub mod shader;
pub mod texture;
