//! # Render Core
//!
//! Transform math and GPU resource ownership for the rendering client.
//!
//! ## Features
//!
//! - **2x2 Matrices**: row-major `Matrix2x2<T>` with alias-safe in-place operators
//! - **Linear Allocator**: bump arena used for one-shot resource initialization
//! - **Resource Managers**: enum-indexed mesh and shader tables, filled once
//! - **Headless Device**: in-memory graphics backend for tools and tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use render_core::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ResourceConfig::with_asset_root("resources");
//!     let mut device = HeadlessDevice::new();
//!
//!     let mut shaders = ShaderManager::new(config.clone());
//!     shaders.initialize(&mut device)?;
//!     shaders.use_program(ShaderType::BaseShader, &mut device)?;
//!
//!     let mut meshes = MeshManager::new(config);
//!     meshes.initialize(&mut device)?;
//!     let cube = meshes.get(MeshType::Cube)?;
//!     println!("cube has {} vertices", cube.vertex_count());
//!
//!     meshes.release(&mut device);
//!     shaders.release(&mut device);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod render;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        assets::AssetError,
        config::{Config, ConfigError, ResourceConfig},
        foundation::{
            math::{Mat2, MathError, Matrix2x2, Vec2, Vector2},
            memory::{ArenaBlock, LinearAllocator, MemoryError},
        },
        render::{
            GpuResource, GraphicsDevice, HeadlessDevice, ManagerState, Mesh, MeshManager, MeshType,
            ResourceError, ResourceKey, ShaderManager, ShaderProgram, ShaderType,
        },
    };
}
