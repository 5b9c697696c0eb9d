//! Mesh manager
//!
//! Owns one uploaded [`Mesh`] per [`MeshType`].

use super::{GpuResource, ResourceKey, ResourceManager};
use crate::assets::AssetError;
use crate::config::ResourceConfig;
use crate::foundation::memory::LinearAllocator;
use crate::render::device::GraphicsDevice;
use crate::render::mesh::{self, Mesh};

/// Meshes the client ships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshType {
    /// Unit cube
    Cube,
}

/// Number of [`MeshType`] keys
pub const COUNT_MESH_TYPES: usize = 1;

static MESH_PATHS: [&str; COUNT_MESH_TYPES] = ["models/cube.obj"];

const _: () = assert!(MeshType::ALL.len() == COUNT_MESH_TYPES);

impl ResourceKey for MeshType {
    const COUNT: usize = COUNT_MESH_TYPES;
    const ALL: &'static [Self] = &[Self::Cube];

    fn ordinal(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Self::Cube => "Cube",
        }
    }

    fn asset_paths(self) -> &'static [&'static str] {
        std::slice::from_ref(&MESH_PATHS[self as usize])
    }
}

impl GpuResource for Mesh {
    type Key = MeshType;
    const MANAGER: &'static str = "MeshManager";

    fn arena_bytes(config: &ResourceConfig) -> usize {
        config.mesh_arena_bytes
    }

    fn create(
        key: MeshType,
        config: &ResourceConfig,
        allocator: &mut LinearAllocator,
        device: &mut dyn GraphicsDevice,
    ) -> Result<Self, AssetError> {
        mesh::create_mesh(allocator, &config.resolve(MESH_PATHS[key.ordinal()]), device)
    }

    fn destroy(self, device: &mut dyn GraphicsDevice) {
        device.destroy_mesh(self.handle());
    }
}

/// Owns every [`MeshType`]'s mesh
pub type MeshManager = ResourceManager<Mesh, COUNT_MESH_TYPES>;
