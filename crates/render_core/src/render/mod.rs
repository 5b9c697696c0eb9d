//! Rendering resources
//!
//! The graphics API sits behind [`GraphicsDevice`]. Meshes and shader
//! programs are built by factory functions and owned by the enum-indexed
//! managers in [`managers`].

pub mod device;
pub mod headless;
pub mod managers;
pub mod mesh;
pub mod shader;

pub use device::{
    DeviceError, DeviceResult, GraphicsDevice, MeshHandle, MeshUpload, ProgramHandle, ShaderStage,
    UniformInfo,
};
pub use headless::HeadlessDevice;
pub use managers::{
    GpuResource, ManagerState, MeshManager, MeshType, ResourceError, ResourceKey, ResourceManager,
    ResourceTable, ShaderManager, ShaderType, COUNT_MESH_TYPES, COUNT_SHADER_TYPES,
};
pub use mesh::{create_mesh, Aabb, Mesh, MeshData, Vertex};
pub use shader::{create_shader, ShaderProgram};
