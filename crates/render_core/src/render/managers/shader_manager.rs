//! Shader manager
//!
//! Owns one linked [`ShaderProgram`] per [`ShaderType`] and is the only
//! place that binds programs. Binding changes global device state, so
//! [`ShaderManager::use_program`] takes the device by `&mut`; callers that
//! share a device across threads must serialize access themselves.

use super::{GpuResource, ResourceError, ResourceKey, ResourceManager};
use crate::assets::AssetError;
use crate::config::ResourceConfig;
use crate::foundation::memory::LinearAllocator;
use crate::render::device::GraphicsDevice;
use crate::render::shader::{self, ShaderProgram};

/// Shader programs the client ships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderType {
    /// Flat colored geometry
    BaseShader,
    /// Base shader variant with a tint uniform
    BaseShader2,
    /// Geometry transformed by model and view matrices
    ModelViewShader,
}

/// Number of [`ShaderType`] keys
pub const COUNT_SHADER_TYPES: usize = 3;

/// Vertex and fragment source per key, in ordinal order
static SHADER_PATHS: [[&str; 2]; COUNT_SHADER_TYPES] = [
    ["shaders/base.vert", "shaders/base.frag"],
    ["shaders/base2.vert", "shaders/base2.frag"],
    ["shaders/model_view.vert", "shaders/model_view.frag"],
];

const _: () = assert!(ShaderType::ALL.len() == COUNT_SHADER_TYPES);

impl ResourceKey for ShaderType {
    const COUNT: usize = COUNT_SHADER_TYPES;
    const ALL: &'static [Self] = &[Self::BaseShader, Self::BaseShader2, Self::ModelViewShader];

    fn ordinal(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Self::BaseShader => "BaseShader",
            Self::BaseShader2 => "BaseShader2",
            Self::ModelViewShader => "ModelViewShader",
        }
    }

    fn asset_paths(self) -> &'static [&'static str] {
        &SHADER_PATHS[self as usize]
    }
}

impl GpuResource for ShaderProgram {
    type Key = ShaderType;
    const MANAGER: &'static str = "ShaderManager";

    fn arena_bytes(config: &ResourceConfig) -> usize {
        config.shader_arena_bytes
    }

    fn create(
        key: ShaderType,
        config: &ResourceConfig,
        allocator: &mut LinearAllocator,
        device: &mut dyn GraphicsDevice,
    ) -> Result<Self, AssetError> {
        let [vertex, fragment] = SHADER_PATHS[key.ordinal()];
        shader::create_shader(allocator, &config.resolve(vertex), &config.resolve(fragment), device)
    }

    fn destroy(self, device: &mut dyn GraphicsDevice) {
        device.destroy_program(self.handle());
    }
}

/// Owns every [`ShaderType`]'s program
pub type ShaderManager = ResourceManager<ShaderProgram, COUNT_SHADER_TYPES>;

impl ShaderManager {
    /// Bind `key`'s program on `device` and return it
    ///
    /// # Errors
    /// [`ResourceError::NotInitialized`] before initialization, or
    /// [`ResourceError::Device`] if the program is not live on `device`.
    pub fn use_program(
        &self,
        key: ShaderType,
        device: &mut dyn GraphicsDevice,
    ) -> Result<&ShaderProgram, ResourceError> {
        let program = self.get(key)?;
        device.use_program(program.handle())?;
        log::trace!("Bound {}", key.name());
        Ok(program)
    }
}
