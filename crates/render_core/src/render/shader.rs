//! Shader programs
//!
//! A [`ShaderProgram`] is a linked vertex+fragment pair plus the uniform
//! locations reflected at link time, so draw code can look locations up by
//! name without another round trip to the device.

use std::path::Path;

use crate::assets::{self, AssetError};
use crate::foundation::memory::LinearAllocator;
use crate::render::device::{GraphicsDevice, ProgramHandle};

pub use crate::render::device::UniformInfo;

/// Linked shader program owned by the shader manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    handle: ProgramHandle,
    uniforms: Vec<UniformInfo>,
}

impl ShaderProgram {
    /// Device handle
    pub const fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Active uniforms in declaration order
    pub fn uniforms(&self) -> &[UniformInfo] {
        &self.uniforms
    }

    /// Location of a named uniform
    pub fn uniform_location(&self, name: &str) -> Option<i32> {
        self.uniforms
            .iter()
            .find(|uniform| uniform.name == name)
            .map(|uniform| uniform.location)
    }
}

/// Read both stages into the arena, compile and link them
///
/// # Errors
/// I/O, UTF-8, arena exhaustion, or compilation failures. A program that
/// linked but could not be reflected is destroyed before returning.
pub fn create_shader(
    allocator: &mut LinearAllocator,
    vertex_path: &Path,
    fragment_path: &Path,
    device: &mut dyn GraphicsDevice,
) -> Result<ShaderProgram, AssetError> {
    let vertex_block = assets::read_into_arena(allocator, vertex_path)?;
    let fragment_block = assets::read_into_arena(allocator, fragment_path)?;

    let vertex_source = assets::arena_text(allocator, vertex_block, vertex_path)?;
    let fragment_source = assets::arena_text(allocator, fragment_block, fragment_path)?;
    let handle = device.compile_program(vertex_source, fragment_source)?;

    match device.program_uniforms(handle) {
        Ok(uniforms) => Ok(ShaderProgram { handle, uniforms }),
        Err(err) => {
            device.destroy_program(handle);
            Err(err.into())
        }
    }
}
