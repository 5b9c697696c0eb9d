//! Graphics device abstraction
//!
//! The resource managers never talk to a graphics API directly. Everything
//! that touches GPU state goes through [`GraphicsDevice`], which a backend
//! (OpenGL, Vulkan, or the in-memory [`HeadlessDevice`](super::HeadlessDevice))
//! implements.
//!
//! Device calls are synchronous and expected to happen on the thread that
//! owns the graphics context. Taking `&mut self` for every state-changing
//! call means concurrent binds cannot be expressed without the caller
//! providing its own serialization.

use thiserror::Error;

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Device-level failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// A shader stage failed to compile or the program failed to link
    #[error("{stage} shader compilation failed: {message}")]
    ShaderCompilation {
        /// Stage that failed
        stage: ShaderStage,
        /// Compiler log
        message: String,
    },

    /// Mesh upload with no vertices
    #[error("Cannot upload mesh without vertices")]
    EmptyGeometry,

    /// Vertex or index byte length does not match the declared counts
    #[error("Geometry size mismatch: {0}")]
    GeometryMismatch(String),

    /// Handle does not name a live program
    #[error("Unknown shader program {0:?}")]
    UnknownProgram(ProgramHandle),

    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => write!(f, "Vertex"),
            Self::Fragment => write!(f, "Fragment"),
        }
    }
}

/// Opaque handle to uploaded mesh geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Opaque handle to a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// A uniform reflected from a linked program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformInfo {
    /// Name as declared in the shader source
    pub name: String,
    /// Backend location used to set the uniform
    pub location: i32,
}

/// Geometry staged for upload
///
/// Both slices are raw bytes, usually borrowed from a
/// [`LinearAllocator`](crate::foundation::memory::LinearAllocator) block.
#[derive(Debug, Clone, Copy)]
pub struct MeshUpload<'a> {
    /// Interleaved vertex data
    pub vertices: &'a [u8],
    /// Number of vertices in `vertices`
    pub vertex_count: u32,
    /// Size of one vertex in bytes
    pub vertex_stride: u32,
    /// `u32` index data
    pub indices: &'a [u8],
    /// Number of indices in `indices`
    pub index_count: u32,
}

/// Graphics API operations the resource managers sequence
pub trait GraphicsDevice {
    /// Upload geometry and return a handle to the GPU copy
    ///
    /// # Errors
    /// Empty or inconsistent geometry, or a backend failure.
    fn upload_mesh(&mut self, upload: MeshUpload<'_>) -> DeviceResult<MeshHandle>;

    /// Free uploaded geometry
    fn destroy_mesh(&mut self, mesh: MeshHandle);

    /// Compile both stages and link them into a program
    ///
    /// # Errors
    /// [`DeviceError::ShaderCompilation`] with the failing stage.
    fn compile_program(&mut self, vertex_source: &str, fragment_source: &str) -> DeviceResult<ProgramHandle>;

    /// Reflect the active uniforms of a linked program
    ///
    /// # Errors
    /// [`DeviceError::UnknownProgram`] for a dead handle.
    fn program_uniforms(&self, program: ProgramHandle) -> DeviceResult<Vec<UniformInfo>>;

    /// Bind a program for subsequent draws
    ///
    /// # Errors
    /// [`DeviceError::UnknownProgram`] for a dead handle.
    fn use_program(&mut self, program: ProgramHandle) -> DeviceResult<()>;

    /// Free a linked program
    fn destroy_program(&mut self, program: ProgramHandle);
}
