//! Mesh representation for 3D models
//!
//! [`MeshData`] is CPU-side geometry as parsed from a model file. [`Mesh`] is
//! what a [`MeshManager`](super::managers::MeshManager) keeps once the data
//! has been uploaded: the device handle plus the metadata draw code needs.

use std::path::Path;

use crate::assets::{self, AssetError, ObjLoader};
use crate::foundation::memory::LinearAllocator;
use crate::render::device::{DeviceError, GraphicsDevice, MeshHandle, MeshUpload};

/// 3D vertex data structure for rendering
///
/// Uploaded interleaved as eight `f32`s: position, normal, texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Number of `f32` components per vertex
    pub const COMPONENTS: usize = 8;

    /// Size of one uploaded vertex in bytes
    pub const STRIDE: usize = Self::COMPONENTS * std::mem::size_of::<f32>();

    /// Flatten into upload order
    pub fn to_array(&self) -> [f32; Self::COMPONENTS] {
        let [px, py, pz] = self.position;
        let [nx, ny, nz] = self.normal;
        let [u, v] = self.tex_coord;
        [px, py, pz, nx, ny, nz, u, v]
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: [f32; 3],
    /// Maximum corner
    pub max: [f32; 3],
}

impl Aabb {
    /// Smallest box containing every point, `None` for no points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self { min: first, max: first }, |mut aabb, point| {
            for axis in 0..3 {
                aabb.min[axis] = aabb.min[axis].min(point[axis]);
                aabb.max[axis] = aabb.max[axis].max(point[axis]);
            }
            aabb
        }))
    }

    /// Extent along each axis
    pub fn size(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// CPU-side mesh geometry
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Triangle indices into `vertices`
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create mesh data from vertices and indices
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Bounding box over all vertex positions
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|vertex| &vertex.position))
    }
}

/// Uploaded mesh owned by the mesh manager
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    handle: MeshHandle,
    vertex_count: u32,
    index_count: u32,
    bounds: Aabb,
}

impl Mesh {
    /// Device handle
    pub const fn handle(&self) -> MeshHandle {
        self.handle
    }

    /// Number of uploaded vertices
    pub const fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Number of uploaded indices
    pub const fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Model-space bounding box
    pub const fn bounds(&self) -> Aabb {
        self.bounds
    }
}

/// Parse a model file and upload it
///
/// The file text and the staged vertex/index bytes are all carved out of
/// `allocator`; nothing borrowed from it survives the call.
///
/// # Errors
/// I/O, parse, arena exhaustion or device upload failures.
pub fn create_mesh(
    allocator: &mut LinearAllocator,
    model_path: &Path,
    device: &mut dyn GraphicsDevice,
) -> Result<Mesh, AssetError> {
    let text_block = assets::read_into_arena(allocator, model_path)?;
    let data = ObjLoader::parse_str(assets::arena_text(allocator, text_block, model_path)?).map_err(|source| {
        AssetError::Obj {
            path: model_path.to_path_buf(),
            source,
        }
    })?;

    let vertex_block = allocator.allocate(data.vertices.len() * Vertex::STRIDE, std::mem::align_of::<f32>())?;
    for (chunk, vertex) in allocator
        .bytes_mut(vertex_block)?
        .chunks_exact_mut(Vertex::STRIDE)
        .zip(&data.vertices)
    {
        chunk.copy_from_slice(bytemuck::cast_slice(vertex.to_array().as_slice()));
    }
    let index_block = allocator.allocate_copy(bytemuck::cast_slice(data.indices.as_slice()), std::mem::align_of::<u32>())?;

    let vertex_count = count_u32(data.vertices.len())?;
    let index_count = count_u32(data.indices.len())?;
    let bounds = data.bounds().unwrap_or(Aabb {
        min: [0.0; 3],
        max: [0.0; 3],
    });

    let handle = device.upload_mesh(MeshUpload {
        vertices: allocator.bytes(vertex_block)?,
        vertex_count,
        vertex_stride: Vertex::STRIDE as u32,
        indices: allocator.bytes(index_block)?,
        index_count,
    })?;

    Ok(Mesh {
        handle,
        vertex_count,
        index_count,
        bounds,
    })
}

fn count_u32(count: usize) -> Result<u32, AssetError> {
    u32::try_from(count)
        .map_err(|_| AssetError::Device(DeviceError::GeometryMismatch(format!("{count} elements exceed the u32 range"))))
}
