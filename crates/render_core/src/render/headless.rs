//! In-memory graphics device
//!
//! Used by the test suites and by tools that must run without a window or
//! graphics context. It validates its inputs the way a driver would at the
//! level the managers care about (empty geometry, missing entry points,
//! dead handles) and records enough state to assert on afterwards.

use std::collections::HashMap;

use super::device::{
    DeviceError, DeviceResult, GraphicsDevice, MeshHandle, MeshUpload, ProgramHandle, ShaderStage,
    UniformInfo,
};

#[derive(Debug)]
struct MeshRecord {
    vertex_count: u32,
    index_count: u32,
}

#[derive(Debug)]
struct ProgramRecord {
    uniforms: Vec<UniformInfo>,
}

/// Graphics device that keeps all "GPU" objects in host memory
#[derive(Debug)]
pub struct HeadlessDevice {
    next_id: u32,
    meshes: HashMap<u32, MeshRecord>,
    programs: HashMap<u32, ProgramRecord>,
    bound_program: Option<ProgramHandle>,
    bind_count: usize,
    bytes_uploaded: usize,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    /// Create an empty device
    pub fn new() -> Self {
        Self {
            // Zero is never a live handle.
            next_id: 1,
            meshes: HashMap::new(),
            programs: HashMap::new(),
            bound_program: None,
            bind_count: 0,
            bytes_uploaded: 0,
        }
    }

    /// Live mesh count
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Live program count
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Currently bound program
    pub const fn bound_program(&self) -> Option<ProgramHandle> {
        self.bound_program
    }

    /// Number of successful `use_program` calls
    pub const fn bind_count(&self) -> usize {
        self.bind_count
    }

    /// Total vertex and index bytes uploaded
    pub const fn bytes_uploaded(&self) -> usize {
        self.bytes_uploaded
    }

    /// Vertex and index counts of a live mesh
    pub fn mesh_counts(&self, mesh: MeshHandle) -> Option<(u32, u32)> {
        self.meshes
            .get(&mesh.0)
            .map(|record| (record.vertex_count, record.index_count))
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Check a stage has an entry point and collect its `uniform` declarations
fn compile_stage(stage: ShaderStage, source: &str, uniforms: &mut Vec<String>) -> DeviceResult<()> {
    if !source.contains("void main") {
        return Err(DeviceError::ShaderCompilation {
            stage,
            message: "missing entry point `void main`".to_string(),
        });
    }

    for line in source.lines() {
        let Some(declaration) = line.trim().strip_prefix("uniform ") else {
            continue;
        };
        let name = declaration
            .trim_end_matches(';')
            .split_whitespace()
            .last()
            .map(|name| name.split('[').next().unwrap_or(name));
        if let Some(name) = name {
            if !uniforms.iter().any(|existing| existing == name) {
                uniforms.push(name.to_string());
            }
        }
    }
    Ok(())
}

impl GraphicsDevice for HeadlessDevice {
    fn upload_mesh(&mut self, upload: MeshUpload<'_>) -> DeviceResult<MeshHandle> {
        if upload.vertex_count == 0 {
            return Err(DeviceError::EmptyGeometry);
        }
        let expected_vertex_bytes = upload.vertex_count as usize * upload.vertex_stride as usize;
        if upload.vertices.len() != expected_vertex_bytes {
            return Err(DeviceError::GeometryMismatch(format!(
                "{} vertex bytes for {} vertices of stride {}",
                upload.vertices.len(),
                upload.vertex_count,
                upload.vertex_stride
            )));
        }
        if upload.indices.len() != upload.index_count as usize * std::mem::size_of::<u32>() {
            return Err(DeviceError::GeometryMismatch(format!(
                "{} index bytes for {} indices",
                upload.indices.len(),
                upload.index_count
            )));
        }

        let id = self.allocate_id();
        self.meshes.insert(
            id,
            MeshRecord {
                vertex_count: upload.vertex_count,
                index_count: upload.index_count,
            },
        );
        self.bytes_uploaded += upload.vertices.len() + upload.indices.len();
        log::trace!("Headless upload: mesh {} ({} vertices)", id, upload.vertex_count);
        Ok(MeshHandle(id))
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) {
        self.meshes.remove(&mesh.0);
    }

    fn compile_program(&mut self, vertex_source: &str, fragment_source: &str) -> DeviceResult<ProgramHandle> {
        let mut names = Vec::new();
        compile_stage(ShaderStage::Vertex, vertex_source, &mut names)?;
        compile_stage(ShaderStage::Fragment, fragment_source, &mut names)?;

        let uniforms = names
            .into_iter()
            .zip(0..)
            .map(|(name, location)| UniformInfo { name, location })
            .collect();

        let id = self.allocate_id();
        self.programs.insert(id, ProgramRecord { uniforms });
        log::trace!("Headless link: program {}", id);
        Ok(ProgramHandle(id))
    }

    fn program_uniforms(&self, program: ProgramHandle) -> DeviceResult<Vec<UniformInfo>> {
        self.programs
            .get(&program.0)
            .map(|record| record.uniforms.clone())
            .ok_or(DeviceError::UnknownProgram(program))
    }

    fn use_program(&mut self, program: ProgramHandle) -> DeviceResult<()> {
        if !self.programs.contains_key(&program.0) {
            return Err(DeviceError::UnknownProgram(program));
        }
        self.bound_program = Some(program);
        self.bind_count += 1;
        Ok(())
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program.0);
        if self.bound_program == Some(program) {
            self.bound_program = None;
        }
    }
}
