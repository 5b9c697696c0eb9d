//! OBJ file loader for 3D models
//!
//! Parses the subset of Wavefront OBJ the client ships: `v`, `vn`, `vt` and
//! polygonal `f` records. Polygons are fan-triangulated. Everything else
//! (groups, materials, smoothing) is ignored.

use crate::render::mesh::{MeshData, Vertex};
use thiserror::Error;

/// OBJ parse failures
#[derive(Error, Debug)]
pub enum ObjError {
    /// A record could not be parsed
    #[error("Parse error on line {line}: {message}")]
    ParseError {
        /// 1-based line number
        line: usize,
        /// What was wrong with the record
        message: String,
    },
    /// The file parsed but does not describe usable geometry
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];
const DEFAULT_TEX_COORD: [f32; 2] = [0.0, 0.0];

/// Wavefront OBJ parser
pub struct ObjLoader;

impl ObjLoader {
    /// Parse OBJ text into CPU geometry
    ///
    /// # Errors
    /// [`ObjError::ParseError`] for a malformed record and
    /// [`ObjError::InvalidFormat`] for out-of-range indices or no geometry.
    pub fn parse_str(source: &str) -> Result<MeshData, ObjError> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut tex_coords: Vec<[f32; 2]> = Vec::new();
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for (line_index, line) in source.lines().enumerate() {
            let line_number = line_index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(keyword) = parts.next() else {
                continue;
            };
            let args: Vec<&str> = parts.collect();

            match keyword {
                "v" => positions.push(parse_floats(&args, "vertex", line_number)?),
                "vn" => normals.push(parse_floats(&args, "normal", line_number)?),
                "vt" => tex_coords.push(parse_floats(&args, "tex coord", line_number)?),
                "f" => {
                    if args.len() < 3 {
                        return Err(ObjError::ParseError {
                            line: line_number,
                            message: format!("face needs at least 3 vertices, found {}", args.len()),
                        });
                    }

                    let first = u32::try_from(vertices.len())
                        .map_err(|_| ObjError::InvalidFormat("Too many vertices".to_string()))?;
                    for corner in &args {
                        let vertex = resolve_corner(corner, &positions, &tex_coords, &normals, line_number)?;
                        vertices.push(vertex);
                    }

                    // Fan triangulation around the first corner.
                    let corners = args.len() as u32;
                    for i in 1..corners - 1 {
                        indices.extend_from_slice(&[first, first + i, first + i + 1]);
                    }
                }
                _ => {
                    // Ignore other commands
                }
            }
        }

        if vertices.is_empty() {
            return Err(ObjError::InvalidFormat("No vertices found in OBJ file".to_string()));
        }

        Ok(MeshData::new(vertices, indices))
    }
}

fn parse_floats<const N: usize>(args: &[&str], what: &str, line: usize) -> Result<[f32; N], ObjError> {
    if args.len() < N {
        return Err(ObjError::ParseError {
            line,
            message: format!("{what} needs {N} components, found {}", args.len()),
        });
    }

    let mut out = [0.0; N];
    for (slot, text) in out.iter_mut().zip(args) {
        *slot = text.parse().map_err(|_| ObjError::ParseError {
            line,
            message: format!("invalid {what} component `{text}`"),
        })?;
    }
    Ok(out)
}

/// Parse a 1-based OBJ index and look it up
fn lookup<'a, T>(text: &str, items: &'a [T], what: &str, line: usize) -> Result<&'a T, ObjError> {
    let index: usize = text.parse().map_err(|_| ObjError::ParseError {
        line,
        message: format!("invalid {what} index `{text}`"),
    })?;
    index
        .checked_sub(1)
        .and_then(|zero_based| items.get(zero_based))
        .ok_or_else(|| ObjError::InvalidFormat(format!("{what} index {index} out of bounds on line {line}")))
}

/// Resolve a `p`, `p/t`, `p//n` or `p/t/n` face corner into a vertex
fn resolve_corner(
    corner: &str,
    positions: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
    normals: &[[f32; 3]],
    line: usize,
) -> Result<Vertex, ObjError> {
    let mut fields = corner.split('/');
    let position = *lookup(fields.next().unwrap_or_default(), positions, "position", line)?;

    let tex_coord = match fields.next() {
        Some(text) if !text.is_empty() => *lookup(text, tex_coords, "tex coord", line)?,
        _ => DEFAULT_TEX_COORD,
    };
    let normal = match fields.next() {
        Some(text) if !text.is_empty() => *lookup(text, normals, "normal", line)?,
        _ => DEFAULT_NORMAL,
    };

    Ok(Vertex {
        position,
        normal,
        tex_coord,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_is_fan_triangulated() {
        let mesh = ObjLoader::parse_str(QUAD).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertices[2].tex_coord, [1.0, 1.0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_position_only_faces_use_defaults() {
        let mesh = ObjLoader::parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[1].normal, DEFAULT_NORMAL);
        assert_eq!(mesh.vertices[1].tex_coord, DEFAULT_TEX_COORD);
    }

    #[test]
    fn test_normal_without_tex_coord() {
        let mesh = ObjLoader::parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 1 0 0\nf 1//1 2//1 3//1\n").unwrap();
        assert_eq!(mesh.vertices[0].normal, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[0].tex_coord, DEFAULT_TEX_COORD);
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        assert!(matches!(
            ObjLoader::parse_str("v 0 zero 0\n"),
            Err(ObjError::ParseError { line: 1, .. })
        ));
        assert!(matches!(
            ObjLoader::parse_str("v 0 0 0\nf 1 2 3\n"),
            Err(ObjError::InvalidFormat(_))
        ));
        assert!(matches!(
            ObjLoader::parse_str("v 0 0 0\nf 0 1 1\n"),
            Err(ObjError::InvalidFormat(_))
        ));
        assert!(matches!(
            ObjLoader::parse_str("# nothing here\n"),
            Err(ObjError::InvalidFormat(_))
        ));
    }
}
