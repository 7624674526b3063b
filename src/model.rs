//! Triangle-mesh models and Wavefront OBJ loading

use std::fs;
use std::path::Path;

use crate::math::{Vec2, Vec3};

/// One corner of a face: indices into the model's attribute arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexRef {
    pub position: usize,
    pub normal: usize,
    pub uv: usize,
}

/// A triangle referencing three corners.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub corners: [VertexRef; 3],
}

/// Indexed triangle mesh. Every index stored in `faces` is validated
/// against the attribute arrays when the model is built, so the
/// renderer can index without checking.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub faces: Vec<Face>,
}

/// Error type for model loading
#[derive(Debug)]
pub enum ModelError {
    Io(std::io::Error),
    Parse { line: usize, message: String },
    Index { line: usize, message: String },
}

impl From<std::io::Error> for ModelError {
    fn from(e: std::io::Error) -> Self {
        ModelError::Io(e)
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::Io(e) => write!(f, "IO error: {}", e),
            ModelError::Parse { line, message } => {
                write!(f, "parse error at line {}: {}", line, message)
            }
            ModelError::Index { line, message } => {
                write!(f, "invalid index at line {}: {}", line, message)
            }
        }
    }
}

/// A face corner as written in the file; uv/normal may be absent.
struct RawCorner {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

impl Model {
    /// Load a Wavefront OBJ file.
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Model, ModelError> {
        let contents = fs::read_to_string(path)?;
        Model::from_obj_str(&contents)
    }

    /// Parse OBJ source. Supports `v`, `vt`, `vn` and `f` with the
    /// `a`, `a/b`, `a//c` and `a/b/c` corner forms plus negative
    /// (relative) indices; polygonal faces are fanned into triangles.
    /// Corners without a normal get a flat per-face normal; corners
    /// without a UV share a zero UV. Anything else (groups, materials,
    /// smoothing) is skipped.
    pub fn from_obj_str(source: &str) -> Result<Model, ModelError> {
        let mut positions: Vec<Vec3> = Vec::new();
        let mut normals: Vec<Vec3> = Vec::new();
        let mut uvs: Vec<Vec2> = Vec::new();
        let mut raw_faces: Vec<(Vec<RawCorner>, usize)> = Vec::new();

        for (num, raw_line) in source.lines().enumerate() {
            let line = num + 1;
            let text = match raw_line.find('#') {
                Some(i) => &raw_line[..i],
                None => raw_line,
            };
            let mut parts = text.split_whitespace();
            let keyword = match parts.next() {
                Some(k) => k,
                None => continue,
            };
            match keyword {
                "v" => {
                    let x = parse_float(parts.next(), line, "v")?;
                    let y = parse_float(parts.next(), line, "v")?;
                    let z = parse_float(parts.next(), line, "v")?;
                    positions.push(Vec3::new(x, y, z));
                }
                "vn" => {
                    let x = parse_float(parts.next(), line, "vn")?;
                    let y = parse_float(parts.next(), line, "vn")?;
                    let z = parse_float(parts.next(), line, "vn")?;
                    normals.push(Vec3::new(x, y, z));
                }
                "vt" => {
                    let u = parse_float(parts.next(), line, "vt")?;
                    let v = parse_float(parts.next(), line, "vt")?;
                    uvs.push(Vec2::new(u, v));
                }
                "f" => {
                    let mut corners = Vec::new();
                    for token in parts {
                        corners.push(parse_corner(
                            token,
                            line,
                            (positions.len(), uvs.len(), normals.len()),
                        )?);
                    }
                    if corners.len() < 3 {
                        return Err(ModelError::Parse {
                            line,
                            message: format!("face needs at least 3 corners, got {}", corners.len()),
                        });
                    }
                    raw_faces.push((corners, line));
                }
                _ => {}
            }
        }

        // Fill in whatever the file left out, then fan the polygons.
        let mut zero_uv: Option<usize> = None;
        let mut faces = Vec::new();
        for (corners, _line) in raw_faces {
            let face_normal = if corners.iter().any(|c| c.normal.is_none()) {
                let a = positions[corners[0].position];
                let b = positions[corners[1].position];
                let c = positions[corners[2].position];
                normals.push((b - a).cross(c - a).normalize());
                Some(normals.len() - 1)
            } else {
                None
            };

            let mut resolved = Vec::with_capacity(corners.len());
            for corner in &corners {
                let uv = match corner.uv {
                    Some(i) => i,
                    None => *zero_uv.get_or_insert_with(|| {
                        uvs.push(Vec2::ZERO);
                        uvs.len() - 1
                    }),
                };
                let normal = match (corner.normal, face_normal) {
                    (Some(i), _) => i,
                    (None, Some(i)) => i,
                    // Unreachable: face_normal is Some whenever any
                    // corner lacks a normal.
                    (None, None) => 0,
                };
                resolved.push(VertexRef {
                    position: corner.position,
                    uv,
                    normal,
                });
            }

            for j in 1..resolved.len() - 1 {
                faces.push(Face {
                    corners: [resolved[0], resolved[j], resolved[j + 1]],
                });
            }
        }

        Ok(Model { positions, normals, uvs, faces })
    }

    /// Built-in unit cube centered on the origin, with per-face
    /// normals and UVs. Used as the demo mesh when a scene names no
    /// model file.
    pub fn cube() -> Model {
        let positions = vec![
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
        ];
        let normals = vec![
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
        ];
        let uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];

        let quads: [([usize; 4], usize); 6] = [
            ([4, 5, 6, 7], 0),
            ([1, 0, 3, 2], 1),
            ([5, 1, 2, 6], 2),
            ([0, 4, 7, 3], 3),
            ([7, 6, 2, 3], 4),
            ([0, 1, 5, 4], 5),
        ];
        let mut faces = Vec::with_capacity(12);
        for (quad, normal) in quads {
            for tri in [[0, 1, 2], [0, 2, 3]] {
                faces.push(Face {
                    corners: tri.map(|k| VertexRef {
                        position: quad[k],
                        normal,
                        uv: k,
                    }),
                });
            }
        }

        Model { positions, normals, uvs, faces }
    }

    /// Axis-aligned bounds of the positions, for camera framing.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        if self.positions.is_empty() {
            return (Vec3::ZERO, Vec3::ZERO);
        }
        let mut min = self.positions[0];
        let mut max = self.positions[0];
        for p in &self.positions[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        (min, max)
    }
}

fn parse_float(token: Option<&str>, line: usize, what: &str) -> Result<f32, ModelError> {
    let token = token.ok_or_else(|| ModelError::Parse {
        line,
        message: format!("missing {} component", what),
    })?;
    token.parse::<f32>().map_err(|_| ModelError::Parse {
        line,
        message: format!("bad {} component '{}'", what, token),
    })
}

fn parse_corner(
    token: &str,
    line: usize,
    counts: (usize, usize, usize),
) -> Result<RawCorner, ModelError> {
    let mut fields = token.split('/');
    let position = match resolve_index(fields.next(), counts.0, line)? {
        Some(i) => i,
        None => {
            return Err(ModelError::Parse {
                line,
                message: format!("corner '{}' has no position index", token),
            })
        }
    };
    let uv = resolve_index(fields.next(), counts.1, line)?;
    let normal = resolve_index(fields.next(), counts.2, line)?;
    Ok(RawCorner { position, uv, normal })
}

/// OBJ indices are 1-based; negative counts back from the current end
/// of the array. Out-of-range references are rejected here so the
/// renderer never sees them.
fn resolve_index(
    field: Option<&str>,
    count: usize,
    line: usize,
) -> Result<Option<usize>, ModelError> {
    let field = match field {
        Some(f) if !f.is_empty() => f,
        _ => return Ok(None),
    };
    let idx: i64 = field.parse().map_err(|_| ModelError::Parse {
        line,
        message: format!("bad index '{}'", field),
    })?;
    let resolved = if idx < 0 { count as i64 + idx } else { idx - 1 };
    if resolved < 0 || resolved >= count as i64 {
        return Err(ModelError::Index {
            line,
            message: format!("index {} out of range (have {})", idx, count),
        });
    }
    Ok(Some(resolved as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_corners() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
";
        let model = Model::from_obj_str(src).expect("parses");
        assert_eq!(model.positions.len(), 3);
        assert_eq!(model.faces.len(), 1);
        let c = model.faces[0].corners[1];
        assert_eq!(c.position, 1);
        assert_eq!(c.uv, 1);
        assert_eq!(c.normal, 0);
    }

    #[test]
    fn test_quad_face_fans_into_two_triangles() {
        let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";
        let model = Model::from_obj_str(src).expect("parses");
        assert_eq!(model.faces.len(), 2);
        assert_eq!(model.faces[0].corners[0].position, 0);
        assert_eq!(model.faces[1].corners[1].position, 2);
        assert_eq!(model.faces[1].corners[2].position, 3);
    }

    #[test]
    fn test_missing_normals_are_synthesized_flat() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";
        let model = Model::from_obj_str(src).expect("parses");
        let n = model.normals[model.faces[0].corners[0].normal];
        assert!((n.z - 1.0).abs() < 1e-5);
        assert!((n.len() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_negative_indices_resolve_from_end() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f -3 -2 -1
";
        let model = Model::from_obj_str(src).expect("parses");
        let refs = model.faces[0].corners.map(|c| c.position);
        assert_eq!(refs, [0, 1, 2]);
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 9
";
        let err = Model::from_obj_str(src).expect_err("rejects");
        assert!(matches!(err, ModelError::Index { line: 4, .. }));
    }

    #[test]
    fn test_bad_float_rejected_with_line() {
        let src = "v 0 oops 0\n";
        let err = Model::from_obj_str(src).expect_err("rejects");
        assert!(matches!(err, ModelError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_short_face_rejected() {
        let src = "\
v 0 0 0
v 1 0 0
f 1 2
";
        let err = Model::from_obj_str(src).expect_err("rejects");
        assert!(matches!(err, ModelError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_comments_and_unknown_keywords_skipped() {
        let src = "\
# a comment
mtllib cube.mtl
v 0 0 0
v 1 0 0
v 0 1 0
s off
f 1 2 3 # trailing comment
";
        let model = Model::from_obj_str(src).expect("parses");
        assert_eq!(model.faces.len(), 1);
    }

    #[test]
    fn test_cube_indices_in_range() {
        let model = Model::cube();
        assert_eq!(model.faces.len(), 12);
        for face in &model.faces {
            for c in face.corners {
                assert!(c.position < model.positions.len());
                assert!(c.normal < model.normals.len());
                assert!(c.uv < model.uvs.len());
            }
        }
    }

    #[test]
    fn test_cube_bounds() {
        let (min, max) = Model::cube().bounds();
        assert_eq!(min, Vec3::new(-0.5, -0.5, -0.5));
        assert_eq!(max, Vec3::new(0.5, 0.5, 0.5));
    }
}
