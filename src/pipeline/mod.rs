//! Software rendering pipeline
//!
//! Per face: vertex-shade the three corners into clip space, clip the
//! triangle against the frustum (which may grow it into a polygon),
//! fan-triangulate the result, and rasterize each fan triangle with
//! perspective-correct interpolation and a depth test.

mod clip;
mod framebuffer;
mod raster;

pub use clip::*;
pub use framebuffer::*;
pub use raster::*;

use crate::model::{Face, Model};
use crate::shader::{Shader, TrianglePatch};

/// Render every face of the model into the framebuffer.
pub fn render_model<S: Shader>(fb: &mut Framebuffer, model: &Model, shader: &S) {
    let mut scratch = ClipScratch::new();
    render_faces(fb, model, &model.faces, shader, &mut scratch);
}

/// Render with the face list partitioned across worker threads. Each
/// worker draws its slice into a private framebuffer; the results are
/// folded together by minimum depth afterwards, in worker order, so the
/// output is deterministic and identical to the serial path.
pub fn render_model_threaded<S: Shader + Sync>(
    fb: &mut Framebuffer,
    model: &Model,
    shader: &S,
    threads: usize,
) {
    let threads = threads.max(1).min(model.faces.len().max(1));
    if threads <= 1 {
        render_model(fb, model, shader);
        return;
    }

    let chunk = model.faces.len().div_ceil(threads);
    let width = fb.width;
    let height = fb.height;
    let locals = std::thread::scope(|s| {
        let handles: Vec<_> = model
            .faces
            .chunks(chunk)
            .map(|faces| {
                s.spawn(move || {
                    let mut local = Framebuffer::new(width, height);
                    let mut scratch = ClipScratch::new();
                    render_faces(&mut local, model, faces, shader, &mut scratch);
                    local
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("render worker panicked"))
            .collect::<Vec<_>>()
    });

    for local in &locals {
        fb.merge_min_depth(local);
    }
}

fn render_faces<S: Shader>(
    fb: &mut Framebuffer,
    model: &Model,
    faces: &[Face],
    shader: &S,
    scratch: &mut ClipScratch,
) {
    for face in faces {
        let corners = face.corners.map(|r| {
            let position = model.positions[r.position];
            ClipVertex {
                clip: shader.vertex(position),
                world: position,
                normal: model.normals[r.normal],
                uv: model.uvs[r.uv],
            }
        });

        let poly = scratch.clip_triangle(corners);
        let verts = poly.as_slice();
        for j in 1..verts.len().saturating_sub(1) {
            let patch = TrianglePatch {
                clip: [verts[0].clip, verts[j].clip, verts[j + 1].clip],
                world: [verts[0].world, verts[j].world, verts[j + 1].world],
                normals: [verts[0].normal, verts[j].normal, verts[j + 1].normal],
                uvs: [verts[0].uv, verts[j].uv, verts[j + 1].uv],
            };
            rasterize_patch(fb, &patch, shader);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::math::{Vec2, Vec3, Vec4};
    use crate::model::VertexRef;
    use crate::shader::{FragCoord, PhongShader};

    struct WhiteShader;

    impl Shader for WhiteShader {
        fn vertex(&self, position: Vec3) -> Vec4 {
            Vec4::from_vec3(position, 1.0)
        }
        fn fragment(&self, _patch: &TrianglePatch, _coord: FragCoord) -> Vec3 {
            Vec3::new(255.0, 255.0, 255.0)
        }
    }

    fn ndc_triangle_model(positions: [Vec3; 3]) -> Model {
        Model {
            positions: positions.to_vec(),
            normals: vec![Vec3::new(0.0, 0.0, 1.0)],
            uvs: vec![Vec2::ZERO],
            faces: vec![Face {
                corners: [
                    VertexRef { position: 0, normal: 0, uv: 0 },
                    VertexRef { position: 1, normal: 0, uv: 0 },
                    VertexRef { position: 2, normal: 0, uv: 0 },
                ],
            }],
        }
    }

    fn is_white(fb: &Framebuffer, x: usize, y: usize) -> bool {
        let idx = ((fb.height - y - 1) * fb.width + x) * 4;
        fb.pixels[idx] == 255 && fb.pixels[idx + 1] == 255 && fb.pixels[idx + 2] == 255
    }

    #[test]
    fn test_clipped_quad_renders_seamlessly() {
        // Straddles only the right plane; the clipped quad comes back
        // as two fan triangles whose union must cover the region with
        // no seam between them.
        let model = ndc_triangle_model([
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(1.5, -0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ]);
        let mut fb = Framebuffer::new(120, 120);
        fb.clear(Color::BLACK);
        render_model(&mut fb, &model, &WhiteShader);

        // Raster row 35 crosses the fan seam; the shaded run must be
        // contiguous from the left edge to the clipped right edge.
        let row: Vec<usize> = (0..120).filter(|&x| is_white(&fb, x, 35)).collect();
        assert!(!row.is_empty());
        let first = *row.first().expect("row has shaded pixels");
        let last = *row.last().expect("row has shaded pixels");
        assert_eq!(row.len(), last - first + 1, "gap in clipped quad");
        assert!(row.len() >= 85);
        // Nothing survives beyond the right frustum plane.
        for y in 0..120 {
            assert!(!is_white(&fb, 119, y));
        }
    }

    #[test]
    fn test_fully_clipped_model_renders_nothing() {
        let model = ndc_triangle_model([
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(3.0, 1.0, 0.0),
        ]);
        let mut fb = Framebuffer::new(32, 32);
        fb.clear(Color::BLACK);
        render_model(&mut fb, &model, &WhiteShader);
        assert!(fb.zbuffer.iter().all(|z| *z == f32::INFINITY));
    }

    #[test]
    fn test_render_cube_covers_pixels() {
        let model = Model::cube();
        let camera = Camera::default();
        let mut fb = Framebuffer::new(160, 120);
        fb.clear(Color::BLACK);
        let view_proj = camera.view_projection(fb.width as f32 / fb.height as f32);
        let shader = PhongShader::new(view_proj, camera.eye, Vec3::new(1.0, 1.0, 1.0));
        render_model(&mut fb, &model, &shader);

        let drawn = fb.zbuffer.iter().filter(|z| z.is_finite()).count();
        assert!(drawn > 500, "cube covered {} pixels", drawn);
    }

    #[test]
    fn test_threaded_matches_serial() {
        let model = Model::cube();
        let camera = Camera::default();
        let aspect = 1.0;
        let view_proj = camera.view_projection(aspect);
        let shader = PhongShader::new(view_proj, camera.eye, Vec3::new(1.0, 1.0, 1.0));

        let mut serial = Framebuffer::new(96, 96);
        serial.clear(Color::new(20, 20, 24));
        render_model(&mut serial, &model, &shader);

        let mut threaded = Framebuffer::new(96, 96);
        threaded.clear(Color::new(20, 20, 24));
        render_model_threaded(&mut threaded, &model, &shader, 3);

        assert_eq!(serial.pixels, threaded.pixels);
        assert_eq!(serial.zbuffer, threaded.zbuffer);
    }

    #[test]
    fn test_threaded_single_worker_falls_back() {
        let model = ndc_triangle_model([
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
        ]);
        let mut fb = Framebuffer::new(48, 48);
        fb.clear(Color::BLACK);
        render_model_threaded(&mut fb, &model, &WhiteShader, 1);
        assert!(is_white(&fb, 24, 20));
    }
}
