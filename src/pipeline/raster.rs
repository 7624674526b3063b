//! Screen-space triangle rasterization with perspective correction

use crate::math::{Vec2, Vec3, Vec4};
use crate::shader::{FragCoord, Shader, TrianglePatch};
use super::framebuffer::Framebuffer;

/// Perspective division + viewport transform for one clip-space vertex.
fn to_screen(clip: Vec4, width: usize, height: usize) -> Vec2 {
    Vec2::new(
        0.5 * (width as f32 - 1.0) * (clip.x / clip.w + 1.0),
        0.5 * (height as f32 - 1.0) * (clip.y / clip.w + 1.0),
    )
}

/// Barycentric coordinates of point (px, py) in screen-space triangle
/// (a, b, c). Returns (-1, -1, -1) for a degenerate triangle so the
/// caller's inside test rejects every pixel.
fn barycentric(px: f32, py: f32, a: Vec2, b: Vec2, c: Vec2) -> Vec3 {
    let d = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
    if d.abs() < 1e-4 {
        return Vec3::new(-1.0, -1.0, -1.0);
    }
    let alpha = ((b.y - c.y) * (px - c.x) + (c.x - b.x) * (py - c.y)) / d;
    let beta = ((c.y - a.y) * (px - c.x) + (a.x - c.x) * (py - c.y)) / d;
    Vec3::new(alpha, beta, 1.0 - alpha - beta)
}

/// Rasterize one post-clip triangle. Pixels pass an exclusive inside
/// test (all three weights strictly positive), so an edge shared by two
/// triangles is shaded by at most one of them. Depth is the
/// perspective-interpolated w (positive view distance), strict
/// less-than wins.
pub fn rasterize_patch<S: Shader>(fb: &mut Framebuffer, patch: &TrianglePatch, shader: &S) {
    let screen = [
        to_screen(patch.clip[0], fb.width, fb.height),
        to_screen(patch.clip[1], fb.width, fb.height),
        to_screen(patch.clip[2], fb.width, fb.height),
    ];
    let ws = [patch.clip[0].w, patch.clip[1].w, patch.clip[2].w];

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for s in &screen {
        min_x = min_x.min(s.x);
        min_y = min_y.min(s.y);
        max_x = max_x.max(s.x);
        max_y = max_y.max(s.y);
    }

    // Clipping already confines the triangle to the viewport; the clamp
    // covers float slop right at the NDC edges.
    let x0 = (min_x.floor() as i32).max(0);
    let y0 = (min_y.floor() as i32).max(0);
    let x1 = (max_x.ceil() as i32).min(fb.width as i32 - 1);
    let y1 = (max_y.ceil() as i32).min(fb.height as i32 - 1);
    if x1 < x0 || y1 < y0 {
        return;
    }

    for y in y0..=y1 {
        for x in x0..=x1 {
            let bc = barycentric(x as f32 + 0.5, y as f32 + 0.5, screen[0], screen[1], screen[2]);
            if bc.x <= 0.0 || bc.y <= 0.0 || bc.z <= 0.0 {
                continue;
            }
            // Post-clip w >= MIN_W keeps this finite and positive.
            let corrector = 1.0 / (bc.x / ws[0] + bc.y / ws[1] + bc.z / ws[2]);
            let idx = y as usize * fb.width + x as usize;
            if corrector < fb.zbuffer[idx] {
                fb.zbuffer[idx] = corrector;
                let coord = FragCoord {
                    alpha: bc.x,
                    beta: bc.y,
                    gamma: bc.z,
                    corrector,
                };
                let rgb = shader.fragment(patch, coord);
                fb.set_color(x as usize, y as usize, rgb);
            }
        }
    }
}
