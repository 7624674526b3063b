//! Homogeneous-space triangle clipping against the view frustum
//!
//! Clipping happens before perspective division, against planes
//! expressed relative to w, so attribute interpolation on the clipped
//! geometry stays valid. The minimal-w plane runs first and guarantees
//! every surviving vertex has w >= MIN_W, which keeps the later 1/w
//! math finite.

use std::mem;

use crate::math::{Vec2, Vec3, Vec4};

/// Smallest w a clipped vertex may keep.
pub const MIN_W: f32 = 1e-5;

/// One vertex of the polygon being clipped: clip-space position plus
/// the attributes that must survive interpolation alongside it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipVertex {
    pub clip: Vec4,
    pub world: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl ClipVertex {
    fn lerp(&self, other: &ClipVertex, t: f32) -> ClipVertex {
        ClipVertex {
            clip: self.clip.lerp(other.clip, t),
            world: self.world.lerp(other.world, t),
            normal: self.normal.lerp(other.normal, t),
            uv: self.uv.lerp(other.uv, t),
        }
    }
}

/// The seven half-spaces, in required processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipPlane {
    MinW,
    Right,
    Left,
    Top,
    Bottom,
    Near,
    Far,
}

impl ClipPlane {
    pub const ALL: [ClipPlane; 7] = [
        ClipPlane::MinW,
        ClipPlane::Right,
        ClipPlane::Left,
        ClipPlane::Top,
        ClipPlane::Bottom,
        ClipPlane::Near,
        ClipPlane::Far,
    ];

    /// Signed distance to the plane; a vertex is inside iff >= 0.
    /// The intersection ratio t = d1 / (d1 - d2) then reproduces the
    /// closed-form per-plane ratios, e.g. for the right plane
    /// (w1 - x1) / ((w1 - x1) - (w2 - x2)).
    pub fn signed_distance(self, v: Vec4) -> f32 {
        match self {
            ClipPlane::MinW => v.w - MIN_W,
            ClipPlane::Right => v.w - v.x,
            ClipPlane::Left => v.w + v.x,
            ClipPlane::Top => v.w - v.y,
            ClipPlane::Bottom => v.w + v.y,
            ClipPlane::Near => v.w - v.z,
            ClipPlane::Far => v.w + v.z,
        }
    }
}

/// Maximum vertices a triangle can expand to: one extra per plane pass.
pub const MAX_CLIP_VERTS: usize = 3 + ClipPlane::ALL.len();

/// Fixed-capacity vertex list; clipping never allocates.
pub struct Polygon {
    verts: [ClipVertex; MAX_CLIP_VERTS],
    len: usize,
}

impl Polygon {
    fn new() -> Self {
        Self {
            verts: [ClipVertex::default(); MAX_CLIP_VERTS],
            len: 0,
        }
    }

    fn clear(&mut self) {
        self.len = 0;
    }

    fn push(&mut self, v: ClipVertex) {
        debug_assert!(self.len < MAX_CLIP_VERTS);
        self.verts[self.len] = v;
        self.len += 1;
    }

    fn set_triangle(&mut self, tri: [ClipVertex; 3]) {
        self.verts[..3].copy_from_slice(&tri);
        self.len = 3;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len < 3
    }

    pub fn as_slice(&self) -> &[ClipVertex] {
        &self.verts[..self.len]
    }
}

/// Sutherland-Hodgman pass for one plane: walk the input polygon's
/// edges, keep inside vertices, insert the crossing vertex on edges
/// that change sides. Emitting the current vertex (not the next) keeps
/// a fully-inside polygon in its original vertex order.
fn clip_against_plane(plane: ClipPlane, input: &Polygon, output: &mut Polygon) {
    output.clear();
    for i in 0..input.len {
        let current = &input.verts[i];
        let next = &input.verts[(i + 1) % input.len];
        let d1 = plane.signed_distance(current.clip);
        let d2 = plane.signed_distance(next.clip);
        if d1 >= 0.0 {
            output.push(*current);
            if d2 < 0.0 {
                output.push(current.lerp(next, d1 / (d1 - d2)));
            }
        } else if d2 >= 0.0 {
            output.push(current.lerp(next, d1 / (d1 - d2)));
        }
    }
}

/// Reusable ping-pong buffers for the seven plane passes. One scratch
/// per rendering thread; contents are fully overwritten per triangle.
pub struct ClipScratch {
    front: Polygon,
    back: Polygon,
}

impl ClipScratch {
    pub fn new() -> Self {
        Self {
            front: Polygon::new(),
            back: Polygon::new(),
        }
    }

    /// Clip one triangle against all seven planes. The returned polygon
    /// has 0 to 9 vertices; fewer than 3 means fully clipped away.
    pub fn clip_triangle(&mut self, tri: [ClipVertex; 3]) -> &Polygon {
        self.front.set_triangle(tri);
        for plane in ClipPlane::ALL {
            if self.front.is_empty() {
                break;
            }
            clip_against_plane(plane, &self.front, &mut self.back);
            mem::swap(&mut self.front, &mut self.back);
        }
        &self.front
    }
}

impl Default for ClipScratch {
    fn default() -> Self {
        Self::new()
    }
}
