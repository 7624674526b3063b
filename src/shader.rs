//! Programmable shading stage: vertex transform and fragment color

use crate::math::{Mat4, Vec2, Vec3, Vec4};
use crate::texture::Texture;

/// Barycentric weights and perspective corrector for one fragment.
#[derive(Debug, Clone, Copy)]
pub struct FragCoord {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
    pub corrector: f32,
}

/// Attributes of the triangle currently being rasterized, assembled by
/// the fan stage and handed to every fragment call. The accessors
/// interpolate in 1/w space and rescale by the corrector, so shader
/// bodies get perspective-correct values without redoing the math.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrianglePatch {
    pub clip: [Vec4; 3],
    pub world: [Vec3; 3],
    pub normals: [Vec3; 3],
    pub uvs: [Vec2; 3],
}

impl TrianglePatch {
    fn corrected(&self, c: FragCoord) -> [f32; 3] {
        [
            c.corrector * c.alpha / self.clip[0].w,
            c.corrector * c.beta / self.clip[1].w,
            c.corrector * c.gamma / self.clip[2].w,
        ]
    }

    /// Perspective-correct world-space position of the fragment.
    pub fn world_at(&self, c: FragCoord) -> Vec3 {
        let [a, b, g] = self.corrected(c);
        self.world[0] * a + self.world[1] * b + self.world[2] * g
    }

    /// Perspective-correct, renormalized surface normal.
    pub fn normal_at(&self, c: FragCoord) -> Vec3 {
        let [a, b, g] = self.corrected(c);
        (self.normals[0] * a + self.normals[1] * b + self.normals[2] * g).normalize()
    }

    /// Perspective-correct texture coordinate.
    pub fn uv_at(&self, c: FragCoord) -> Vec2 {
        let [a, b, g] = self.corrected(c);
        self.uvs[0] * a + self.uvs[1] * b + self.uvs[2] * g
    }
}

/// A shading policy for one render call. Implementations are immutable;
/// per-triangle data arrives through the patch argument, which keeps
/// shaders trivially shareable across render workers.
pub trait Shader {
    /// Transform one model-space position into clip space.
    fn vertex(&self, position: Vec3) -> Vec4;

    /// Color one fragment. Channels are on a 0-255 scale and may exceed
    /// it; the rasterizer clamps on write.
    fn fragment(&self, patch: &TrianglePatch, coord: FragCoord) -> Vec3;
}

/// Flat color or raw texture, no lighting.
pub struct UnlitShader<'a> {
    pub view_proj: Mat4,
    pub base_color: Vec3,
    pub texture: Option<&'a Texture>,
}

impl<'a> UnlitShader<'a> {
    pub fn new(view_proj: Mat4, base_color: Vec3) -> Self {
        Self { view_proj, base_color, texture: None }
    }

    pub fn with_texture(view_proj: Mat4, texture: &'a Texture) -> Self {
        Self {
            view_proj,
            base_color: Vec3::new(255.0, 255.0, 255.0),
            texture: Some(texture),
        }
    }
}

impl<'a> Shader for UnlitShader<'a> {
    fn vertex(&self, position: Vec3) -> Vec4 {
        self.view_proj.transform_point(position)
    }

    fn fragment(&self, patch: &TrianglePatch, coord: FragCoord) -> Vec3 {
        match self.texture {
            Some(tex) => {
                let uv = patch.uv_at(coord);
                tex.sample(uv.x, uv.y)
            }
            None => self.base_color,
        }
    }
}

/// Visualizes interpolated normals as RGB. Handy for checking meshes.
pub struct NormalShader {
    pub view_proj: Mat4,
}

impl NormalShader {
    pub fn new(view_proj: Mat4) -> Self {
        Self { view_proj }
    }
}

impl Shader for NormalShader {
    fn vertex(&self, position: Vec3) -> Vec4 {
        self.view_proj.transform_point(position)
    }

    fn fragment(&self, patch: &TrianglePatch, coord: FragCoord) -> Vec3 {
        let n = patch.normal_at(coord);
        (n * 0.5 + Vec3::new(0.5, 0.5, 0.5)) * 255.0
    }
}

/// Ambient + diffuse + Blinn-Phong specular, optional texture.
pub struct PhongShader<'a> {
    pub view_proj: Mat4,
    pub eye: Vec3,
    /// Direction from the surface toward the light, normalized.
    pub light_dir: Vec3,
    pub base_color: Vec3,
    pub texture: Option<&'a Texture>,
    pub ambient: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl<'a> PhongShader<'a> {
    pub fn new(view_proj: Mat4, eye: Vec3, light_dir: Vec3) -> Self {
        Self {
            view_proj,
            eye,
            light_dir: light_dir.normalize(),
            base_color: Vec3::new(200.0, 200.0, 200.0),
            texture: None,
            ambient: 0.3,
            specular: 0.4,
            shininess: 32.0,
        }
    }

    pub fn with_texture(mut self, texture: &'a Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_ambient(mut self, ambient: f32) -> Self {
        self.ambient = ambient;
        self
    }
}

impl<'a> Shader for PhongShader<'a> {
    fn vertex(&self, position: Vec3) -> Vec4 {
        self.view_proj.transform_point(position)
    }

    fn fragment(&self, patch: &TrianglePatch, coord: FragCoord) -> Vec3 {
        let n = patch.normal_at(coord);
        let albedo = match self.texture {
            Some(tex) => {
                let uv = patch.uv_at(coord);
                tex.sample(uv.x, uv.y)
            }
            None => self.base_color,
        };

        let diffuse = n.dot(self.light_dir).max(0.0);
        let view_dir = (self.eye - patch.world_at(coord)).normalize();
        let half = (self.light_dir + view_dir).normalize();
        let spec = n.dot(half).max(0.0).powf(self.shininess) * self.specular;

        albedo * (self.ambient + (1.0 - self.ambient) * diffuse)
            + Vec3::new(255.0, 255.0, 255.0) * spec
    }
}
