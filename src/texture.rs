//! Texture loading and sampling

use std::path::Path;

use crate::math::Vec3;
use crate::pipeline::Color;

/// Simple texture (array of colors)
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
}

impl Texture {
    /// Load a texture image (PNG, JPEG or BMP).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        use image::GenericImageView;

        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;

        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();
        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
        })
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels }
    }

    /// Nearest-neighbor sample with repeat wrapping, returned on the
    /// 0-255 scale shaders work in. UV origin is bottom-left, so v is
    /// flipped against the top-down pixel rows.
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        let tx = ((u.rem_euclid(1.0) * self.width as f32) as usize).min(self.width - 1);
        let ty = ((v.rem_euclid(1.0) * self.height as f32) as usize).min(self.height - 1);
        self.pixels[(self.height - 1 - ty) * self.width + tx].to_vec3()
    }
}
