//! Color framebuffer and depth buffer for one rendered frame

use std::path::Path;

use crate::math::Vec3;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels as a float vector on the 0-255 scale shaders work in.
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32)
    }
}

/// Framebuffer for software rendering.
///
/// `pixels` is 4 bytes per pixel with blue in byte 0, green in byte 1,
/// red in byte 2, and rows stored bottom-up relative to raster
/// coordinates: raster pixel (x, y) lives at byte offset
/// `((height - y - 1) * width + x) * 4`. The alpha byte is written only
/// by `clear`. This layout is the external contract; `to_rgba` converts
/// to plain top-down RGBA for display and encoding.
///
/// `zbuffer` is indexed `y * width + x` in raster order and holds the
/// perspective-interpolated view distance, smaller = nearer,
/// `f32::INFINITY` = no geometry yet.
pub struct Framebuffer {
    pub pixels: Vec<u8>,
    pub zbuffer: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            zbuffer: vec![f32::INFINITY; width * height],
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        for i in 0..(self.width * self.height) {
            self.pixels[i * 4] = color.b;
            self.pixels[i * 4 + 1] = color.g;
            self.pixels[i * 4 + 2] = color.r;
            self.pixels[i * 4 + 3] = color.a;
            self.zbuffer[i] = f32::INFINITY;
        }
    }

    /// Write one pixel in raster coordinates. Channels are clamped to
    /// the 0-255 range here; the alpha byte keeps whatever `clear` set.
    pub fn set_color(&mut self, x: usize, y: usize, rgb: Vec3) {
        if x < self.width && y < self.height {
            let idx = ((self.height - y - 1) * self.width + x) * 4;
            self.pixels[idx] = rgb.z.clamp(0.0, 255.0) as u8;
            self.pixels[idx + 1] = rgb.y.clamp(0.0, 255.0) as u8;
            self.pixels[idx + 2] = rgb.x.clamp(0.0, 255.0) as u8;
        }
    }

    /// Depth at raster pixel (x, y).
    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        self.zbuffer[y * self.width + x]
    }

    /// Convert to top-down RGBA, the layout macroquad textures and the
    /// PNG encoder expect. Stored rows are already top-down for the
    /// image consumer (the bottom-up flip cancels against the raster
    /// y axis), so only the channel order changes.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.pixels.len()];
        for i in (0..self.pixels.len()).step_by(4) {
            out[i] = self.pixels[i + 2];
            out[i + 1] = self.pixels[i + 1];
            out[i + 2] = self.pixels[i];
            out[i + 3] = self.pixels[i + 3];
        }
        out
    }

    /// Encode the current frame as a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        image::save_buffer(
            path,
            &self.to_rgba(),
            self.width as u32,
            self.height as u32,
            image::ExtendedColorType::Rgba8,
        )
    }

    /// Fold another framebuffer into this one, keeping the nearer
    /// surface per pixel. Used by the threaded renderer to resolve
    /// the workers' private buffers.
    pub fn merge_min_depth(&mut self, other: &Framebuffer) {
        debug_assert_eq!(self.width, other.width);
        debug_assert_eq!(self.height, other.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let i = y * self.width + x;
                if other.zbuffer[i] < self.zbuffer[i] {
                    self.zbuffer[i] = other.zbuffer[i];
                    let p = ((self.height - y - 1) * self.width + x) * 4;
                    self.pixels[p] = other.pixels[p];
                    self.pixels[p + 1] = other.pixels[p + 1];
                    self.pixels[p + 2] = other.pixels[p + 2];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_starts_empty() {
        let fb = Framebuffer::new(4, 3);
        assert_eq!(fb.pixels.len(), 4 * 3 * 4);
        assert_eq!(fb.zbuffer.len(), 4 * 3);
        assert!(fb.zbuffer.iter().all(|z| *z == f32::INFINITY));
    }

    #[test]
    fn test_set_color_addressing() {
        let mut fb = Framebuffer::new(4, 3);
        fb.set_color(1, 0, Vec3::new(10.0, 20.0, 30.0));
        // Raster row 0 is stored as the last row, blue first.
        let idx = ((3 - 0 - 1) * 4 + 1) * 4;
        assert_eq!(fb.pixels[idx], 30);
        assert_eq!(fb.pixels[idx + 1], 20);
        assert_eq!(fb.pixels[idx + 2], 10);
        assert_eq!(fb.pixels[idx + 3], 0);
    }

    #[test]
    fn test_set_color_clamps_channels() {
        let mut fb = Framebuffer::new(1, 1);
        fb.set_color(0, 0, Vec3::new(300.0, -5.0, 128.0));
        assert_eq!(fb.pixels[0], 128);
        assert_eq!(fb.pixels[1], 0);
        assert_eq!(fb.pixels[2], 255);
    }

    #[test]
    fn test_clear_layout() {
        let mut fb = Framebuffer::new(2, 2);
        fb.zbuffer[0] = 1.0;
        fb.clear(Color::RED);
        for i in 0..4 {
            assert_eq!(fb.pixels[i * 4], 0);
            assert_eq!(fb.pixels[i * 4 + 1], 0);
            assert_eq!(fb.pixels[i * 4 + 2], 255);
            assert_eq!(fb.pixels[i * 4 + 3], 255);
        }
        assert_eq!(fb.zbuffer[0], f32::INFINITY);
    }

    #[test]
    fn test_to_rgba_swaps_channels() {
        let mut fb = Framebuffer::new(2, 1);
        fb.clear(Color::new(1, 2, 3));
        let rgba = fb.to_rgba();
        assert_eq!(&rgba[0..4], &[1, 2, 3, 255]);
    }

    #[test]
    fn test_merge_keeps_nearer_pixel() {
        let mut near = Framebuffer::new(2, 2);
        let mut far = Framebuffer::new(2, 2);
        near.clear(Color::BLACK);
        near.zbuffer[1] = 1.0;
        near.set_color(1, 0, Vec3::new(255.0, 0.0, 0.0));
        far.zbuffer[1] = 2.0;
        far.set_color(1, 0, Vec3::new(0.0, 0.0, 255.0));

        near.merge_min_depth(&far);
        assert_eq!(near.depth_at(1, 0), 1.0);
        let idx = ((2 - 0 - 1) * 2 + 1) * 4;
        // Red survived, blue lost.
        assert_eq!(near.pixels[idx + 2], 255);
        assert_eq!(near.pixels[idx], 0);
    }
}
