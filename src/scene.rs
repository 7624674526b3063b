//! Scene loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable scene files.
//! Every field has a default, so a scene file only spells out what it
//! changes from the stock cube setup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::math::Vec3;
use crate::model::Model;
use crate::pipeline::Color;
use crate::texture::Texture;

/// Which fragment shader the renderer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadingMode {
    Unlit,
    Normals,
    #[default]
    Phong,
}

/// Everything needed to render one image: what to draw, from where,
/// and with which shading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// OBJ file to render; the built-in cube when absent.
    #[serde(default)]
    pub model: Option<PathBuf>,
    /// Texture image; the built-in cube falls back to a checkerboard.
    #[serde(default)]
    pub texture: Option<PathBuf>,
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default)]
    pub camera: Camera,
    #[serde(default)]
    pub shading: ShadingMode,
    #[serde(default = "default_light_dir")]
    pub light_dir: Vec3,
    #[serde(default = "default_background")]
    pub background: [u8; 3],
    /// Ambient light level (0.0 = dark, 1.0 = bright)
    #[serde(default = "default_ambient")]
    pub ambient: f32,
    /// Worker thread count; autodetected when absent.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Output path for offline rendering.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Turntable frame count for offline rendering.
    #[serde(default = "default_frames")]
    pub frames: usize,
}

fn default_width() -> usize {
    800
}

fn default_height() -> usize {
    600
}

fn default_light_dir() -> Vec3 {
    Vec3::new(1.0, 1.0, 1.0)
}

fn default_background() -> [u8; 3] {
    [30, 30, 40]
}

fn default_ambient() -> f32 {
    0.3
}

fn default_output() -> PathBuf {
    PathBuf::from("render.png")
}

fn default_frames() -> usize {
    1
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            model: None,
            texture: None,
            width: default_width(),
            height: default_height(),
            camera: Camera::default(),
            shading: ShadingMode::default(),
            light_dir: default_light_dir(),
            background: default_background(),
            ambient: default_ambient(),
            threads: None,
            output: default_output(),
            frames: default_frames(),
        }
    }
}

impl Scene {
    pub fn background_color(&self) -> Color {
        Color::new(self.background[0], self.background[1], self.background[2])
    }

    /// Resolve the model and texture the scene refers to. A scene
    /// without a model gets the built-in cube, and the cube gets a
    /// checkerboard when no texture overrides it.
    pub fn load_assets(&self) -> Result<(Model, Option<Texture>), String> {
        let model = match &self.model {
            Some(path) => Model::load_obj(path)
                .map_err(|e| format!("Failed to load model {}: {}", path.display(), e))?,
            None => Model::cube(),
        };
        let texture = match &self.texture {
            Some(path) => Some(Texture::from_file(path)?),
            None if self.model.is_none() => Some(Texture::checkerboard(
                64,
                64,
                Color::new(220, 220, 220),
                Color::new(90, 90, 90),
            )),
            None => None,
        };
        Ok((model, texture))
    }
}

/// Error type for scene loading
#[derive(Debug)]
pub enum SceneError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::Parse(e)
    }
}

impl From<ron::Error> for SceneError {
    fn from(e: ron::Error) -> Self {
        SceneError::Serialize(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "IO error: {}", e),
            SceneError::Parse(e) => write!(f, "Parse error: {}", e),
            SceneError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

/// Load a scene from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_from_str(&contents)
}

/// Load a scene from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<Scene, SceneError> {
    let scene: Scene = ron::from_str(s)?;
    Ok(scene)
}

/// Save a scene to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &Scene, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(scene, config)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let scene = load_scene_from_str("(width: 320, height: 200)").unwrap();
        assert_eq!(scene.width, 320);
        assert_eq!(scene.height, 200);
        assert_eq!(scene.shading, ShadingMode::Phong);
        assert_eq!(scene.frames, 1);
        assert!(scene.model.is_none());
        assert_eq!(scene.camera.fov_y, Camera::default().fov_y);
    }

    #[test]
    fn test_partial_camera_fills_defaults() {
        let scene = load_scene_from_str("(camera: (fov_y: 45.0))").unwrap();
        assert_eq!(scene.camera.fov_y, 45.0);
        assert_eq!(scene.camera.eye, Camera::default().eye);
    }

    #[test]
    fn test_empty_file_is_default_scene() {
        let scene = load_scene_from_str("()").unwrap();
        assert_eq!(scene.width, 800);
        assert_eq!(scene.height, 600);
        assert_eq!(scene.output, PathBuf::from("render.png"));
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let mut scene = Scene::default();
        scene.width = 1280;
        scene.shading = ShadingMode::Normals;
        scene.camera.fov_y = 45.0;
        scene.output = PathBuf::from("out/frame.png");

        let config = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .indentor("  ".to_string());
        let text = ron::ser::to_string_pretty(&scene, config).unwrap();
        let parsed = load_scene_from_str(&text).unwrap();

        assert_eq!(parsed.width, 1280);
        assert_eq!(parsed.shading, ShadingMode::Normals);
        assert_eq!(parsed.camera.fov_y, 45.0);
        assert_eq!(parsed.output, PathBuf::from("out/frame.png"));
    }

    #[test]
    fn test_default_assets_are_cube_and_checkerboard() {
        let (model, texture) = Scene::default().load_assets().unwrap();
        assert_eq!(model.faces.len(), 12);
        assert!(texture.is_some());
    }

    #[test]
    fn test_bad_ron_reports_parse_error() {
        let err = load_scene_from_str("(width: )").unwrap_err();
        assert!(matches!(err, SceneError::Parse(_)));
    }
}
