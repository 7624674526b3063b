//! Trigon offline renderer
//!
//! Headless counterpart to the viewer: renders a scene straight to PNG
//! without opening a window. `frames > 1` renders a turntable, orbiting
//! the camera one full revolution around its target.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use trigon::model::Model;
use trigon::pipeline::{render_model_threaded, Framebuffer};
use trigon::scene::{load_scene, Scene, ShadingMode};
use trigon::shader::{NormalShader, PhongShader, UnlitShader};
use trigon::texture::Texture;
use trigon::VERSION;

const DEFAULT_SCENE: &str = "assets/scenes/cube.ron";

fn worker_count(scene: &Scene) -> usize {
    scene.threads.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    })
}

fn render_frame(
    fb: &mut Framebuffer,
    model: &Model,
    texture: Option<&Texture>,
    scene: &Scene,
    threads: usize,
) {
    let aspect = fb.width as f32 / fb.height as f32;
    let view_proj = scene.camera.view_projection(aspect);
    fb.clear(scene.background_color());
    match scene.shading {
        ShadingMode::Unlit => match texture {
            Some(tex) => {
                render_model_threaded(fb, model, &UnlitShader::with_texture(view_proj, tex), threads)
            }
            None => render_model_threaded(
                fb,
                model,
                &UnlitShader::new(view_proj, trigon::math::Vec3::new(210.0, 210.0, 210.0)),
                threads,
            ),
        },
        ShadingMode::Normals => render_model_threaded(fb, model, &NormalShader::new(view_proj), threads),
        ShadingMode::Phong => {
            let mut shader = PhongShader::new(view_proj, scene.camera.eye, scene.light_dir)
                .with_ambient(scene.ambient);
            if let Some(tex) = texture {
                shader = shader.with_texture(tex);
            }
            render_model_threaded(fb, model, &shader, threads);
        }
    }
}

/// Output path for one frame: the scene's path as-is for a single
/// frame, numbered `stem_0000.ext` files for a turntable.
fn frame_path(output: &Path, frame: usize, frames: usize) -> PathBuf {
    if frames <= 1 {
        return output.to_path_buf();
    }
    let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
    let ext = output.extension().and_then(|s| s.to_str()).unwrap_or("png");
    output.with_file_name(format!("{}_{:04}.{}", stem, frame, ext))
}

fn main() {
    let scene_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SCENE.to_string());
    let mut scene = match load_scene(&scene_path) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Failed to load scene {}: {}", scene_path, e);
            std::process::exit(1);
        }
    };
    let (model, texture) = match scene.load_assets() {
        Ok(assets) => assets,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    // Same framing rule as the viewer: scenes with their own model get
    // auto-framed, so the two tools agree on what a scene looks like.
    if scene.model.is_some() {
        let (min, max) = model.bounds();
        scene.camera.frame(min, max);
    }
    let threads = worker_count(&scene);
    let frames = scene.frames.max(1);

    if let Some(parent) = scene.output.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Failed to create {}: {}", parent.display(), e);
                std::process::exit(1);
            }
        }
    }

    println!(
        "Trigon render v{} | {} | {} faces | {}x{} | {} threads | {} frame(s)",
        VERSION,
        scene_path,
        model.faces.len(),
        scene.width,
        scene.height,
        threads,
        frames
    );

    let mut fb = Framebuffer::new(scene.width, scene.height);
    let bar = ProgressBar::new(frames as u64);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let start = Instant::now();
    let step = std::f32::consts::TAU / frames as f32;
    for frame in 0..frames {
        render_frame(&mut fb, &model, texture.as_ref(), &scene, threads);
        let path = frame_path(&scene.output, frame, frames);
        if let Err(e) = fb.save_png(&path) {
            bar.abandon();
            eprintln!("Failed to write {}: {}", path.display(), e);
            std::process::exit(1);
        }
        bar.set_message(path.display().to_string());
        bar.inc(1);
        scene.camera.orbit(step, 0.0);
    }
    bar.finish_and_clear();

    println!(
        "Rendered {} frame(s) to {} in {:.2}s",
        frames,
        scene.output.display(),
        start.elapsed().as_secs_f32()
    );
}
