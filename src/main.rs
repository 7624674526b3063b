//! Trigon viewer: interactive software renderer
//!
//! Loads a RON scene (or the stock cube scene), renders it on the CPU
//! every frame and blits the framebuffer to the window. Left-drag
//! orbits, the scroll wheel dollies, 1/2/3 switch shading, S saves a
//! screenshot.

use macroquad::prelude::*;

use trigon::model::Model;
use trigon::pipeline::{render_model_threaded, Framebuffer};
use trigon::scene::{load_scene, Scene, ShadingMode};
use trigon::shader::{NormalShader, PhongShader, UnlitShader};
use trigon::texture::Texture;
use trigon::VERSION;

const DEFAULT_SCENE: &str = "assets/scenes/cube.ron";

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Trigon v{}", VERSION),
        window_width: 800,
        window_height: 600,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Scene thread count, or every core when the scene leaves it unset.
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

#[macroquad::main(window_conf)]
async fn main() {
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
    // Scenes that bring their own model get framed automatically; the
    // stock cube scene keeps its hand-placed camera.
    if scene.model.is_some() {
        let (min, max) = model.bounds();
        scene.camera.frame(min, max);
    }
    let threads = worker_count(&scene);
    let mut fb = Framebuffer::new(scene.width, scene.height);

    println!(
        "Trigon v{} | {} | {} faces | {}x{} | {} threads",
        VERSION,
        scene_path,
        model.faces.len(),
        scene.width,
        scene.height,
        threads
    );

    let mut last_mouse = mouse_position();
    let mut dragging = false;

    loop {
        // Left drag: orbit around the target
        let mouse_pos = mouse_position();
        if is_mouse_button_down(MouseButton::Left) {
            if dragging {
                let dx = mouse_pos.0 - last_mouse.0;
                let dy = mouse_pos.1 - last_mouse.1;
                scene.camera.orbit(dx * 0.005, dy * 0.005);
            }
            dragging = true;
        } else {
            dragging = false;
        }
        last_mouse = mouse_pos;

        // Mouse wheel: dolly toward/away from the target
        let scroll = mouse_wheel().1;
        if scroll != 0.0 {
            scene.camera.dolly(if scroll > 0.0 { 0.9 } else { 1.1 });
        }

        if is_key_pressed(KeyCode::Key1) {
            scene.shading = ShadingMode::Unlit;
            println!("Shading: Unlit");
        }
        if is_key_pressed(KeyCode::Key2) {
            scene.shading = ShadingMode::Normals;
            println!("Shading: Normals");
        }
        if is_key_pressed(KeyCode::Key3) {
            scene.shading = ShadingMode::Phong;
            println!("Shading: Phong");
        }

        render_frame(&mut fb, &model, texture.as_ref(), &scene, threads);

        if is_key_pressed(KeyCode::S) {
            match fb.save_png("screenshot.png") {
                Ok(()) => println!("Saved screenshot.png"),
                Err(e) => eprintln!("Screenshot failed: {}", e),
            }
        }

        // Blit the framebuffer, aspect-fit letterboxed
        clear_background(BLACK);
        let blit = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.to_rgba());
        blit.set_filter(FilterMode::Nearest);

        let fb_aspect = fb.width as f32 / fb.height as f32;
        let screen_aspect = screen_width() / screen_height();
        let (draw_w, draw_h, draw_x, draw_y) = if fb_aspect > screen_aspect {
            let w = screen_width();
            let h = w / fb_aspect;
            (w, h, 0.0, (screen_height() - h) * 0.5)
        } else {
            let h = screen_height();
            let w = h * fb_aspect;
            (w, h, (screen_width() - w) * 0.5, 0.0)
        };
        draw_texture_ex(
            &blit,
            draw_x,
            draw_y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(draw_w, draw_h)),
                ..Default::default()
            },
        );

        draw_text(
            &format!(
                "{:?} | {}x{} | {} threads | {} FPS",
                scene.shading,
                fb.width,
                fb.height,
                threads,
                get_fps()
            ),
            10.0,
            20.0,
            20.0,
            Color::from_rgba(180, 180, 180, 255),
        );
        draw_text(
            "drag: orbit | wheel: dolly | 1/2/3: shading | S: screenshot",
            10.0,
            40.0,
            16.0,
            Color::from_rgba(120, 120, 120, 255),
        );

        next_frame().await
    }
}
