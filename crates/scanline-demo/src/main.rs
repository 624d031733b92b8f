//! Split-screen compositor demo.
//!
//! Top screen: a wavy horizontal-scroll layer under a spinning rotozoom layer,
//! with additive orbs and a subtractive shadow. Bottom screen: a colored fill,
//! a painter-sorted 3D prism and a grayscale tint band.
//!
//! Escape quits.

use anyhow::Result;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use scanline_engine::VideoSettings;
use scanline_engine::config::{TILE_COUNT, TILE_SIZE};
use scanline_engine::coords::FixedVec2;
use scanline_engine::core::{App, AppControl, FrameCtx};
use scanline_engine::device::GpuInit;
use scanline_engine::logging::{LoggingConfig, init_logging};
use scanline_engine::paint::{PaletteBanks, TintTable};
use scanline_engine::render::gpu::{ScreenPresenter, WgpuBackend};
use scanline_engine::render::{BuiltinShaders, CompositorContext, Ink, SurfaceId, TexturedQuad};
use scanline_engine::scene::{DrawMode3D, LayerKind, ScanlineInfo, Scene3D, SceneInputs, TileLayer, Vertex3D};
use scanline_engine::window::{Runtime, RuntimeConfig};

const ORB_SIZE: u32 = 32;
const BACKDROP: usize = 0;
const SPINNER: usize = 1;

/// Scene data owned by the demo and read by the compositor each frame.
struct DemoScene {
    layers: Vec<TileLayer>,
    palette: PaletteBanks,
    line_buffer: Vec<u8>,
    tint: TintTable,
    orb: Option<SurfaceId>,
    prism: Scene3D,
}

struct Demo {
    settings: VideoSettings,
    compositor: Option<CompositorContext<WgpuBackend>>,
    presenter: ScreenPresenter,
    scene: DemoScene,
    elapsed: f32,
}

impl Demo {
    fn new(settings: VideoSettings) -> Self {
        let scene = DemoScene {
            layers: build_layers(),
            palette: build_palette(),
            line_buffer: vec![0u8; settings.pix_height as usize],
            tint: TintTable::grayscale(),
            orb: None,
            prism: Scene3D::new(DrawMode3D::SolidColor),
        };

        Self {
            settings,
            compositor: None,
            presenter: ScreenPresenter::new(),
            scene,
            elapsed: 0.0,
        }
    }

    fn ensure_compositor(&mut self, ctx: &mut FrameCtx<'_, '_>) -> bool {
        if self.compositor.is_some() {
            return true;
        }

        let backend = match WgpuBackend::new(ctx.gpu.device(), ctx.gpu.queue(), &self.settings, &BuiltinShaders) {
            Ok(backend) => backend,
            Err(e) => {
                log::error!("failed to create compositor backend: {e}");
                return false;
            }
        };

        let mut compositor = CompositorContext::new(self.settings.clone(), backend);
        compositor.populate_tiles_texture(&build_tileset());
        compositor.prepare_layer_textures(&self.scene.layers);

        match compositor.create_surface(&build_orb(), ORB_SIZE, ORB_SIZE) {
            Ok(id) => self.scene.orb = Some(id),
            Err(e) => log::warn!("orb surface not created: {e}"),
        }

        let substituted = compositor.backend().substituted_shaders();
        if !substituted.is_empty() {
            ctx.runtime
                .set_title(format!("scanline demo (fallback shaders: {})", substituted.join(", ")));
        }

        self.compositor = Some(compositor);
        true
    }
}

impl App for Demo {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if event.state == ElementState::Pressed && event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                return AppControl::Exit;
            }
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if !self.ensure_compositor(ctx) {
            return AppControl::Exit;
        }
        self.elapsed += ctx.time.dt;

        let Some(compositor) = self.compositor.as_mut() else {
            return AppControl::Exit;
        };

        compose_top(compositor, &self.scene, self.elapsed);
        compose_bottom(compositor, &mut self.scene, self.elapsed);

        // fade in over the first second
        self.presenter.set_dim(1.0, self.elapsed.min(1.0));
        let control = ctx.present(&mut self.presenter, compositor);

        if ctx.time.frame_index % 300 == 0 {
            let stats = compositor.take_stats();
            log::debug!(
                "frame {}: {} flushes, {} draws, {} resolves",
                ctx.time.frame_index,
                stats.flushes,
                stats.draws,
                stats.resolves
            );
        }
        control
    }
}

// ── screens ───────────────────────────────────────────────────────────────

fn compose_top(compositor: &mut CompositorContext<WgpuBackend>, scene: &DemoScene, t: f32) {
    let settings = compositor.settings().clone();
    compositor.set_current_screen(0);

    let wavy = wavy_scanlines(t, settings.pix_height as usize);
    compositor.draw_layer(&scene.inputs(&wavy), BACKDROP);

    let spin = rotozoom_scanlines(t, settings.pix_width, settings.pix_height);
    compositor.draw_layer(&scene.inputs(&spin), SPINNER);

    let Some(orb) = scene.orb else { return };
    let cx = settings.pix_width as f32 / 2.0;
    let cy = settings.pix_height as f32 / 2.0;
    let size = ORB_SIZE as f32;

    let shadow = TexturedQuad {
        x: cx - size + 6.0,
        y: cy + 30.0,
        width: size * 2.0,
        height: size / 2.0,
        uv: [0.0, 0.0, 1.0, 1.0],
    };
    compositor.draw_sprite(&scene.inputs(&[]), orb, &[shadow], Ink::Subtract(0.5));

    let orbs: Vec<TexturedQuad> = (0..6)
        .map(|i| {
            let a = t * 1.5 + i as f32 * std::f32::consts::TAU / 6.0;
            TexturedQuad {
                x: cx + a.cos() * 80.0 - size / 2.0,
                y: cy + a.sin() * 40.0 - size / 2.0,
                width: size,
                height: size,
                uv: [0.0, 0.0, 1.0, 1.0],
            }
        })
        .collect();
    compositor.draw_sprite(&scene.inputs(&[]), orb, &orbs, Ink::Add(0.8));
}

fn compose_bottom(compositor: &mut CompositorContext<WgpuBackend>, scene: &mut DemoScene, t: f32) {
    let settings = compositor.settings().clone();
    compositor.set_current_screen(1);

    let pulse = ((t * 2.0).sin() * 0.5 + 0.5) * 255.0;
    compositor.fill_screen(0x102040, 255, pulse as i32, 255);

    rebuild_prism(&mut scene.prism, t, settings.pix_width, settings.pix_height);
    compositor.draw_3d_scene(&scene.prism);

    compositor.draw_circle(40.0, 40.0, 24.0, 16.0, 0xFFD040, Ink::Alpha(0.75));

    let band = settings.pix_height as f32 / 4.0;
    compositor.draw_rect(0.0, band * 3.0, settings.pix_width as f32, band, 0xFFFFFF, Ink::Tint(scene.tint.clone()));
}

impl DemoScene {
    fn inputs<'a>(&'a self, scanlines: &'a [ScanlineInfo]) -> SceneInputs<'a> {
        SceneInputs {
            layers: &self.layers,
            scanlines,
            palette: &self.palette,
            line_buffer: &self.line_buffer,
        }
    }
}

fn wavy_scanlines(t: f32, lines: usize) -> Vec<ScanlineInfo> {
    (0..lines)
        .map(|y| {
            let wobble = ((y as f32 / 12.0) + t * 3.0).sin() * 6.0;
            let x = ((t * 40.0 + wobble) * 65536.0) as i32;
            ScanlineInfo::new(FixedVec2::new(x, (y as i32) << 16), FixedVec2::default())
        })
        .collect()
}

/// Per-line origin and step of a layer rotated by `t` around the screen center.
fn rotozoom_scanlines(t: f32, width: u32, height: u32) -> Vec<ScanlineInfo> {
    let angle = t * 0.6;
    let zoom = 1.0 + (t * 0.8).sin() * 0.3;
    let (sin, cos) = angle.sin_cos();
    let (dx, dy) = (cos * zoom, sin * zoom);
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let fixed = |v: f32| (v * 65536.0) as i32;

    (0..height)
        .map(|y| {
            let ry = y as f32 - cy;
            let ox = 128.0 - cx * dx - ry * dy;
            let oy = 128.0 - cx * dy + ry * dx;
            ScanlineInfo::new(
                FixedVec2::new(fixed(ox), fixed(oy)),
                FixedVec2::new(fixed(dx), fixed(dy)),
            )
        })
        .collect()
}

fn rebuild_prism(scene: &mut Scene3D, t: f32, width: u32, height: u32) {
    scene.clear();

    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let ring: Vec<(f32, f32, f32)> = (0..5)
        .map(|i| {
            let a = t + i as f32 * std::f32::consts::TAU / 5.0;
            (a.cos() * 60.0, a.sin() * 60.0, a.sin())
        })
        .collect();
    let vertex = |x: f32, y: f32, z: f32, color: u32| Vertex3D {
        x: ((cx + x) * 256.0) as i32,
        y: ((cy + y) * 256.0) as i32,
        z: (z * 1024.0) as i32,
        color,
    };

    for i in 0..ring.len() {
        let (x0, y0, z0) = ring[i];
        let (x1, y1, z1) = ring[(i + 1) % ring.len()];
        let shade = 0x40 + (i as u32 * 0x30);
        scene.add_face(&[
            vertex(x0 * 0.5, y0 * 0.5 - 30.0, z0, shade << 16),
            vertex(x1 * 0.5, y1 * 0.5 - 30.0, z1, shade << 8),
            vertex(x1, y1 + 30.0, z1, shade),
            vertex(x0, y0 + 30.0, z0, (shade << 16) | shade),
        ]);
    }
}

// ── assets ────────────────────────────────────────────────────────────────

fn build_palette() -> PaletteBanks {
    let mut palette = PaletteBanks::new();
    for i in 0..=255u8 {
        let v = i as u32;
        palette.set_rgb888(0, i, (v << 16) | ((255 - v) << 8) | (v / 2 + 64));
    }
    palette
}

/// Checker and diagonal tiles; index 0 stays transparent.
fn build_tileset() -> Vec<u8> {
    let size = TILE_SIZE as usize;
    let mut pixels = vec![0u8; TILE_COUNT as usize * size * size];
    for (t, tile) in pixels.chunks_mut(size * size).take(4).enumerate() {
        for (i, px) in tile.iter_mut().enumerate() {
            let (x, y) = (i % size, i / size);
            *px = match t {
                0 => 32 + ((x / 4 + y / 4) % 2) as u8 * 96,
                1 => if x == y || x + y == size - 1 { 240 } else { 0 },
                2 => 16 + (y * 8) as u8,
                _ => 200,
            };
        }
    }
    pixels
}

fn build_layers() -> Vec<TileLayer> {
    let mut backdrop = TileLayer::new(LayerKind::HScroll, 64, 32);
    for y in 0..32 {
        for x in 0..64 {
            backdrop.set_tile(x, y, if (x + y) % 7 == 0 { 2 } else { 0 });
        }
    }

    let mut spinner = TileLayer::new(LayerKind::Rotozoom, 16, 16);
    for y in 0..16 {
        for x in 0..16 {
            let word = if (x + y) % 2 == 0 { 1 } else { 3 | TileLayer::FLIP_X };
            spinner.set_tile(x, y, word);
        }
    }

    vec![backdrop, spinner]
}

fn build_orb() -> Vec<u8> {
    let r = ORB_SIZE as f32 / 2.0;
    (0..ORB_SIZE * ORB_SIZE)
        .map(|i| {
            let (x, y) = ((i % ORB_SIZE) as f32 + 0.5 - r, (i / ORB_SIZE) as f32 + 0.5 - r);
            let d = (x * x + y * y).sqrt() / r;
            if d >= 1.0 { 0 } else { (255.0 * (1.0 - d)) as u8 }
        })
        .collect()
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let settings = VideoSettings {
        screen_count: 2,
        ..VideoSettings::default()
    };

    let config = RuntimeConfig {
        title: "scanline demo".to_string(),
        refresh_rate: settings.refresh_rate,
        ..RuntimeConfig::default()
    };

    Runtime::run(config, GpuInit::default(), Demo::new(settings))
}
