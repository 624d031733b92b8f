//! Draw entry points: scene data → queued render states.
//!
//! Every entry point targets the compositor's current screen. Geometry is
//! allocated first, then per-draw images are staged, so a flush triggered by
//! allocation never invalidates data the new command refers to.

use crate::config::{LAYER_COUNT, PALETTE_BANK_COUNT, PALETTE_BANK_SIZE};
use crate::coords::from_fixed;
use crate::paint::PaletteBanks;
use crate::paint::color::vertex_color;
use crate::scene::{LayerKind, Scene3D, SceneInputs};

use super::backend::{CompositeBackend, LayoutUpload, SurfaceId};
use super::context::CompositorContext;
use super::deform::{DeformInput, encode_hscroll, encode_line_banks, encode_rotozoom, encode_vscroll};
use super::ink::{Ink, Resolve};
use super::queue::RenderState;
use super::shader::{DrawShader, TileKind};
use super::vertex::{RenderVertex, ndc_quad, pixel_quad};

const RECORD_SIZE: u32 = 16;
const PALETTE_ENTRY_SIZE: u32 = 2;
const WHITE: u32 = 0xFFFF_FFFF;

/// A screen-space quad with normalised source coordinates `[u0, v0, u1, v1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TexturedQuad {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub uv: [f32; 4],
}

impl TexturedQuad {
    fn vertices(&self, color: u32) -> [RenderVertex; 4] {
        let [u0, v0, u1, v1] = self.uv;
        let (x1, y1) = (self.x + self.width, self.y + self.height);
        [
            RenderVertex::new(self.x, self.y, color, u0, v0),
            RenderVertex::new(x1, self.y, color, u1, v0),
            RenderVertex::new(self.x, y1, color, u0, v1),
            RenderVertex::new(x1, y1, color, u1, v1),
        ]
    }
}

impl<B: CompositeBackend> CompositorContext<B> {
    // ── tile layers ───────────────────────────────────────────────────────

    /// Draws a layer with the deformation its kind selects.
    pub fn draw_layer(&mut self, inputs: &SceneInputs<'_>, layer: usize) {
        let Some(kind) = inputs.layers.get(layer).map(|l| l.kind) else {
            return;
        };

        match kind {
            LayerKind::Basic => self.draw_layer_basic(inputs, layer),
            LayerKind::HScroll => self.draw_layer_hscroll(inputs, layer),
            LayerKind::VScroll => self.draw_layer_vscroll(inputs, layer),
            LayerKind::Rotozoom => self.draw_layer_rotozoom(inputs, layer),
        }
    }

    /// Static layers are horizontal-scroll layers with uniform scanlines.
    pub fn draw_layer_basic(&mut self, inputs: &SceneInputs<'_>, layer: usize) {
        self.queue_tile_layer(inputs, layer, TileKind::HScroll);
    }

    pub fn draw_layer_hscroll(&mut self, inputs: &SceneInputs<'_>, layer: usize) {
        self.queue_tile_layer(inputs, layer, TileKind::HScroll);
    }

    /// Vertical layers ignore the vertical clip: the queued command spans the
    /// full screen height.
    pub fn draw_layer_vscroll(&mut self, inputs: &SceneInputs<'_>, layer: usize) {
        if !self.queue_tile_layer(inputs, layer, TileKind::VScroll) {
            return;
        }

        let height = self.screens[self.current_screen].height;
        if let Some(last) = self.queues[self.current_screen].last_mut() {
            last.clip.y = 0;
            last.clip.height = height;
        }
    }

    pub fn draw_layer_rotozoom(&mut self, inputs: &SceneInputs<'_>, layer: usize) {
        self.queue_tile_layer(inputs, layer, TileKind::Rotozoom);
    }

    /// Returns whether a command was queued.
    fn queue_tile_layer(&mut self, inputs: &SceneInputs<'_>, layer: usize, kind: TileKind) -> bool {
        let Some(tile_layer) = inputs.layers.get(layer) else {
            return false;
        };
        if tile_layer.is_empty() {
            return false;
        }
        if layer >= LAYER_COUNT {
            log::warn!("draw_layer({layer}): only {LAYER_COUNT} layer slots");
            return false;
        }

        let wanted = self.layer_texture_desc(tile_layer);
        match self.layers[layer] {
            Some(prepared) if prepared.desc == wanted => {}
            prepared => {
                if !self.warned_layers[layer] {
                    self.warned_layers[layer] = true;
                    if prepared.is_none() {
                        log::warn!("layer {layer}: textures not prepared; draw skipped");
                    } else {
                        log::warn!("layer {layer}: prepared for a different size or kind; draw skipped");
                    }
                }
                return false;
            }
        }

        let (vertices, indices, _) = self.allocate_geometry(4, 6);

        let screen = self.screens[self.current_screen];
        let input = DeformInput {
            width: self.settings.pix_width,
            height: self.settings.pix_height,
            screen_height: screen.height,
            clip: screen.clip,
            width_shift: tile_layer.width_shift(),
            height_shift: tile_layer.height_shift(),
            scanlines: inputs.scanlines,
            line_buffer: inputs.line_buffer,
        };
        let image = match kind {
            TileKind::HScroll => encode_hscroll(&input),
            TileKind::VScroll => encode_vscroll(&input),
            TileKind::Rotozoom => encode_rotozoom(&input),
        };

        let attributes = self.staging.push_image(image.width, image.height, RECORD_SIZE, image.as_bytes());
        let palette = self.stage_palette(inputs.palette);

        let (layout_width, layout_height) = tile_layer.layout_extent();
        let version = tile_layer.version();
        if let Some(prepared) = self.layers[layer].as_mut().filter(|p| p.uploaded_version != Some(version)) {
            prepared.uploaded_version = Some(version);
            let slice = self.staging.push_image(
                layout_width,
                layout_height,
                2,
                bytemuck::cast_slice(tile_layer.layout()),
            );
            self.layouts.push(LayoutUpload {
                layer: layer as u8,
                slice,
            });
        }

        self.ring.vertices_mut(vertices).copy_from_slice(&ndc_quad());
        self.add_quads_to_buffer(indices, 1);

        let shader = DrawShader::Tile {
            layer: layer as u8,
            kind,
            attributes,
            palette,
            layer_size: [layout_width, layout_height],
        };
        self.push_state(RenderState {
            vertices,
            indices,
            ..RenderState::new(shader, Resolve::default())
        });
        true
    }

    fn stage_palette(&mut self, palette: &PaletteBanks) -> super::staging::StagingSlice {
        self.staging.push_image(
            PALETTE_BANK_SIZE as u32,
            PALETTE_BANK_COUNT as u32,
            PALETTE_ENTRY_SIZE,
            palette.as_bytes(),
        )
    }

    // ── screen fill ───────────────────────────────────────────────────────

    /// Covers the current screen with `color` (`0xRRGGBB`), blending each
    /// channel by its own intensity (`0..=255`, clamped).
    pub fn fill_screen(&mut self, color: u32, alpha_r: i32, alpha_g: i32, alpha_b: i32) {
        let screen = self.screens[self.current_screen];
        let (vertices, indices, _) = self.allocate_geometry(4, 6);

        self.ring.vertices_mut(vertices).copy_from_slice(&pixel_quad(
            0.0,
            0.0,
            screen.pitch as f32,
            screen.height as f32,
            vertex_color(color, 0xFF),
        ));
        self.add_quads_to_buffer(indices, 1);

        self.push_state(RenderState {
            vertices,
            indices,
            ..RenderState::new(DrawShader::Rect, Resolve::fill(alpha_r, alpha_g, alpha_b))
        });
    }

    // ── shapes ────────────────────────────────────────────────────────────

    pub fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: u32, ink: Ink) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let (vertices, indices, _) = self.allocate_geometry(4, 6);
        self.ring
            .vertices_mut(vertices)
            .copy_from_slice(&pixel_quad(x, y, width, height, vertex_color(color, 0xFF)));
        self.add_quads_to_buffer(indices, 1);

        self.push_state(RenderState {
            vertices,
            indices,
            ..RenderState::new(DrawShader::Rect, ink.into())
        });
    }

    /// Disc (or ring, with `inner_radius > 0`) centred on `(x, y)`.
    pub fn draw_circle(&mut self, x: f32, y: f32, radius: f32, inner_radius: f32, color: u32, ink: Ink) {
        if radius <= 0.0 {
            return;
        }
        let (vertices, indices, _) = self.allocate_geometry(4, 6);
        self.ring.vertices_mut(vertices).copy_from_slice(&pixel_quad(
            x - radius,
            y - radius,
            radius * 2.0,
            radius * 2.0,
            vertex_color(color, 0xFF),
        ));
        self.add_quads_to_buffer(indices, 1);

        let shader = DrawShader::Circle {
            inner_radius: (inner_radius / radius).clamp(0.0, 1.0),
        };
        self.push_state(RenderState {
            vertices,
            indices,
            ..RenderState::new(shader, ink.into())
        });
    }

    // ── sprites & text ────────────────────────────────────────────────────

    /// Builds a sprite shader: stages the current screen's line banks and a
    /// palette snapshot.
    ///
    /// The staged data lives until the next flush; call this after the draw's
    /// geometry has been allocated.
    pub fn sprite_shader(&mut self, palette: &PaletteBanks, line_buffer: &[u8]) -> DrawShader {
        let clip = self.screens[self.current_screen].clip;
        let banks = encode_line_banks(self.settings.pix_height, clip, line_buffer);
        let attributes = self.staging.push_image(banks.width, banks.height, RECORD_SIZE, banks.as_bytes());
        let palette = self.stage_palette(palette);
        DrawShader::Sprite { attributes, palette }
    }

    /// Queues indexed sprite quads sampled from `surface`.
    pub fn draw_sprite(&mut self, inputs: &SceneInputs<'_>, surface: SurfaceId, quads: &[TexturedQuad], ink: Ink) {
        let Some((vertices, indices)) = self.textured_geometry(surface, quads, WHITE) else {
            return;
        };
        let shader = self.sprite_shader(inputs.palette, inputs.line_buffer);

        self.push_state(RenderState {
            vertices,
            indices,
            ..RenderState::new(shader, ink.into()).with_texture(surface)
        });
    }

    /// Queues glyph quads from a font `surface`, tinted with `color`.
    pub fn draw_dev_text(&mut self, font: SurfaceId, quads: &[TexturedQuad], color: u32) {
        let Some((vertices, indices)) = self.textured_geometry(font, quads, vertex_color(color, 0xFF)) else {
            return;
        };

        self.push_state(RenderState {
            vertices,
            indices,
            ..RenderState::new(DrawShader::DevText, Resolve::default()).with_texture(font)
        });
    }

    fn textured_geometry(
        &mut self,
        surface: SurfaceId,
        quads: &[TexturedQuad],
        color: u32,
    ) -> Option<(super::ring::GeomRange, super::ring::GeomRange)> {
        if quads.is_empty() {
            return None;
        }
        if self.surface_size(surface).is_none() {
            if !self.warned_unknown_surface {
                self.warned_unknown_surface = true;
                log::warn!("draw with unknown surface {surface:?}; skipped");
            }
            return None;
        }

        let (vertices, indices, _) = self.allocate_geometry(4 * quads.len() as u32, 6 * quads.len() as u32);
        for (dst, quad) in self.ring.vertices_mut(vertices).chunks_exact_mut(4).zip(quads) {
            dst.copy_from_slice(&quad.vertices(color));
        }
        self.add_quads_to_buffer(indices, quads.len());
        Some((vertices, indices))
    }

    // ── 3D ────────────────────────────────────────────────────────────────

    /// Painter's-algorithm overlay: faces sorted back to front, one triangle
    /// fan each, all in a single Rect-shader draw.
    ///
    /// Only solid-colour draw modes produce geometry.
    pub fn draw_3d_scene(&mut self, scene: &Scene3D) {
        if !scene.draw_mode.draws_solid_faces() {
            return;
        }

        let faces = scene.sorted_faces();
        let index_count = Scene3D::fan_index_count(&faces);
        if index_count == 0 {
            return;
        }

        let vertex_count = scene.vertices.len() as u32;
        let (vertices, indices, _) = self.allocate_geometry(vertex_count, index_count as u32);

        let [px, py] = self.screens[self.current_screen].position;
        for (dst, v) in self.ring.vertices_mut(vertices).iter_mut().zip(&scene.vertices) {
            *dst = RenderVertex::new(
                from_fixed(v.x.wrapping_shl(8).wrapping_sub(px.wrapping_shl(16))),
                from_fixed(v.y.wrapping_shl(8).wrapping_sub(py.wrapping_shl(16))),
                vertex_color(v.color, 0xFF),
                0.0,
                0.0,
            );
        }
        Scene3D::write_fan_indices(&faces, self.ring.indices_mut(indices));

        self.push_state(RenderState {
            vertices,
            indices,
            ..RenderState::new(DrawShader::Rect, Resolve::default())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VideoSettings;
    use crate::coords::{ClipBounds, FixedVec2};
    use crate::render::backend::recording::{Call, RecordingBackend};
    use crate::render::ink::ResolveKind;
    use crate::render::shader::DrawKind;
    use crate::scene::{DrawMode3D, ScanlineInfo, TileLayer, Vertex3D};

    fn ctx() -> CompositorContext<RecordingBackend> {
        let settings = VideoSettings {
            pix_width: 32,
            pix_height: 16,
            vertex_limit: 256,
            ..VideoSettings::default()
        };
        CompositorContext::new(settings, RecordingBackend::default())
    }

    struct Frame {
        layers: Vec<TileLayer>,
        scanlines: Vec<ScanlineInfo>,
        palette: PaletteBanks,
        banks: Vec<u8>,
    }

    impl Frame {
        fn new(layers: Vec<TileLayer>) -> Self {
            Self {
                layers,
                scanlines: ScanlineInfo::scrolled_lines(FixedVec2::from_pixels(8, 4), 32),
                palette: PaletteBanks::new(),
                banks: vec![0; 32],
            }
        }

        fn inputs(&self) -> SceneInputs<'_> {
            SceneInputs {
                layers: &self.layers,
                scanlines: &self.scanlines,
                palette: &self.palette,
                line_buffer: &self.banks,
            }
        }
    }

    fn kinds(c: &CompositorContext<RecordingBackend>) -> Vec<DrawKind> {
        c.backend().draws().iter().map(|s| s.shader.kind()).collect()
    }

    // ── tile layers ───────────────────────────────────────────────────────

    #[test]
    fn basic_layer_draws_exactly_like_hscroll() {
        let frame = Frame::new(vec![TileLayer::new(LayerKind::Basic, 4, 4)]);

        let mut a = ctx();
        a.prepare_layer_textures(&frame.layers);
        a.draw_layer_basic(&frame.inputs(), 0);
        a.flush();

        let mut b = ctx();
        b.prepare_layer_textures(&frame.layers);
        b.draw_layer_hscroll(&frame.inputs(), 0);
        b.flush();

        assert_eq!(a.backend().draws(), b.backend().draws());
        assert_eq!(a.backend().last_staging, b.backend().last_staging);
        assert_eq!(a.backend().last_vertices, b.backend().last_vertices);
    }

    #[test]
    fn draw_layer_dispatches_on_kind() {
        let frame = Frame::new(vec![
            TileLayer::new(LayerKind::Basic, 4, 4),
            TileLayer::new(LayerKind::VScroll, 4, 4),
            TileLayer::new(LayerKind::Rotozoom, 4, 4),
        ]);
        let mut c = ctx();
        c.prepare_layer_textures(&frame.layers);
        for i in 0..3 {
            c.draw_layer(&frame.inputs(), i);
        }
        c.flush();

        assert_eq!(kinds(&c), vec![DrawKind::TileHScroll, DrawKind::TileVScroll, DrawKind::TileRotozoom]);
    }

    #[test]
    fn empty_layer_is_silent_noop() {
        let frame = Frame::new(vec![TileLayer::default()]);
        let mut c = ctx();
        c.prepare_layer_textures(&frame.layers);
        c.draw_layer(&frame.inputs(), 0);
        c.flush();
        assert!(c.backend().calls.is_empty());
    }

    #[test]
    fn unprepared_layer_is_skipped() {
        let frame = Frame::new(vec![TileLayer::new(LayerKind::HScroll, 4, 4)]);
        let mut c = ctx();
        c.draw_layer(&frame.inputs(), 0);
        c.draw_layer(&frame.inputs(), 0);
        assert!(c.queue(0).is_empty());
        assert!(c.warned_layers[0]);
    }

    #[test]
    fn layer_prepared_for_another_kind_is_skipped() {
        let mut frame = Frame::new(vec![TileLayer::new(LayerKind::HScroll, 4, 4)]);
        let mut c = ctx();
        c.prepare_layer_textures(&frame.layers);
        frame.layers[0].kind = LayerKind::Rotozoom;
        c.draw_layer(&frame.inputs(), 0);
        assert!(c.queue(0).is_empty());
    }

    #[test]
    fn layout_uploads_once_per_version() {
        let mut frame = Frame::new(vec![TileLayer::new(LayerKind::HScroll, 4, 4)]);
        let mut c = ctx();
        c.prepare_layer_textures(&frame.layers);

        c.draw_layer(&frame.inputs(), 0);
        c.draw_layer(&frame.inputs(), 0);
        c.flush();
        c.draw_layer(&frame.inputs(), 0);
        c.flush();
        frame.layers[0].set_tile(1, 1, 7);
        c.draw_layer(&frame.inputs(), 0);
        c.flush();

        let uploads: Vec<Vec<u8>> = c
            .backend()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::BeginFlush { layouts, .. } => Some(layouts.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(uploads, vec![vec![0], vec![], vec![0]]);
    }

    fn layout_uploads(c: &CompositorContext<RecordingBackend>) -> Vec<Vec<u8>> {
        c.backend()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::BeginFlush { layouts, .. } => Some(layouts.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn replaced_layer_uploads_its_own_layout() {
        let mut first = TileLayer::new(LayerKind::HScroll, 4, 4);
        first.set_tile(0, 0, 1);
        let mut second = TileLayer::new(LayerKind::HScroll, 4, 4);
        second.set_tile(0, 0, 2);

        let mut frame = Frame::new(vec![first]);
        let mut c = ctx();
        c.prepare_layer_textures(&frame.layers);
        c.draw_layer(&frame.inputs(), 0);
        c.flush();

        frame.layers[0] = second;
        c.draw_layer(&frame.inputs(), 0);
        c.flush();

        assert_eq!(layout_uploads(&c), vec![vec![0], vec![0]]);
        let staged: Vec<u16> = c
            .backend()
            .last_staging
            .chunks_exact(2)
            .map(|w| u16::from_le_bytes([w[0], w[1]]))
            .collect();
        assert!(staged.contains(&2));
    }

    #[test]
    fn cloned_and_edited_layer_uploads_again() {
        let mut frame = Frame::new(vec![TileLayer::new(LayerKind::HScroll, 4, 4)]);
        let mut c = ctx();
        c.prepare_layer_textures(&frame.layers);
        c.draw_layer(&frame.inputs(), 0);
        c.flush();

        let mut copy = frame.layers[0].clone();
        copy.set_tile(3, 3, 9);
        frame.layers[0] = copy;
        c.draw_layer(&frame.inputs(), 0);
        c.flush();

        assert_eq!(layout_uploads(&c), vec![vec![0], vec![0]]);
    }

    #[test]
    fn vscroll_clip_spans_full_height() {
        let frame = Frame::new(vec![TileLayer::new(LayerKind::VScroll, 4, 4)]);
        let mut c = ctx();
        c.prepare_layer_textures(&frame.layers);
        if let Some(s) = c.screen_mut(0) {
            s.set_clip(ClipBounds::new(4, 4, 20, 10));
        }
        c.draw_layer(&frame.inputs(), 0);

        let clip = c.queue(0)[0].clip;
        assert_eq!((clip.x, clip.width), (4, 16));
        assert_eq!((clip.y, clip.height), (0, 16));
    }

    #[test]
    fn tile_draw_snapshots_palette_per_command() {
        let mut frame = Frame::new(vec![TileLayer::new(LayerKind::HScroll, 4, 4)]);
        let mut c = ctx();
        c.prepare_layer_textures(&frame.layers);

        frame.palette.set_rgb888(0, 1, 0xFF0000);
        c.draw_layer(&frame.inputs(), 0);
        frame.palette.set_rgb888(0, 1, 0x0000FF);
        c.draw_layer(&frame.inputs(), 0);

        let palette_of = |i: usize| match c.queue(0)[i].shader {
            DrawShader::Tile { palette, .. } => c.staging.row(palette, 0)[2..4].to_vec(),
            _ => unreachable!(),
        };
        assert_eq!(palette_of(0), 0xF800u16.to_le_bytes());
        assert_eq!(palette_of(1), 0x001Fu16.to_le_bytes());
    }

    // ── fill & shapes ─────────────────────────────────────────────────────

    #[test]
    fn fill_covers_pitch_and_resolves_with_fill() {
        let mut c = ctx();
        c.fill_screen(0x102030, 300, 128, -5);
        c.flush();

        assert_eq!(c.backend().resolves(), vec![(0, ResolveKind::Fill)]);
        let quad = &c.backend().last_vertices[6..10];
        assert_eq!(quad[3].pos[..2], [32.0, 16.0]);
        match c.backend().draws()[0].resolve {
            Resolve::Fill(f) => assert_eq!(f, [1.0, 128.0 / 255.0, 0.0]),
            _ => panic!("expected fill resolve"),
        }
    }

    #[test]
    fn shapes_carry_their_ink() {
        let mut c = ctx();
        c.draw_rect(1.0, 1.0, 4.0, 4.0, 0xFFFFFF, Ink::Add(0.5));
        c.draw_circle(8.0, 8.0, 4.0, 2.0, 0xFFFFFF, Ink::None);
        c.draw_rect(0.0, 0.0, 0.0, 4.0, 0xFFFFFF, Ink::None);

        assert_eq!(c.queue(0).len(), 2);
        assert_eq!(c.queue(0)[0].resolve.kind(), ResolveKind::Add);
        assert_eq!(c.queue(0)[1].shader, DrawShader::Circle { inner_radius: 0.5 });
    }

    // ── sprites ───────────────────────────────────────────────────────────

    #[test]
    fn sprite_needs_a_live_surface() {
        let frame = Frame::new(Vec::new());
        let mut c = ctx();
        let quad = TexturedQuad { width: 8.0, height: 8.0, uv: [0.0, 0.0, 1.0, 1.0], ..Default::default() };

        let id = c.create_surface(&[1; 64], 8, 8).unwrap();
        c.draw_sprite(&frame.inputs(), id, &[quad, quad], Ink::Blend);
        c.destroy_surface(id).unwrap();
        c.draw_sprite(&frame.inputs(), id, &[quad], Ink::Blend);

        assert_eq!(c.queue(0).len(), 1);
        let state = &c.queue(0)[0];
        assert_eq!(state.texture, Some(id));
        assert_eq!(state.shader.kind(), DrawKind::Sprite);
        assert_eq!((state.vertices.count(), state.indices.count()), (8, 12));
        assert!(c.warned_unknown_surface);
    }

    #[test]
    fn dev_text_uses_vertex_tint() {
        let mut c = ctx();
        let font = c.create_surface(&[0; 4], 2, 2).unwrap();
        let glyph = TexturedQuad { width: 8.0, height: 8.0, ..Default::default() };
        c.draw_dev_text(font, &[glyph], 0x00FF00);
        c.flush();

        assert_eq!(kinds(&c), vec![DrawKind::DevText]);
        assert_eq!(c.backend().last_vertices[6].color, vertex_color(0x00FF00, 0xFF));
    }

    // ── 3D ────────────────────────────────────────────────────────────────

    fn v(x: i32, y: i32, z: i32) -> Vertex3D {
        Vertex3D { x: x << 8, y: y << 8, z, color: 0xFFFFFF }
    }

    #[test]
    fn solid_scene_emits_one_fan_draw() {
        let mut scene = Scene3D::new(DrawMode3D::SolidColor);
        scene.add_face(&[v(0, 0, 10), v(4, 0, 10), v(4, 4, 10), v(0, 4, 10)]);
        scene.add_face(&[v(0, 0, 90), v(2, 0, 90), v(2, 2, 90)]);

        let mut c = ctx();
        if let Some(s) = c.screen_mut(0) {
            s.position = [1, 0];
        }
        c.draw_3d_scene(&scene);
        c.flush();

        let draws = c.backend().draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].indices.count(), 3 * 2 + 3);
        // the far triangle (z 90) comes first
        assert_eq!(&c.backend().last_indices[..3], &[4, 5, 6]);
        assert_eq!(c.backend().last_vertices[6 + 1].pos[0], 3.0);
    }

    #[test]
    fn extreme_coordinates_wrap_instead_of_overflowing() {
        let far = |x: i32, y: i32| Vertex3D { x, y, z: 1, color: 0xFFFFFF };
        let mut scene = Scene3D::new(DrawMode3D::SolidColor);
        scene.add_face(&[far(i32::MAX, i32::MIN), far(i32::MIN, 0), far(0, i32::MAX)]);

        let mut c = ctx();
        if let Some(s) = c.screen_mut(0) {
            s.position = [i32::MAX, i32::MIN];
        }
        c.draw_3d_scene(&scene);
        c.flush();

        assert_eq!(c.backend().draws().len(), 1);
        assert!(c.backend().last_vertices[6..9].iter().all(|v| v.pos[0].is_finite() && v.pos[1].is_finite()));
    }

    #[test]
    fn wireframe_scene_draws_nothing() {
        let mut scene = Scene3D::new(DrawMode3D::Wireframe);
        scene.add_face(&[v(0, 0, 1), v(1, 0, 1), v(1, 1, 1)]);
        let mut c = ctx();
        c.draw_3d_scene(&scene);
        assert!(c.queue(0).is_empty());
    }
}
