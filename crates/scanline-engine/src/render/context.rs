//! CPU side of the compositor: ring, queues, screens and the drain loop.

use crate::config::{LAYER_COUNT, TILE_COUNT, TILE_SIZE, VideoSettings};
use crate::error::RenderError;
use crate::scene::{Screen, TileLayer};

use super::backend::{CompositeBackend, FlushInput, LayerTextureDesc, LayoutUpload, SurfaceId};
use super::queue::{RenderState, RenderStateQueue};
use super::ring::{Flushed, GeomRange, GeometryRing, write_quad_indices};
use super::staging::StagingArena;
use super::vertex::RenderVertex;

/// Tileset atlas width in pixels (16 tiles per row).
pub const ATLAS_WIDTH: u32 = 16 * TILE_SIZE;

/// Tileset atlas height in pixels.
pub const ATLAS_HEIGHT: u32 = TILE_COUNT / 16 * TILE_SIZE;

/// Counters since the last [`CompositorContext::take_stats`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FlushStats {
    pub flushes: u32,
    pub draws: u32,
    pub resolves: u32,
}

#[derive(Debug, Copy, Clone)]
pub(super) struct PreparedLayer {
    pub desc: LayerTextureDesc,
    pub uploaded_version: Option<u64>,
}

/// Owns every piece of mutable compositor state.
///
/// Draw entry points (see `render::draw`) queue commands for the current
/// screen; [`CompositorContext::flush`] drains all screens through the
/// backend. A flush can also happen implicitly when geometry allocation would
/// overflow the ring, or right after a tint draw is queued.
pub struct CompositorContext<B> {
    pub(super) settings: VideoSettings,
    pub(super) backend: B,
    pub(super) ring: GeometryRing,
    pub(super) staging: StagingArena,
    pub(super) layouts: Vec<LayoutUpload>,
    pub(super) screens: Vec<Screen>,
    pub(super) queues: Vec<RenderStateQueue>,
    pub(super) current_screen: usize,
    pub(super) layers: [Option<PreparedLayer>; LAYER_COUNT],
    pub(super) surfaces: Vec<Option<(u32, u32)>>,
    pub(super) stats: FlushStats,

    pub(super) warned_layers: [bool; LAYER_COUNT],
    pub(super) warned_unknown_surface: bool,
}

impl<B: CompositeBackend> CompositorContext<B> {
    pub fn new(settings: VideoSettings, backend: B) -> Self {
        let screen_count = settings.active_screens();
        let screens = (0..screen_count)
            .map(|_| Screen::new(settings.pix_width, settings.pix_height))
            .collect();

        let vertex_limit = settings.ring_vertex_limit();
        if vertex_limit != settings.vertex_limit {
            log::warn!(
                "compositor: ring limit {} out of range, using {}",
                settings.vertex_limit,
                vertex_limit
            );
        }

        log::debug!(
            "compositor: {}x{} working area, {} screen(s), ring limit {}",
            settings.pix_width,
            settings.pix_height,
            screen_count,
            vertex_limit
        );

        Self {
            ring: GeometryRing::new(vertex_limit),
            staging: StagingArena::new(),
            layouts: Vec::new(),
            screens,
            queues: (0..screen_count).map(|_| RenderStateQueue::new()).collect(),
            current_screen: 0,
            layers: [None; LAYER_COUNT],
            surfaces: Vec::new(),
            stats: FlushStats::default(),
            warned_layers: [false; LAYER_COUNT],
            warned_unknown_surface: false,
            settings,
            backend,
        }
    }

    #[inline]
    pub fn settings(&self) -> &VideoSettings {
        &self.settings
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ── screens ───────────────────────────────────────────────────────────

    #[inline]
    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    #[inline]
    pub fn screen_mut(&mut self, index: usize) -> Option<&mut Screen> {
        self.screens.get_mut(index)
    }

    #[inline]
    pub fn current_screen(&self) -> usize {
        self.current_screen
    }

    /// Selects the screen later draws target. Out-of-range indices are ignored.
    pub fn set_current_screen(&mut self, index: usize) {
        if index < self.screens.len() {
            self.current_screen = index;
        } else {
            log::warn!("set_current_screen({index}): only {} screen(s) active", self.screens.len());
        }
    }

    #[inline]
    pub fn queue(&self, screen: usize) -> &RenderStateQueue {
        &self.queues[screen]
    }

    #[inline]
    pub fn stats(&self) -> FlushStats {
        self.stats
    }

    pub fn take_stats(&mut self) -> FlushStats {
        std::mem::take(&mut self.stats)
    }

    // ── geometry ──────────────────────────────────────────────────────────

    /// Returns `count` writable vertices from the ring.
    ///
    /// Flushes every screen first if the ring cannot hold them.
    ///
    /// # Panics
    /// Panics if `count` exceeds the ring's per-call limit.
    pub fn allocate_vertex_buffer(&mut self, count: u32) -> (GeomRange, Flushed) {
        self.check_limit(count);
        let flushed = if self.ring.vertices_fit(count) {
            Flushed::No
        } else {
            self.flush();
            Flushed::Yes
        };
        (self.ring.reserve_vertices(count), flushed)
    }

    /// Index counterpart of [`CompositorContext::allocate_vertex_buffer`].
    pub fn allocate_index_buffer(&mut self, count: u32) -> (GeomRange, Flushed) {
        self.check_limit(count);
        let flushed = if self.ring.indices_fit(count) {
            Flushed::No
        } else {
            self.flush();
            Flushed::Yes
        };
        (self.ring.reserve_indices(count), flushed)
    }

    /// Allocates vertices and indices together; at most one flush happens
    /// and both ranges belong to the same generation.
    pub fn allocate_geometry(&mut self, vertices: u32, indices: u32) -> (GeomRange, GeomRange, Flushed) {
        self.check_limit(vertices);
        self.check_limit(indices);

        let flushed = if self.ring.vertices_fit(vertices) && self.ring.indices_fit(indices) {
            Flushed::No
        } else {
            self.flush();
            Flushed::Yes
        };
        (
            self.ring.reserve_vertices(vertices),
            self.ring.reserve_indices(indices),
            flushed,
        )
    }

    fn check_limit(&self, count: u32) {
        assert!(
            count <= self.ring.limit(),
            "geometry allocation of {count} exceeds the ring limit of {}",
            self.ring.limit()
        );
    }

    #[inline]
    pub fn vertices_mut(&mut self, range: GeomRange) -> &mut [RenderVertex] {
        self.ring.vertices_mut(range)
    }

    #[inline]
    pub fn indices_mut(&mut self, range: GeomRange) -> &mut [u16] {
        self.ring.indices_mut(range)
    }

    /// Fills `range` with the index pattern of `quads` quads.
    pub fn add_quads_to_buffer(&mut self, range: GeomRange, quads: usize) {
        write_quad_indices(self.ring.indices_mut(range), quads);
    }

    // ── queueing ──────────────────────────────────────────────────────────

    /// Queues `state` on the current screen.
    pub fn push_state(&mut self, state: RenderState) {
        self.push_state_to(self.current_screen, state);
    }

    /// Queues `state` on `screen`.
    ///
    /// The screen's clip bounds are copied into the command, the ring offsets
    /// advance past its geometry, and a tint command is flushed immediately.
    pub fn push_state_to(&mut self, screen: usize, mut state: RenderState) {
        debug_assert_eq!(state.vertices.generation(), self.ring.generation(), "stale vertex range");
        debug_assert_eq!(state.indices.generation(), self.ring.generation(), "stale index range");

        let Some(target) = self.screens.get(screen) else {
            log::warn!("push_state_to({screen}): no such screen; command dropped");
            return;
        };

        state.clip = target.clip.to_scissor();
        let (vertex_count, index_count) = (state.vertices.count(), state.indices.count());
        let tint = state.resolve.is_tint();

        self.queues[screen].push(state);
        self.ring.advance(vertex_count, index_count);

        if tint {
            self.flush();
        }
    }

    /// Drains every screen's queue through the backend.
    ///
    /// Per screen, each command is drawn into scratch; a resolve follows when
    /// the command's ink is not `None`, when it is the last command, or when
    /// the next command's ink is not `None`. Consecutive `None` draws thus
    /// share one resolve. Afterwards all queues are empty and the ring and
    /// staging arena are reset.
    pub fn flush(&mut self) {
        let commands: usize = self.queues.iter().map(|q| q.len()).sum();

        if commands > 0 {
            self.backend.begin_flush(&FlushInput {
                vertices: self.ring.used_vertices(),
                indices: self.ring.used_indices(),
                staging: self.staging.bytes(),
                layouts: &self.layouts,
                commands,
            });

            for (screen, queue) in self.queues.iter_mut().enumerate() {
                while !queue.empty() {
                    let current = queue.pop().clone();
                    self.backend.draw(screen, &current);
                    self.stats.draws += 1;

                    if !current.resolve.is_none() || queue.empty() || !queue.front().resolve.is_none() {
                        self.backend.resolve(screen, &current.resolve);
                        self.stats.resolves += 1;
                    }
                }
                queue.finish();
            }

            self.backend.end_flush();
            self.stats.flushes += 1;
        }

        self.ring.reset();
        self.staging.reset();
        self.layouts.clear();
    }

    /// End-of-frame drain.
    pub fn end_frame(&mut self) {
        self.flush();
    }

    // ── layers ────────────────────────────────────────────────────────────

    /// Texture dimensions a layer needs in its slot.
    pub fn layer_texture_desc(&self, layer: &TileLayer) -> LayerTextureDesc {
        let (layout_width, layout_height) = layer.layout_extent();
        let (w, h) = self.settings.attribute_extent();
        let (attribute_width, attribute_height) = match layer.kind {
            crate::scene::LayerKind::Basic | crate::scene::LayerKind::HScroll => (1, h),
            crate::scene::LayerKind::VScroll => (w, 1),
            crate::scene::LayerKind::Rotozoom => (w, h),
        };

        LayerTextureDesc {
            layout_width,
            layout_height,
            attribute_width,
            attribute_height,
        }
    }

    /// (Re)allocates layout and attribute textures for every non-empty layer.
    ///
    /// Must run before the first draw of a new or resized layer. Prepared
    /// layers re-upload their layout on their next draw.
    pub fn prepare_layer_textures(&mut self, layers: &[TileLayer]) {
        for (i, layer) in layers.iter().enumerate().take(LAYER_COUNT) {
            if layer.is_empty() {
                self.layers[i] = None;
                continue;
            }

            let desc = self.layer_texture_desc(layer);
            self.backend.prepare_layer(i as u8, &desc);
            self.layers[i] = Some(PreparedLayer {
                desc,
                uploaded_version: None,
            });
            self.warned_layers[i] = false;
        }

        if layers.len() > LAYER_COUNT {
            log::warn!("prepare_layer_textures: {} layers given, only {LAYER_COUNT} slots", layers.len());
        }
    }

    /// Re-packs tile-major 16×16 tiles into the atlas and uploads it.
    ///
    /// `pixels` holds `TILE_COUNT` tiles of 256 indexed pixels each; missing
    /// data is treated as transparent.
    pub fn populate_tiles_texture(&mut self, pixels: &[u8]) {
        let atlas = pack_tile_atlas(pixels);
        self.backend.upload_tileset(ATLAS_WIDTH, ATLAS_HEIGHT, &atlas);
    }

    // ── surfaces ──────────────────────────────────────────────────────────

    /// Creates an indexed (one byte per pixel) surface.
    pub fn create_surface(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<SurfaceId, RenderError> {
        check_surface_size(pixels, width, height)?;

        let slot = match self.surfaces.iter().position(Option::is_none) {
            Some(free) => free,
            None => {
                self.surfaces.push(None);
                self.surfaces.len() - 1
            }
        };
        self.surfaces[slot] = Some((width, height));

        let id = SurfaceId(slot as u32);
        self.backend.create_surface(id, width, height, pixels);
        Ok(id)
    }

    pub fn update_surface(&mut self, id: SurfaceId, pixels: &[u8], width: u32, height: u32) -> Result<(), RenderError> {
        check_surface_size(pixels, width, height)?;
        let slot = self
            .surfaces
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(RenderError::UnknownSurface(id))?;

        *slot = (width, height);
        self.backend.update_surface(id, width, height, pixels);
        Ok(())
    }

    /// Destroys a surface. Commands already queued with it draw nothing.
    pub fn destroy_surface(&mut self, id: SurfaceId) -> Result<(), RenderError> {
        let slot = self
            .surfaces
            .get_mut(id.index())
            .filter(|s| s.is_some())
            .ok_or(RenderError::UnknownSurface(id))?;

        *slot = None;
        self.backend.destroy_surface(id);
        Ok(())
    }

    #[inline]
    pub fn surface_size(&self, id: SurfaceId) -> Option<(u32, u32)> {
        self.surfaces.get(id.index()).copied().flatten()
    }
}

fn check_surface_size(pixels: &[u8], width: u32, height: u32) -> Result<(), RenderError> {
    if width == 0 || height == 0 || pixels.len() != width as usize * height as usize {
        return Err(RenderError::SurfaceSize {
            width,
            height,
            len: pixels.len(),
        });
    }
    Ok(())
}

/// Tile-major pixels → `ATLAS_WIDTH × ATLAS_HEIGHT` atlas, 16 tiles per row.
pub fn pack_tile_atlas(pixels: &[u8]) -> Vec<u8> {
    let tile = TILE_SIZE as usize;
    let tile_bytes = tile * tile;
    let width = ATLAS_WIDTH as usize;
    let mut atlas = vec![0u8; width * ATLAS_HEIGHT as usize];

    for (t, src) in pixels.chunks(tile_bytes).take(TILE_COUNT as usize).enumerate() {
        let (tx, ty) = ((t % 16) * tile, (t / 16) * tile);
        for (row, line) in src.chunks(tile).enumerate() {
            let dst = (ty + row) * width + tx;
            atlas[dst..dst + line.len()].copy_from_slice(line);
        }
    }
    atlas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{ClipBounds, Scissor};
    use crate::render::backend::recording::{Call, RecordingBackend};
    use crate::render::ink::{Ink, ResolveKind};
    use crate::render::shader::DrawShader;
    use crate::paint::TintTable;

    fn ctx(limit: u32) -> CompositorContext<RecordingBackend> {
        let settings = VideoSettings {
            vertex_limit: limit,
            screen_count: 2,
            ..VideoSettings::default()
        };
        CompositorContext::new(settings, RecordingBackend::default())
    }

    fn queue_quad(c: &mut CompositorContext<RecordingBackend>, ink: Ink) -> Flushed {
        let (v, i, flushed) = c.allocate_geometry(4, 6);
        c.add_quads_to_buffer(i, 1);
        c.push_state(RenderState {
            vertices: v,
            indices: i,
            ..RenderState::new(DrawShader::Rect, ink.into())
        });
        flushed
    }

    // ── ring backpressure ─────────────────────────────────────────────────

    #[test]
    fn overflow_flushes_before_serving() {
        let mut c = ctx(16);
        assert_eq!(queue_quad(&mut c, Ink::None), Flushed::No);
        assert_eq!(queue_quad(&mut c, Ink::None), Flushed::No);
        // 8 vertices / 12 indices used; 6 more indices would pass 16
        assert_eq!(queue_quad(&mut c, Ink::None), Flushed::Yes);

        assert_eq!(c.backend().flushes(), 1);
        assert_eq!(c.ring.vertex_offset(), crate::config::RESERVED_VERTICES + 4);
        assert_eq!(c.ring.index_offset(), 6);
    }

    #[test]
    fn flush_after_overflow_rewinds_to_prefix_plus_request() {
        let mut c = ctx(16);
        queue_quad(&mut c, Ink::None);
        let (v, flushed) = c.allocate_vertex_buffer(14);
        assert_eq!(flushed, Flushed::Yes);
        assert_eq!(v.offset(), crate::config::RESERVED_VERTICES);
        assert_eq!(v.count(), 14);
    }

    #[test]
    #[should_panic(expected = "exceeds the ring limit")]
    fn oversized_allocation_is_fatal() {
        let mut c = ctx(16);
        let _ = c.allocate_index_buffer(17);
    }

    #[test]
    fn flush_uploads_used_geometry_with_reserved_quad() {
        let mut c = ctx(64);
        queue_quad(&mut c, Ink::None);
        c.flush();

        assert_eq!(c.backend().last_vertices.len(), 6 + 4);
        assert_eq!(c.backend().last_indices, vec![0, 1, 2, 1, 3, 2]);
        assert_eq!(c.ring.vertex_offset(), crate::config::RESERVED_VERTICES);
    }

    // ── drain loop ────────────────────────────────────────────────────────

    #[test]
    fn none_runs_coalesce_until_a_blending_command() {
        let mut c = ctx(64);
        queue_quad(&mut c, Ink::None);
        queue_quad(&mut c, Ink::None);
        queue_quad(&mut c, Ink::Add(1.0));
        c.flush();

        assert_eq!(
            c.backend().resolves(),
            vec![(0, ResolveKind::None), (0, ResolveKind::Add)]
        );
    }

    #[test]
    fn blending_command_in_the_middle_splits_three_ways() {
        let mut c = ctx(64);
        queue_quad(&mut c, Ink::None);
        queue_quad(&mut c, Ink::Add(1.0));
        queue_quad(&mut c, Ink::None);
        c.flush();

        let kinds: Vec<_> = c.backend().resolves().into_iter().map(|(_, k)| k).collect();
        assert_eq!(kinds, vec![ResolveKind::None, ResolveKind::Add, ResolveKind::None]);
    }

    #[test]
    fn trailing_none_run_resolves_once() {
        let mut c = ctx(64);
        for _ in 0..4 {
            queue_quad(&mut c, Ink::None);
        }
        c.flush();

        assert_eq!(c.backend().resolves().len(), 1);
        assert_eq!(c.stats(), FlushStats { flushes: 1, draws: 4, resolves: 1 });
    }

    #[test]
    fn every_screen_drains_in_order() {
        let mut c = ctx(64);
        c.set_current_screen(1);
        queue_quad(&mut c, Ink::Blend);
        c.set_current_screen(0);
        queue_quad(&mut c, Ink::None);
        c.end_frame();

        let screens: Vec<usize> = c
            .backend()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Draw { screen, .. } => Some(*screen),
                _ => None,
            })
            .collect();
        assert_eq!(screens, vec![0, 1]);
        assert!(c.queue(0).empty() && c.queue(1).empty());
        assert_eq!(c.queue(0).len(), 0);
    }

    fn draw_screens(c: &CompositorContext<RecordingBackend>) -> Vec<usize> {
        c.backend()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Draw { screen, .. } => Some(*screen),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn overflow_on_second_screen_drains_first_screen_too() {
        let mut c = ctx(16);
        queue_quad(&mut c, Ink::None);
        queue_quad(&mut c, Ink::Blend);
        c.set_current_screen(1);
        assert_eq!(queue_quad(&mut c, Ink::None), Flushed::Yes);

        // the overflow flush ran before the new command was queued
        assert_eq!(draw_screens(&c), vec![0, 0]);
        assert_eq!(c.queue(0).len(), 0);
        assert_eq!(c.queue(1).len(), 1);

        c.end_frame();
        assert_eq!(draw_screens(&c), vec![0, 0, 1]);
        assert_eq!(c.backend().flushes(), 2);
        assert!(c.queue(0).empty() && c.queue(1).empty());
        assert_eq!((c.queue(0).len(), c.queue(1).len()), (0, 0));
    }

    #[test]
    fn tint_on_second_screen_drains_every_screen() {
        let mut c = ctx(64);
        queue_quad(&mut c, Ink::None);
        c.set_current_screen(1);
        queue_quad(&mut c, Ink::Tint(TintTable::identity()));

        assert_eq!(c.backend().flushes(), 1);
        assert_eq!(draw_screens(&c), vec![0, 1]);
        assert_eq!(
            c.backend().resolves(),
            vec![(0, ResolveKind::None), (1, ResolveKind::Tint)]
        );
        assert_eq!((c.queue(0).len(), c.queue(1).len()), (0, 0));
    }

    #[test]
    fn oversized_ring_limit_is_clamped_to_u16_indices() {
        let c = ctx(1 << 20);
        assert_eq!(c.ring.limit(), crate::config::MAX_VERTEX_LIMIT);
        let last = c.ring.limit() + crate::config::RESERVED_VERTICES - 1;
        assert!(u16::try_from(last).is_ok());
    }

    #[test]
    fn draws_use_their_own_ring_offsets() {
        let mut c = ctx(64);
        c.set_current_screen(1);
        queue_quad(&mut c, Ink::None);
        c.set_current_screen(0);
        queue_quad(&mut c, Ink::None);
        c.flush();

        let draws = c.backend().draws();
        // screen 0 drains first but its geometry was allocated second
        assert_eq!(draws[0].vertices.offset(), 6 + 4);
        assert_eq!(draws[1].vertices.offset(), 6);
    }

    #[test]
    fn tint_flushes_immediately() {
        let mut c = ctx(64);
        queue_quad(&mut c, Ink::None);
        queue_quad(&mut c, Ink::Tint(TintTable::identity()));

        assert_eq!(c.backend().flushes(), 1);
        assert!(c.queue(0).empty());
        assert_eq!(c.backend().resolves().last(), Some(&(0, ResolveKind::Tint)));
    }

    #[test]
    fn empty_flush_does_not_reach_backend() {
        let mut c = ctx(64);
        c.flush();
        assert!(c.backend().calls.is_empty());
        assert_eq!(c.stats().flushes, 0);
    }

    // ── clip ──────────────────────────────────────────────────────────────

    #[test]
    fn push_converts_screen_clip_to_extent() {
        let mut c = ctx(64);
        if let Some(s) = c.screen_mut(0) {
            s.set_clip(ClipBounds::new(10, 20, 110, 220));
        }
        queue_quad(&mut c, Ink::None);
        assert_eq!(c.queue(0)[0].clip, Scissor::new(10, 20, 100, 200));
    }

    #[test]
    fn out_of_range_screen_is_ignored() {
        let mut c = ctx(64);
        c.set_current_screen(7);
        assert_eq!(c.current_screen(), 0);
    }

    // ── surfaces ──────────────────────────────────────────────────────────

    #[test]
    fn surface_lifecycle_reuses_slots() {
        let mut c = ctx(64);
        let a = c.create_surface(&[1; 4], 2, 2).unwrap();
        let b = c.create_surface(&[1; 8], 4, 2).unwrap();
        assert_ne!(a, b);
        assert_eq!(c.surface_size(b), Some((4, 2)));

        c.destroy_surface(a).unwrap();
        assert!(matches!(c.destroy_surface(a), Err(RenderError::UnknownSurface(_))));

        let d = c.create_surface(&[0; 1], 1, 1).unwrap();
        assert_eq!(d, a);
    }

    #[test]
    fn surface_size_mismatch_is_rejected() {
        let mut c = ctx(64);
        assert!(matches!(
            c.create_surface(&[0; 3], 2, 2),
            Err(RenderError::SurfaceSize { width: 2, height: 2, len: 3 })
        ));
        let id = c.create_surface(&[0; 4], 2, 2).unwrap();
        assert!(c.update_surface(id, &[0; 5], 2, 2).is_err());
        assert!(c.update_surface(id, &[0; 6], 3, 2).is_ok());
        assert_eq!(c.surface_size(id), Some((3, 2)));
    }

    // ── layers & tiles ────────────────────────────────────────────────────

    #[test]
    fn prepare_skips_empty_layers_and_sizes_attributes_by_kind() {
        use crate::scene::LayerKind;

        let mut c = ctx(64);
        let layers = [
            TileLayer::new(LayerKind::HScroll, 64, 16),
            TileLayer::default(),
            TileLayer::new(LayerKind::VScroll, 8, 8),
            TileLayer::new(LayerKind::Rotozoom, 8, 8),
        ];
        c.prepare_layer_textures(&layers);

        let prepared: Vec<(u8, LayerTextureDesc)> = c
            .backend()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::PrepareLayer { layer, desc } => Some((*layer, *desc)),
                _ => None,
            })
            .collect();

        assert_eq!(prepared.len(), 3);
        assert_eq!(prepared[0].1, LayerTextureDesc { layout_width: 64, layout_height: 16, attribute_width: 1, attribute_height: 256 });
        assert_eq!(prepared[1].0, 2);
        assert_eq!((prepared[1].1.attribute_width, prepared[1].1.attribute_height), (512, 1));
        assert_eq!((prepared[2].1.attribute_width, prepared[2].1.attribute_height), (512, 256));
    }

    #[test]
    fn atlas_places_tiles_sixteen_per_row() {
        let mut pixels = vec![0u8; 18 * 256];
        pixels[256] = 1; // tile 1, (0, 0)
        pixels[17 * 256 + 16 + 3] = 2; // tile 17, (3, 1)

        let atlas = pack_tile_atlas(&pixels);
        assert_eq!(atlas.len(), (ATLAS_WIDTH * ATLAS_HEIGHT) as usize);
        assert_eq!(atlas[16], 1);
        assert_eq!(atlas[(16 + 1) * 256 + 16 + 3], 2);
    }

    #[test]
    fn populate_uploads_full_atlas() {
        let mut c = ctx(64);
        c.populate_tiles_texture(&[]);
        assert_eq!(
            c.backend().calls,
            vec![Call::UploadTileset { width: 256, height: 1024 }]
        );
    }
}
