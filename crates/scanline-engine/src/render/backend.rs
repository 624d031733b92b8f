//! The seam between CPU-side queueing and the GPU.
//!
//! [`CompositorContext`](super::CompositorContext) decides *what* is drawn and
//! when it is resolved; a [`CompositeBackend`] turns those decisions into GPU
//! work. The wgpu implementation lives in `render::gpu`.

use super::ink::Resolve;
use super::queue::RenderState;
use super::staging::StagingSlice;
use super::vertex::RenderVertex;

/// Handle of a GPU-resident pixel source.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SurfaceId(pub(crate) u32);

impl SurfaceId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Texture dimensions of one tile layer slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LayerTextureDesc {
    /// Layout texture size in tiles (`R16Uint`).
    pub layout_width: u32,
    pub layout_height: u32,

    /// Attribute texture size in records (`RGBA32F`).
    pub attribute_width: u32,
    pub attribute_height: u32,
}

/// A pending tile-layout upload.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LayoutUpload {
    pub layer: u8,
    pub slice: StagingSlice,
}

/// Everything a flush needs uploaded before the first draw.
#[derive(Debug, Copy, Clone)]
pub struct FlushInput<'a> {
    /// Ring vertices, reserved prefix included.
    pub vertices: &'a [RenderVertex],
    pub indices: &'a [u16],

    /// Staging arena bytes referenced by the queued commands.
    pub staging: &'a [u8],

    /// Tile layouts to copy before any draw.
    pub layouts: &'a [LayoutUpload],

    /// Number of commands queued across all screens.
    pub commands: usize,
}

/// GPU side of the compositor.
///
/// Calls arrive in this order for every flush:
/// `begin_flush`, then per screen any interleaving of `draw`/`resolve`,
/// then `end_flush`. Surface and layer calls arrive between flushes.
pub trait CompositeBackend {
    fn begin_flush(&mut self, input: &FlushInput<'_>);

    /// Draws one command into the scratch target.
    fn draw(&mut self, screen: usize, state: &RenderState);

    /// Composites scratch onto the screen with `resolve`, then clears scratch.
    fn resolve(&mut self, screen: usize, resolve: &Resolve);

    /// Submits the recorded work.
    fn end_flush(&mut self);

    /// (Re)allocates the textures of layer slot `layer`.
    fn prepare_layer(&mut self, layer: u8, desc: &LayerTextureDesc);

    /// Uploads a full tileset atlas (indexed, one byte per pixel).
    fn upload_tileset(&mut self, width: u32, height: u32, pixels: &[u8]);

    fn create_surface(&mut self, id: SurfaceId, width: u32, height: u32, pixels: &[u8]);

    fn update_surface(&mut self, id: SurfaceId, width: u32, height: u32, pixels: &[u8]);

    fn destroy_surface(&mut self, id: SurfaceId);
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use crate::render::ink::ResolveKind;
    use crate::render::shader::DrawKind;

    /// One recorded backend call.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        BeginFlush { vertices: usize, indices: usize, layouts: Vec<u8>, commands: usize },
        Draw { screen: usize, kind: DrawKind, state: RenderState },
        Resolve { screen: usize, kind: ResolveKind },
        EndFlush,
        PrepareLayer { layer: u8, desc: LayerTextureDesc },
        UploadTileset { width: u32, height: u32 },
        CreateSurface { id: SurfaceId, width: u32, height: u32 },
        UpdateSurface { id: SurfaceId },
        DestroySurface { id: SurfaceId },
    }

    /// Backend double that records calls and snapshots flushed geometry.
    #[derive(Debug, Default)]
    pub struct RecordingBackend {
        pub calls: Vec<Call>,
        pub last_vertices: Vec<RenderVertex>,
        pub last_indices: Vec<u16>,
        pub last_staging: Vec<u8>,
    }

    impl RecordingBackend {
        pub fn resolves(&self) -> Vec<(usize, ResolveKind)> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Resolve { screen, kind } => Some((*screen, *kind)),
                    _ => None,
                })
                .collect()
        }

        pub fn draws(&self) -> Vec<&RenderState> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Draw { state, .. } => Some(state),
                    _ => None,
                })
                .collect()
        }

        pub fn flushes(&self) -> usize {
            self.calls.iter().filter(|c| matches!(c, Call::EndFlush)).count()
        }
    }

    impl CompositeBackend for RecordingBackend {
        fn begin_flush(&mut self, input: &FlushInput<'_>) {
            self.last_vertices = input.vertices.to_vec();
            self.last_indices = input.indices.to_vec();
            self.last_staging = input.staging.to_vec();
            self.calls.push(Call::BeginFlush {
                vertices: input.vertices.len(),
                indices: input.indices.len(),
                layouts: input.layouts.iter().map(|l| l.layer).collect(),
                commands: input.commands,
            });
        }

        fn draw(&mut self, screen: usize, state: &RenderState) {
            self.calls.push(Call::Draw {
                screen,
                kind: state.shader.kind(),
                state: state.clone(),
            });
        }

        fn resolve(&mut self, screen: usize, resolve: &Resolve) {
            self.calls.push(Call::Resolve {
                screen,
                kind: resolve.kind(),
            });
        }

        fn end_flush(&mut self) {
            self.calls.push(Call::EndFlush);
        }

        fn prepare_layer(&mut self, layer: u8, desc: &LayerTextureDesc) {
            self.calls.push(Call::PrepareLayer { layer, desc: *desc });
        }

        fn upload_tileset(&mut self, width: u32, height: u32, _pixels: &[u8]) {
            self.calls.push(Call::UploadTileset { width, height });
        }

        fn create_surface(&mut self, id: SurfaceId, width: u32, height: u32, _pixels: &[u8]) {
            self.calls.push(Call::CreateSurface { id, width, height });
        }

        fn update_surface(&mut self, id: SurfaceId, _width: u32, _height: u32, _pixels: &[u8]) {
            self.calls.push(Call::UpdateSurface { id });
        }

        fn destroy_surface(&mut self, id: SurfaceId) {
            self.calls.push(Call::DestroySurface { id });
        }
    }
}
