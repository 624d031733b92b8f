use crate::config::{LAYER_COUNT, RESERVED_VERTICES, VideoSettings};
use crate::coords::Scissor;
use crate::error::RenderError;
use crate::paint::TintTable;
use crate::render::backend::{CompositeBackend, FlushInput, LayerTextureDesc, SurfaceId};
use crate::render::ink::{Ink, Resolve, ResolveKind};
use crate::render::queue::RenderState;
use crate::render::shader::{DrawShader, ShaderProvider};
use crate::render::staging::StagingSlice;

use super::common::{DrawUniforms, ResolveUniforms, binding_size};
use super::pipelines::Pipelines;
use super::targets::{LayerTextures, Target, Targets};

struct SurfaceEntry {
    target: Target,
    group: wgpu::BindGroup,
}

struct LayerEntry {
    textures: LayerTextures,
    group: wgpu::BindGroup,
}

/// wgpu implementation of [`CompositeBackend`].
///
/// One command encoder is recorded per flush and submitted by `end_flush`.
/// Each draw gets its own render pass so the per-draw attribute and palette
/// copies recorded before it land in order.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    settings: VideoSettings,

    pipelines: Pipelines,
    targets: Targets,
    layers: [Option<LayerEntry>; LAYER_COUNT],
    surfaces: Vec<Option<SurfaceEntry>>,

    plain_group: wgpu::BindGroup,
    resolve_group: wgpu::BindGroup,

    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    staging_buffer: Option<wgpu::Buffer>,

    uniform_buffer: Option<wgpu::Buffer>,
    draw_globals: Option<wgpu::BindGroup>,
    resolve_globals: Option<wgpu::BindGroup>,
    uniform_stride: u32,
    uniforms: Vec<u8>,

    encoder: Option<wgpu::CommandEncoder>,
    tint: Option<TintTable>,

    warned_missing_layer: bool,
    warned_uniform_overflow: bool,
}

impl WgpuBackend {
    /// Creates targets and compiles every pipeline from `shaders`.
    ///
    /// Fails only when the built-in fallback shader cannot be used.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        settings: &VideoSettings,
        shaders: &dyn ShaderProvider,
    ) -> Result<Self, RenderError> {
        let pipelines = Pipelines::new(device, shaders)?;
        let targets = Targets::new(device, settings);

        let plain_group = draw_texture_group(
            device,
            &pipelines,
            "scanline plain textures",
            &targets.dummy_uint.view,
            &targets,
            &targets.sprite_attributes.view,
            &targets.dummy_uint.view,
        );
        let resolve_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scanline resolve textures"),
            layout: &pipelines.resolve_textures,
            entries: &[
                texture_entry(0, &targets.scratch.view),
                texture_entry(1, &targets.screen_copy.view),
                texture_entry(2, &targets.tint_lut.view),
            ],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let uniform_stride = align_up(std::mem::size_of::<ResolveUniforms>() as u32, alignment);

        log::debug!(
            "wgpu backend: {:?} targets, {} screen(s), uniform stride {}",
            settings.texture_size(),
            targets.screens.len(),
            uniform_stride
        );

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            settings: settings.clone(),
            pipelines,
            targets,
            layers: Default::default(),
            surfaces: Vec::new(),
            plain_group,
            resolve_group,
            vertex_buffer: None,
            index_buffer: None,
            staging_buffer: None,
            uniform_buffer: None,
            draw_globals: None,
            resolve_globals: None,
            uniform_stride,
            uniforms: Vec::new(),
            encoder: None,
            tint: None,
            warned_missing_layer: false,
            warned_uniform_overflow: false,
        })
    }

    /// Finished color of `screen`; valid after the frame's last flush.
    #[inline]
    pub fn screen_view(&self, screen: usize) -> Option<&wgpu::TextureView> {
        self.targets.screens.get(screen).map(|t| &t.view)
    }

    #[inline]
    pub fn screen_count(&self) -> usize {
        self.targets.screens.len()
    }

    #[inline]
    pub fn settings(&self) -> &VideoSettings {
        &self.settings
    }

    /// Shader names currently drawn with the pass-through fallback.
    #[inline]
    pub fn substituted_shaders(&self) -> &[&'static str] {
        self.pipelines.substituted()
    }

    // ── per-flush buffers ─────────────────────────────────────────────────

    fn ensure_uniform_capacity(&mut self, slots: usize) {
        let required = (slots.max(1) as u64) * self.uniform_stride as u64;
        let recreated = ensure_buffer(
            &self.device,
            &mut self.uniform_buffer,
            required,
            "scanline uniforms",
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        if !recreated && self.draw_globals.is_some() && self.resolve_globals.is_some() {
            return;
        }
        let Some(buffer) = self.uniform_buffer.as_ref() else { return };

        let globals = |layout: &wgpu::BindGroupLayout, label: &str, size| {
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer,
                        offset: 0,
                        size,
                    }),
                }],
            })
        };
        self.draw_globals = Some(globals(
            &self.pipelines.draw_globals,
            "scanline draw globals",
            binding_size::<DrawUniforms>(),
        ));
        self.resolve_globals = Some(globals(
            &self.pipelines.resolve_globals,
            "scanline resolve globals",
            binding_size::<ResolveUniforms>(),
        ));
    }

    /// Appends one uniform slot and returns its dynamic offset.
    fn push_uniform(&mut self, bytes: &[u8]) -> Option<u32> {
        let offset = self.uniforms.len();
        let capacity = self.uniform_buffer.as_ref().map_or(0, |b| b.size() as usize);
        if offset + self.uniform_stride as usize > capacity {
            if !self.warned_uniform_overflow {
                self.warned_uniform_overflow = true;
                log::error!("uniform slots exhausted within a flush; command skipped");
            }
            return None;
        }

        self.uniforms.resize(offset + self.uniform_stride as usize, 0);
        self.uniforms[offset..offset + bytes.len()].copy_from_slice(bytes);
        Some(offset as u32)
    }

    fn copy_staged(&self, encoder: &mut wgpu::CommandEncoder, slice: StagingSlice, texture: &wgpu::Texture) {
        let Some(staging) = self.staging_buffer.as_ref() else { return };
        let width = slice.width.min(texture.width());
        let height = slice.height.min(texture.height());
        if width == 0 || height == 0 {
            return;
        }

        encoder.copy_buffer_to_texture(
            wgpu::TexelCopyBufferInfo {
                buffer: staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: slice.offset,
                    bytes_per_row: Some(slice.bytes_per_row),
                    rows_per_image: Some(slice.height),
                },
            },
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn upload_tint(&mut self, table: &TintTable) {
        if self.tint.as_ref().is_some_and(|t| t.same_table(table)) {
            return;
        }
        self.targets.tint_lut.write(&self.queue, 2, (256, 256), table.as_bytes());
        self.tint = Some(table.clone());
    }

    fn draw_group(&self, state: &RenderState) -> Option<&wgpu::BindGroup> {
        match &state.shader {
            DrawShader::Tile { layer, .. } => self.layers.get(*layer as usize).and_then(Option::as_ref).map(|e| &e.group),
            DrawShader::Sprite { .. } | DrawShader::DevText => state
                .texture
                .and_then(|id| self.surfaces.get(id.index()))
                .and_then(Option::as_ref)
                .map(|e| &e.group),
            DrawShader::Rect | DrawShader::Circle { .. } => Some(&self.plain_group),
        }
    }

    fn record_draw(&self, encoder: &mut wgpu::CommandEncoder, state: &RenderState, scissor: Scissor, offset: u32) {
        match &state.shader {
            DrawShader::Tile { layer, attributes, palette, .. } => {
                if let Some(entry) = self.layers.get(*layer as usize).and_then(Option::as_ref) {
                    self.copy_staged(encoder, *attributes, &entry.textures.attributes.texture);
                }
                self.copy_staged(encoder, *palette, &self.targets.palette.texture);
            }
            DrawShader::Sprite { attributes, palette } => {
                self.copy_staged(encoder, *attributes, &self.targets.sprite_attributes.texture);
                self.copy_staged(encoder, *palette, &self.targets.palette.texture);
            }
            DrawShader::Rect | DrawShader::Circle { .. } | DrawShader::DevText => {}
        }

        let Some(group) = self.draw_group(state) else { return };
        let Some(pipeline) = self.pipelines.draw(state.shader.kind()) else { return };
        let Some(globals) = self.draw_globals.as_ref() else { return };
        let Some(vertices) = self.vertex_buffer.as_ref() else { return };
        let Some(indices) = self.index_buffer.as_ref() else { return };

        let mut pass = Self::render_pass(encoder, "scanline draw pass", &self.targets.scratch.view, wgpu::LoadOp::Load);
        self.set_working_viewport(&mut pass);
        let Scissor { x, y, width, height } = scissor;
        pass.set_scissor_rect(x, y, width, height);

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, globals, &[offset]);
        pass.set_bind_group(1, group, &[]);
        pass.set_vertex_buffer(0, vertices.slice(..));
        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint16);

        let first = state.indices.offset();
        pass.draw_indexed(first..first + state.indices.count(), state.vertices.offset() as i32, 0..1);
    }

    fn record_resolve(&self, encoder: &mut wgpu::CommandEncoder, screen: usize, kind: ResolveKind, offset: u32) {
        if let Some(target) = self.targets.screens.get(screen) {
            if kind.reads_destination() {
                encoder.copy_texture_to_texture(
                    target.texture.as_image_copy(),
                    self.targets.screen_copy.texture.as_image_copy(),
                    target.texture.size(),
                );
            }

            if let (Some(pipeline), Some(globals), Some(vertices)) = (
                self.pipelines.resolve(kind),
                self.resolve_globals.as_ref(),
                self.vertex_buffer.as_ref(),
            ) {
                let mut pass = Self::render_pass(encoder, "scanline resolve pass", &target.view, wgpu::LoadOp::Load);
                self.set_working_viewport(&mut pass);
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, globals, &[offset]);
                pass.set_bind_group(1, &self.resolve_group, &[]);
                pass.set_vertex_buffer(0, vertices.slice(..));
                pass.draw(0..RESERVED_VERTICES, 0..1);
            }
        }

        drop(Self::render_pass(
            encoder,
            "scanline scratch clear",
            &self.targets.scratch.view,
            wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
        ));
    }

    fn render_pass<'e>(
        encoder: &'e mut wgpu::CommandEncoder,
        label: &str,
        view: &wgpu::TextureView,
        load: wgpu::LoadOp<wgpu::Color>,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }

    fn set_working_viewport(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_viewport(
            0.0,
            0.0,
            self.settings.pix_width as f32,
            self.settings.pix_height as f32,
            0.0,
            1.0,
        );
    }
}

impl CompositeBackend for WgpuBackend {
    fn begin_flush(&mut self, input: &FlushInput<'_>) {
        let vertex_bytes: &[u8] = bytemuck::cast_slice(input.vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(input.indices);

        ensure_buffer(
            &self.device,
            &mut self.vertex_buffer,
            vertex_bytes.len() as u64,
            "scanline ring vertices",
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        );
        ensure_buffer(
            &self.device,
            &mut self.index_buffer,
            index_bytes.len() as u64,
            "scanline ring indices",
            wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        );
        ensure_buffer(
            &self.device,
            &mut self.staging_buffer,
            input.staging.len() as u64,
            "scanline staging",
            wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
        );
        self.ensure_uniform_capacity(input.commands * 2);

        if let Some(buffer) = self.vertex_buffer.as_ref() {
            write_padded(&self.queue, buffer, vertex_bytes);
        }
        if let Some(buffer) = self.index_buffer.as_ref() {
            write_padded(&self.queue, buffer, index_bytes);
        }
        if let Some(buffer) = self.staging_buffer.as_ref() {
            write_padded(&self.queue, buffer, input.staging);
        }
        self.uniforms.clear();

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scanline flush encoder"),
        });

        for upload in input.layouts {
            if let Some(entry) = self.layers.get(upload.layer as usize).and_then(Option::as_ref) {
                self.copy_staged(&mut encoder, upload.slice, &entry.textures.layout.texture);
            }
        }

        self.encoder = Some(encoder);
    }

    fn draw(&mut self, _screen: usize, state: &RenderState) {
        let Some(scissor) = state.clip.fit(self.settings.pix_width, self.settings.pix_height) else {
            return;
        };
        if self.draw_group(state).is_none() {
            if matches!(state.shader, DrawShader::Tile { .. }) && !self.warned_missing_layer {
                self.warned_missing_layer = true;
                log::warn!("tile draw without layer textures; skipped");
            }
            return;
        }

        let uniforms = DrawUniforms::for_shader(&self.settings, &state.shader);
        let Some(offset) = self.push_uniform(bytemuck::bytes_of(&uniforms)) else { return };
        let Some(mut encoder) = self.encoder.take() else { return };

        self.record_draw(&mut encoder, state, scissor, offset);
        self.encoder = Some(encoder);
    }

    fn resolve(&mut self, screen: usize, resolve: &Resolve) {
        if let Resolve::Ink(Ink::Tint(table)) = resolve {
            self.upload_tint(table);
        }

        let uniforms = ResolveUniforms::for_resolve(resolve);
        let Some(offset) = self.push_uniform(bytemuck::bytes_of(&uniforms)) else { return };
        let Some(mut encoder) = self.encoder.take() else { return };

        self.record_resolve(&mut encoder, screen, resolve.kind(), offset);
        self.encoder = Some(encoder);
    }

    fn end_flush(&mut self) {
        let Some(encoder) = self.encoder.take() else { return };

        if let Some(buffer) = self.uniform_buffer.as_ref() {
            write_padded(&self.queue, buffer, &self.uniforms);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn prepare_layer(&mut self, layer: u8, desc: &LayerTextureDesc) {
        let Some(slot) = self.layers.get_mut(layer as usize) else { return };

        let max = self.device.limits().max_texture_dimension_2d;
        let dims = [desc.layout_width, desc.layout_height, desc.attribute_width, desc.attribute_height];
        if dims.iter().any(|&d| d > max) {
            log::warn!("layer {layer}: textures {desc:?} exceed the device limit of {max}; layer disabled");
            *slot = None;
            return;
        }

        if slot.as_ref().is_some_and(|e| e.textures.desc == *desc) {
            return;
        }

        let textures = LayerTextures::new(&self.device, layer, *desc);
        let group = draw_texture_group(
            &self.device,
            &self.pipelines,
            "scanline layer textures",
            &self.targets.atlas.view,
            &self.targets,
            &textures.attributes.view,
            &textures.layout.view,
        );
        self.layers[layer as usize] = Some(LayerEntry { textures, group });
    }

    fn upload_tileset(&mut self, width: u32, height: u32, pixels: &[u8]) {
        self.targets.atlas.write(&self.queue, 1, (width, height), pixels);
    }

    fn create_surface(&mut self, id: SurfaceId, width: u32, height: u32, pixels: &[u8]) {
        let target = Target::data(
            &self.device,
            &format!("scanline surface {}", id.index()),
            (width, height),
            wgpu::TextureFormat::R8Uint,
        );
        target.write(&self.queue, 1, (width, height), pixels);

        let group = draw_texture_group(
            &self.device,
            &self.pipelines,
            "scanline surface textures",
            &target.view,
            &self.targets,
            &self.targets.sprite_attributes.view,
            &self.targets.dummy_uint.view,
        );

        if self.surfaces.len() <= id.index() {
            self.surfaces.resize_with(id.index() + 1, || None);
        }
        self.surfaces[id.index()] = Some(SurfaceEntry { target, group });
    }

    fn update_surface(&mut self, id: SurfaceId, width: u32, height: u32, pixels: &[u8]) {
        let same_size = self
            .surfaces
            .get(id.index())
            .and_then(Option::as_ref)
            .is_some_and(|e| e.target.texture.width() == width && e.target.texture.height() == height);

        match self.surfaces.get(id.index()).and_then(Option::as_ref) {
            Some(entry) if same_size => entry.target.write(&self.queue, 1, (width, height), pixels),
            _ => self.create_surface(id, width, height, pixels),
        }
    }

    fn destroy_surface(&mut self, id: SurfaceId) {
        if let Some(slot) = self.surfaces.get_mut(id.index()) {
            *slot = None;
        }
    }
}

// ── helpers ───────────────────────────────────────────────────────────────

fn texture_entry(binding: u32, view: &wgpu::TextureView) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::TextureView(view),
    }
}

fn draw_texture_group(
    device: &wgpu::Device,
    pipelines: &Pipelines,
    label: &str,
    source: &wgpu::TextureView,
    targets: &Targets,
    attributes: &wgpu::TextureView,
    layout: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: &pipelines.draw_textures,
        entries: &[
            texture_entry(0, source),
            texture_entry(1, &targets.palette.view),
            texture_entry(2, attributes),
            texture_entry(3, layout),
        ],
    })
}

/// Grows `buffer` to hold `required` bytes. Returns whether it was recreated.
fn ensure_buffer(
    device: &wgpu::Device,
    buffer: &mut Option<wgpu::Buffer>,
    required: u64,
    label: &str,
    usage: wgpu::BufferUsages,
) -> bool {
    if buffer.as_ref().is_some_and(|b| b.size() >= required) {
        return false;
    }

    let size = required.max(64).next_power_of_two();
    *buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage,
        mapped_at_creation: false,
    }));
    true
}

/// Queue writes must be a multiple of `COPY_BUFFER_ALIGNMENT` bytes.
fn write_padded(queue: &wgpu::Queue, buffer: &wgpu::Buffer, bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }
    let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
    if bytes.len() % align == 0 {
        queue.write_buffer(buffer, 0, bytes);
    } else {
        let mut padded = bytes.to_vec();
        padded.resize(bytes.len().next_multiple_of(align), 0);
        queue.write_buffer(buffer, 0, &padded);
    }
}

fn align_up(v: u32, align: u32) -> u32 {
    v.div_ceil(align) * align
}
