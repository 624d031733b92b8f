//! Frame-end presentation: finished screens scaled onto the window surface.

use crate::config::{VideoSettings, screen_dim};

use super::backend::WgpuBackend;
use super::common::{PresentUniforms, binding_size};

/// Window regions `[x, y, width, height]` for `count` screens.
///
/// One screen fills the window, two are stacked, three or four share
/// quadrants (row-major).
pub fn screen_layout(count: usize, width: u32, height: u32) -> Vec<[f32; 4]> {
    let (w, h) = (width as f32, height as f32);
    match count {
        0 => Vec::new(),
        1 => vec![[0.0, 0.0, w, h]],
        2 => vec![[0.0, 0.0, w, h / 2.0], [0.0, h / 2.0, w, h / 2.0]],
        n => (0..n.min(4))
            .map(|i| {
                let (col, row) = ((i % 2) as f32, (i / 2) as f32);
                [col * w / 2.0, row * h / 2.0, w / 2.0, h / 2.0]
            })
            .collect(),
    }
}

/// Draws every screen of a [`WgpuBackend`] into a window surface view.
#[derive(Default)]
pub struct ScreenPresenter {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_groups: Vec<wgpu::BindGroup>,
    uniform_buffer: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,

    /// Runtime override of the startup dim.
    dim: Option<f32>,
}

impl ScreenPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dims every presented screen to `max * percent` from the next frame on.
    pub fn set_dim(&mut self, max: f32, percent: f32) {
        self.dim = Some(screen_dim(max, percent));
    }

    /// Brightness the next frame presents at.
    pub fn dim(&self, settings: &VideoSettings) -> f32 {
        self.dim.unwrap_or_else(|| settings.screen_dim())
    }

    /// Records the presentation pass. `target` is cleared to black first.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        format: wgpu::TextureFormat,
        surface_size: (u32, u32),
        backend: &WgpuBackend,
    ) {
        self.ensure_pipeline(device, format);
        self.ensure_bindings(device, backend);
        self.write_uniform(queue, backend.settings());

        let Some(pipeline) = self.pipeline.as_ref() else { return };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scanline present pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(pipeline);
        let regions = screen_layout(self.bind_groups.len(), surface_size.0.max(1), surface_size.1.max(1));
        for (group, [x, y, w, h]) in self.bind_groups.iter().zip(regions) {
            if w < 1.0 || h < 1.0 {
                continue;
            }
            pass.set_viewport(x, y, w, h, 0.0, 1.0);
            pass.set_bind_group(0, group, &[]);
            pass.draw(0..3, 0..1);
        }
    }

    fn ensure_pipeline(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) {
        if self.pipeline_format == Some(format) && self.pipeline.is_some() {
            return;
        }

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scanline present shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/present.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scanline present bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: binding_size::<PresentUniforms>(),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scanline present pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scanline present pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_groups.clear();
    }

    fn ensure_bindings(&mut self, device: &wgpu::Device, backend: &WgpuBackend) {
        if self.bind_groups.len() == backend.screen_count() && self.uniform_buffer.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scanline present ubo"),
            size: std::mem::size_of::<PresentUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let filter = if backend.settings().linear_present {
            wgpu::FilterMode::Linear
        } else {
            wgpu::FilterMode::Nearest
        };
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("scanline present sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            ..Default::default()
        });

        self.bind_groups = (0..backend.screen_count())
            .filter_map(|i| backend.screen_view(i))
            .map(|view| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("scanline present bind group"),
                    layout: bgl,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: uniform_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                })
            })
            .collect();

        self.uniform_buffer = Some(uniform_buffer);
        self.sampler = Some(sampler);
    }

    fn write_uniform(&self, queue: &wgpu::Queue, settings: &VideoSettings) {
        let Some(ubo) = self.uniform_buffer.as_ref() else { return };
        let u = PresentUniforms::new(settings, self.dim(settings));
        queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_screen_fills_window() {
        assert_eq!(screen_layout(1, 800, 600), vec![[0.0, 0.0, 800.0, 600.0]]);
    }

    #[test]
    fn two_screens_stack_vertically() {
        assert_eq!(
            screen_layout(2, 800, 600),
            vec![[0.0, 0.0, 800.0, 300.0], [0.0, 300.0, 800.0, 300.0]]
        );
    }

    #[test]
    fn three_and_four_screens_use_quadrants() {
        let three = screen_layout(3, 800, 600);
        assert_eq!(three.len(), 3);
        assert_eq!(three[2], [0.0, 300.0, 400.0, 300.0]);

        let four = screen_layout(4, 800, 600);
        assert_eq!(four[3], [400.0, 300.0, 400.0, 300.0]);
        assert_eq!(screen_layout(9, 800, 600).len(), 4);
    }

    #[test]
    fn dim_override_replaces_startup_dim() {
        let settings = VideoSettings { dim_max: 0.5, ..Default::default() };
        let mut presenter = ScreenPresenter::new();
        assert_eq!(presenter.dim(&settings), 0.5);

        presenter.set_dim(0.8, 0.25);
        assert!((presenter.dim(&settings) - 0.2).abs() < 1e-6);
        presenter.set_dim(3.0, 1.0);
        assert_eq!(presenter.dim(&settings), 1.0);
    }
}
