//! Shader compilation and pipeline creation.
//!
//! Every draw pipeline shares one pair of bind group layouts (uniforms with a
//! dynamic offset, then four textures); resolve pipelines share another.
//! Shaders that fail validation, and pipelines that fail to build around an
//! overridden shader, fall back to the pass-through program.

use std::collections::HashMap;

use crate::error::RenderError;
use crate::render::ink::ResolveKind;
use crate::render::shader::{DrawKind, FALLBACK_SHADER, ShaderLibrary, ShaderProvider, resolve_shader_name};
use crate::render::vertex::RenderVertex;

use super::common::{DrawUniforms, ResolveUniforms, binding_size, draw_blend, resolve_blend};
use super::targets::TARGET_FORMAT;

pub(super) struct Pipelines {
    pub draw_globals: wgpu::BindGroupLayout,
    pub draw_textures: wgpu::BindGroupLayout,
    pub resolve_globals: wgpu::BindGroupLayout,
    pub resolve_textures: wgpu::BindGroupLayout,

    draw: HashMap<DrawKind, wgpu::RenderPipeline>,
    resolve: HashMap<ResolveKind, wgpu::RenderPipeline>,
    substituted: Vec<&'static str>,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, provider: &dyn ShaderProvider) -> Result<Self, RenderError> {
        let library = ShaderLibrary::load(provider, |name, source| compile_wgsl(device, name, source))?;
        let mut substituted = library.substituted().to_vec();

        let draw_globals = uniform_layout::<DrawUniforms>(device, "scanline draw globals bgl");
        let resolve_globals = uniform_layout::<ResolveUniforms>(device, "scanline resolve globals bgl");

        let draw_textures = texture_layout(
            device,
            "scanline draw textures bgl",
            &[
                wgpu::TextureSampleType::Uint,                        // tex_a
                wgpu::TextureSampleType::Uint,                        // palette
                wgpu::TextureSampleType::Float { filterable: false }, // attribs
                wgpu::TextureSampleType::Uint,                        // tile_layout
            ],
        );
        let resolve_textures = texture_layout(
            device,
            "scanline resolve textures bgl",
            &[
                wgpu::TextureSampleType::Float { filterable: false }, // scratch
                wgpu::TextureSampleType::Float { filterable: false }, // screen_copy
                wgpu::TextureSampleType::Uint,                        // tint_lut
            ],
        );

        let draw_layout = pipeline_layout(device, "scanline draw pipeline layout", &[&draw_globals, &draw_textures]);
        let resolve_layout = pipeline_layout(
            device,
            "scanline resolve pipeline layout",
            &[&resolve_globals, &resolve_textures],
        );

        let fallback = library.get(FALLBACK_SHADER);

        let mut draw = HashMap::new();
        for kind in DrawKind::ALL {
            let name = kind.shader_name();
            let spec = PipelineSpec {
                layout: &draw_layout,
                blend: Some(draw_blend()),
            };
            let pipeline = build_with_fallback(device, &spec, name, library.get(name), fallback, &mut substituted)?;
            draw.insert(kind, pipeline);
        }

        let mut resolve = HashMap::new();
        for kind in ResolveKind::ALL {
            let name = resolve_shader_name(kind);
            let spec = PipelineSpec {
                layout: &resolve_layout,
                blend: resolve_blend(kind),
            };
            let pipeline = build_with_fallback(device, &spec, name, library.get(name), fallback, &mut substituted)?;
            resolve.insert(kind, pipeline);
        }

        if !substituted.is_empty() {
            log::warn!("{} shader(s) running on the pass-through fallback: {substituted:?}", substituted.len());
        }

        Ok(Self {
            draw_globals,
            draw_textures,
            resolve_globals,
            resolve_textures,
            draw,
            resolve,
            substituted,
        })
    }

    #[inline]
    pub fn draw(&self, kind: DrawKind) -> Option<&wgpu::RenderPipeline> {
        self.draw.get(&kind)
    }

    #[inline]
    pub fn resolve(&self, kind: ResolveKind) -> Option<&wgpu::RenderPipeline> {
        self.resolve.get(&kind)
    }

    #[inline]
    pub fn substituted(&self) -> &[&'static str] {
        &self.substituted
    }
}

// ── compilation ───────────────────────────────────────────────────────────

fn compile_wgsl(device: &wgpu::Device, name: &str, source: &str) -> Result<wgpu::ShaderModule, String> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(name),
        source: wgpu::ShaderSource::Wgsl(source.to_owned().into()),
    });

    match pollster::block_on(scope.pop()) {
        Some(err) => Err(err.to_string()),
        None => Ok(module),
    }
}

struct PipelineSpec<'a> {
    layout: &'a wgpu::PipelineLayout,
    blend: Option<wgpu::BlendState>,
}

fn build_with_fallback(
    device: &wgpu::Device,
    spec: &PipelineSpec<'_>,
    name: &'static str,
    module: &wgpu::ShaderModule,
    fallback: &wgpu::ShaderModule,
    substituted: &mut Vec<&'static str>,
) -> Result<wgpu::RenderPipeline, RenderError> {
    match create_pipeline(device, spec, name, module) {
        Ok(pipeline) => Ok(pipeline),
        Err(message) => {
            log::warn!("pipeline `{name}` failed to build: {message}; using pass-through fallback");
            if !substituted.contains(&name) {
                substituted.push(name);
            }
            create_pipeline(device, spec, name, fallback)
                .map_err(|message| RenderError::FallbackShader { name: FALLBACK_SHADER, message })
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    spec: &PipelineSpec<'_>,
    name: &str,
    module: &wgpu::ShaderModule,
) -> Result<wgpu::RenderPipeline, String> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(name),
        layout: Some(spec.layout),

        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[RenderVertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: TARGET_FORMAT,
                blend: spec.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    match pollster::block_on(scope.pop()) {
        Some(err) => Err(err.to_string()),
        None => Ok(pipeline),
    }
}

// ── layouts ───────────────────────────────────────────────────────────────

fn uniform_layout<T>(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: binding_size::<T>(),
            },
            count: None,
        }],
    })
}

fn texture_layout(device: &wgpu::Device, label: &str, samples: &[wgpu::TextureSampleType]) -> wgpu::BindGroupLayout {
    let entries: Vec<wgpu::BindGroupLayoutEntry> = samples
        .iter()
        .enumerate()
        .map(|(i, &sample_type)| wgpu::BindGroupLayoutEntry {
            binding: i as u32,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type,
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        })
        .collect();

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}

fn pipeline_layout(
    device: &wgpu::Device,
    label: &str,
    groups: &[&wgpu::BindGroupLayout],
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: groups,
        immediate_size: 0,
    })
}
