//! Uniform layouts and blend states shared by the wgpu pipelines.

use bytemuck::{Pod, Zeroable};

use crate::config::VideoSettings;
use crate::render::ink::{Ink, Resolve, ResolveKind};
use crate::render::shader::DrawShader;

// ── blend ─────────────────────────────────────────────────────────────────

const OVER: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::SrcAlpha,
    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
    operation: wgpu::BlendOperation::Add,
};

const PREMULTIPLIED_OVER: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::One,
    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
    operation: wgpu::BlendOperation::Add,
};

const OVER_ALPHA: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::One,
    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
    operation: wgpu::BlendOperation::Add,
};

const KEEP_ALPHA: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::Zero,
    dst_factor: wgpu::BlendFactor::One,
    operation: wgpu::BlendOperation::Add,
};

/// Draw passes composite straight-alpha fragments into scratch, which
/// therefore holds premultiplied color.
pub(super) fn draw_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: OVER,
        alpha: OVER_ALPHA,
    }
}

/// Fixed-function part of each resolve equation.
///
/// Weighted kinds receive premultiplied scratch scaled by the ink weight.
///
/// Destination-reading kinds sample a copy of the screen and write their
/// final color, so blending is off for them.
pub(super) fn resolve_blend(kind: ResolveKind) -> Option<wgpu::BlendState> {
    match kind {
        ResolveKind::None | ResolveKind::Blend | ResolveKind::Alpha => Some(wgpu::BlendState {
            color: PREMULTIPLIED_OVER,
            alpha: OVER_ALPHA,
        }),
        ResolveKind::Add => Some(wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: KEEP_ALPHA,
        }),
        ResolveKind::Subtract => Some(wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::ReverseSubtract,
            },
            alpha: KEEP_ALPHA,
        }),
        ResolveKind::Tint | ResolveKind::Masked | ResolveKind::Unmasked | ResolveKind::Fill => None,
    }
}

// ── uniforms ──────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub(super) struct DrawUniforms {
    pub pixel_size: [f32; 2],
    pub layer_size: [f32; 2],
    pub params: [f32; 4],
}

impl DrawUniforms {
    pub fn for_shader(settings: &VideoSettings, shader: &DrawShader) -> Self {
        let mut u = Self {
            pixel_size: [settings.pix_width as f32, settings.pix_height as f32],
            ..Self::default()
        };
        match shader {
            DrawShader::Tile { layer_size, .. } => {
                u.layer_size = [layer_size[0] as f32, layer_size[1] as f32];
            }
            DrawShader::Circle { inner_radius } => u.params[0] = *inner_radius,
            _ => {}
        }
        u
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub(super) struct ResolveUniforms {
    pub params: [f32; 4],
    pub fill: [f32; 4],
    pub mask: [u32; 4],
}

impl ResolveUniforms {
    pub fn for_resolve(resolve: &Resolve) -> Self {
        let invert = matches!(resolve, Resolve::Ink(Ink::Unmasked(_)));
        let fill = match resolve {
            Resolve::Fill([r, g, b]) => [*r, *g, *b, 0.0],
            Resolve::Ink(_) => [0.0; 4],
        };

        Self {
            params: [resolve.weight(), if invert { 1.0 } else { 0.0 }, 0.0, 0.0],
            fill,
            mask: [resolve.mask565() as u32, 0, 0, 0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub(super) struct PresentUniforms {
    pub uv_scale: [f32; 2],
    pub dim: f32,
    pub _pad: f32, // 16-byte alignment
}

impl PresentUniforms {
    /// Samples the working area of a screen texture at brightness `dim`.
    pub fn new(settings: &VideoSettings, dim: f32) -> Self {
        let (tw, th) = settings.texture_size();
        Self {
            uv_scale: [settings.pix_width as f32 / tw as f32, settings.pix_height as f32 / th as f32],
            dim,
            _pad: 0.0,
        }
    }
}

/// Binding size of a uniform struct, for layouts and dynamic-offset bindings.
pub(super) fn binding_size<T>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}
