//! Textures owned by the wgpu backend.

use crate::config::{PALETTE_BANK_COUNT, PALETTE_BANK_SIZE, VideoSettings};
use crate::render::backend::LayerTextureDesc;
use crate::render::context::{ATLAS_HEIGHT, ATLAS_WIDTH};

/// Color format of screens, scratch and the screen copy.
pub(super) const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A texture and its default view.
pub(super) struct Target {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Target {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Sampled texture filled by buffer copies.
    pub fn data(device: &wgpu::Device, label: &str, size: (u32, u32), format: wgpu::TextureFormat) -> Self {
        Self::new(
            device,
            label,
            size,
            format,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        )
    }

    /// Writes tightly packed rows through the queue.
    pub fn write(&self, queue: &wgpu::Queue, bytes_per_texel: u32, (width, height): (u32, u32), data: &[u8]) {
        let width = width.min(self.texture.width());
        let height = height.min(self.texture.height());
        let needed = (width * bytes_per_texel * height) as usize;
        if data.len() < needed {
            log::warn!(
                "texture write of {}x{} needs {} bytes, got {}; skipped",
                width,
                height,
                needed,
                data.len()
            );
            return;
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data[..needed],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * bytes_per_texel),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Render targets and shared lookup textures.
pub(super) struct Targets {
    /// Persistent per-screen color, read by presentation.
    pub screens: Vec<Target>,
    /// Draw destination, cleared after every resolve.
    pub scratch: Target,
    /// Screen snapshot for destination-reading resolves.
    pub screen_copy: Target,

    pub atlas: Target,
    pub palette: Target,
    pub tint_lut: Target,
    /// Line banks of sprite draws (`1 × attribute height`).
    pub sprite_attributes: Target,
    /// 1×1 stand-in for unused integer bindings.
    pub dummy_uint: Target,
}

impl Targets {
    pub fn new(device: &wgpu::Device, settings: &VideoSettings) -> Self {
        let size = settings.texture_size();
        let render = wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::COPY_DST;

        let screens = (0..settings.active_screens())
            .map(|i| Target::new(device, &format!("scanline screen {i}"), size, TARGET_FORMAT, render))
            .collect();

        let (_, attribute_height) = settings.attribute_extent();

        Self {
            screens,
            scratch: Target::new(device, "scanline scratch", size, TARGET_FORMAT, render),
            screen_copy: Target::new(device, "scanline screen copy", size, TARGET_FORMAT, render),
            atlas: Target::data(device, "scanline tileset atlas", (ATLAS_WIDTH, ATLAS_HEIGHT), wgpu::TextureFormat::R8Uint),
            palette: Target::data(
                device,
                "scanline palette",
                (PALETTE_BANK_SIZE as u32, PALETTE_BANK_COUNT as u32),
                wgpu::TextureFormat::R16Uint,
            ),
            tint_lut: Target::data(device, "scanline tint lut", (256, 256), wgpu::TextureFormat::R16Uint),
            sprite_attributes: Target::data(
                device,
                "scanline sprite attributes",
                (1, attribute_height),
                wgpu::TextureFormat::Rgba32Float,
            ),
            dummy_uint: Target::data(device, "scanline dummy", (1, 1), wgpu::TextureFormat::R8Uint),
        }
    }
}

/// Layout and attribute textures of one layer slot.
pub(super) struct LayerTextures {
    pub desc: LayerTextureDesc,
    pub layout: Target,
    pub attributes: Target,
}

impl LayerTextures {
    pub fn new(device: &wgpu::Device, layer: u8, desc: LayerTextureDesc) -> Self {
        Self {
            layout: Target::data(
                device,
                &format!("scanline layer {layer} layout"),
                (desc.layout_width, desc.layout_height),
                wgpu::TextureFormat::R16Uint,
            ),
            attributes: Target::data(
                device,
                &format!("scanline layer {layer} attributes"),
                (desc.attribute_width, desc.attribute_height),
                wgpu::TextureFormat::Rgba32Float,
            ),
            desc,
        }
    }
}
