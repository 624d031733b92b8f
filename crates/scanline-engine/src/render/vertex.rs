use bytemuck::{Pod, Zeroable};

/// Vertex format shared by every draw and resolve pipeline.
///
/// `pos` is in screen pixels for sprite/rect/circle/text/3D geometry and in NDC
/// for tile quads and the reserved resolve quad; each shader knows which.
/// `color` is RGBA8 (R in the lowest byte). `tex` is normalised.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct RenderVertex {
    pub pos: [f32; 3],
    pub color: u32,
    pub tex: [f32; 2],
}

impl RenderVertex {
    #[inline]
    pub const fn new(x: f32, y: f32, color: u32, u: f32, v: f32) -> Self {
        Self {
            pos: [x, y, 1.0],
            color,
            tex: [u, v],
        }
    }

    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // pos
        1 => Unorm8x4,  // color
        2 => Float32x2  // tex
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RenderVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const WHITE: u32 = 0xFFFF_FFFF;

/// Two triangles covering NDC, stored in the reserved ring prefix.
pub const FULL_SCREEN_QUAD: [RenderVertex; 6] = [
    RenderVertex::new(-1.0, -1.0, WHITE, 0.0, 0.0),
    RenderVertex::new(-1.0, 1.0, WHITE, 0.0, 1.0),
    RenderVertex::new(1.0, 1.0, WHITE, 1.0, 1.0),
    RenderVertex::new(-1.0, -1.0, WHITE, 0.0, 0.0),
    RenderVertex::new(1.0, -1.0, WHITE, 1.0, 0.0),
    RenderVertex::new(1.0, 1.0, WHITE, 1.0, 1.0),
];

/// Index pattern of one quad whose vertices are ordered TL, TR, BL, BR.
pub const QUAD_INDEX_PATTERN: [u16; 6] = [0, 1, 2, 1, 3, 2];

/// Quad corners covering NDC, in quad vertex order.
pub fn ndc_quad() -> [RenderVertex; 4] {
    [
        RenderVertex::new(-1.0, -1.0, WHITE, 0.0, 0.0),
        RenderVertex::new(1.0, -1.0, WHITE, 1.0, 0.0),
        RenderVertex::new(-1.0, 1.0, WHITE, 0.0, 1.0),
        RenderVertex::new(1.0, 1.0, WHITE, 1.0, 1.0),
    ]
}

/// Axis-aligned pixel-space quad in quad vertex order.
pub fn pixel_quad(x: f32, y: f32, w: f32, h: f32, color: u32) -> [RenderVertex; 4] {
    [
        RenderVertex::new(x, y, color, 0.0, 0.0),
        RenderVertex::new(x + w, y, color, 1.0, 0.0),
        RenderVertex::new(x, y + h, color, 0.0, 1.0),
        RenderVertex::new(x + w, y + h, color, 1.0, 1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<RenderVertex>(), 24);
    }

    #[test]
    fn pixel_quad_corners_follow_index_pattern_order() {
        let q = pixel_quad(10.0, 20.0, 4.0, 2.0, 0);
        assert_eq!(q[0].pos[..2], [10.0, 20.0]);
        assert_eq!(q[1].pos[..2], [14.0, 20.0]);
        assert_eq!(q[2].pos[..2], [10.0, 22.0]);
        assert_eq!(q[3].pos[..2], [14.0, 22.0]);
    }
}
