/// Straight-alpha RGBA color with `f32` channels in `[0, 1]`.
///
/// Invariant:
/// - channels are not premultiplied; ink equations apply alpha themselves.
///
/// Rationale:
/// - the legacy ink modes are defined on straight color (`src·α + dst·(1−α)`),
///   so keeping alpha separate avoids round trips in the resolve shaders.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a packed `0xRRGGBB` word.
    #[inline]
    pub fn from_rgb888(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as f32 / 255.0,
            g: ((rgb >> 8) & 0xFF) as f32 / 255.0,
            b: (rgb & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Packs to `0xRRGGBB`, rounding to nearest and clamping each channel.
    #[inline]
    pub fn to_rgb888(self) -> u32 {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (q(self.r) << 16) | (q(self.g) << 8) | q(self.b)
    }

    /// Opaque color from an RGB565 palette entry (5/6/5 bits expanded by bit replication).
    #[inline]
    pub fn from_rgb565(c: u16) -> Self {
        Self::from_rgb888(rgb565_to_rgb888(c))
    }

    #[inline]
    pub fn to_rgb565(self) -> u16 {
        rgb888_to_rgb565(self.to_rgb888())
    }

    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    #[inline]
    pub fn rgb(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Packs `0xRRGGBB` into RGB565 by truncation.
#[inline]
pub fn rgb888_to_rgb565(rgb: u32) -> u16 {
    let r = (rgb >> 19) & 0x1F;
    let g = (rgb >> 10) & 0x3F;
    let b = (rgb >> 3) & 0x1F;
    ((r << 11) | (g << 5) | b) as u16
}

/// Expands RGB565 to `0xRRGGBB`, replicating high bits into the low bits.
#[inline]
pub fn rgb565_to_rgb888(c: u16) -> u32 {
    let c = c as u32;
    let r5 = (c >> 11) & 0x1F;
    let g6 = (c >> 5) & 0x3F;
    let b5 = c & 0x1F;
    let r = (r5 << 3) | (r5 >> 2);
    let g = (g6 << 2) | (g6 >> 4);
    let b = (b5 << 3) | (b5 >> 2);
    (r << 16) | (g << 8) | b
}

/// Packs a `0xRRGGBB` color and alpha byte into the vertex color word.
///
/// Byte order in memory is R, G, B, A so the word can be read as `Unorm8x4`.
#[inline]
pub fn vertex_color(rgb: u32, alpha: u8) -> u32 {
    let r = (rgb >> 16) & 0xFF;
    let g = (rgb >> 8) & 0xFF;
    let b = rgb & 0xFF;
    r | (g << 8) | (b << 16) | ((alpha as u32) << 24)
}
