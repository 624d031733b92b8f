//! Deformation encoder: scanline scroll state → attribute images.
//!
//! Each record is `[x, y, line_bank, 0]`. `x`/`y` are the layer position as a
//! fraction of the layer's pixel extent (16.16 position divided by
//! `2^(20 + shift)`), so the tile shader only multiplies by the extent.
//!
//! Clip handling: the scanline cursor starts at the first clipped row (or
//! column) and only advances inside the clip, so rows above the clip repeat
//! the first visible scanline and rows below repeat the last one. Cursors that
//! would run past the caller's arrays clamp to the last element.
//!
//! Encoding is pure: identical inputs give bit-identical images.

use crate::config::SCROLL_FRACTION_BITS;
use crate::coords::{ClipBounds, FixedVec2};
use crate::scene::ScanlineInfo;

/// A `width × height` image of `RGBA32F` attribute records, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeImage {
    pub width: u32,
    pub height: u32,
    pub records: Vec<[f32; 4]>,
}

impl AttributeImage {
    fn with_capacity(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            records: Vec::with_capacity(width as usize * height as usize),
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [f32; 4] {
        self.records[(y * self.width + x) as usize]
    }
}

/// Everything an encoder reads for one layer draw.
#[derive(Debug, Copy, Clone)]
pub struct DeformInput<'a> {
    /// Working resolution.
    pub width: u32,
    pub height: u32,

    /// Target screen height (bounds the line-buffer walk of vertical layers).
    pub screen_height: u32,

    pub clip: ClipBounds,
    pub width_shift: u8,
    pub height_shift: u8,
    pub scanlines: &'a [ScanlineInfo],
    pub line_buffer: &'a [u8],
}

impl DeformInput<'_> {
    #[inline]
    fn record(&self, position: FixedVec2, bank: u8) -> [f32; 4] {
        [
            normalize(position.x, self.width_shift),
            normalize(position.y, self.height_shift),
            bank as f32,
            0.0,
        ]
    }
}

#[inline]
fn normalize(v: i32, shift: u8) -> f32 {
    v as f32 / (1u64 << (SCROLL_FRACTION_BITS + shift as u32)) as f32
}

#[inline]
fn at<T: Copy + Default>(items: &[T], i: usize) -> T {
    items.get(i).or(items.last()).copied().unwrap_or_default()
}

/// One record per row (`1 × height`).
pub fn encode_hscroll(input: &DeformInput<'_>) -> AttributeImage {
    let mut out = AttributeImage::with_capacity(1, input.height);
    let mut line = input.clip.y1 as usize;

    for cy in 0..input.height {
        let s = at(input.scanlines, line);
        out.records.push(input.record(s.position, at(input.line_buffer, line)));

        if input.clip.contains_y(cy) {
            line += 1;
        }
    }
    out
}

/// One record per column (`width × 1`).
///
/// The line bank cursor walks the line buffer from row 0 while the column
/// index is inside the screen height, independently of the clip.
pub fn encode_vscroll(input: &DeformInput<'_>) -> AttributeImage {
    let mut out = AttributeImage::with_capacity(input.width, 1);
    let mut column = input.clip.x1 as usize;
    let mut bank = 0usize;

    for cx in 0..input.width {
        let s = at(input.scanlines, column);
        out.records.push(input.record(s.position, at(input.line_buffer, bank)));

        if input.clip.contains_x(cx) {
            column += 1;
        }
        if cx < input.screen_height {
            bank += 1;
        }
    }
    out
}

/// One record per pixel (`width × height`).
///
/// Within a row the scanline's `deform` step accumulates into the position
/// for every column inside the horizontal clip.
pub fn encode_rotozoom(input: &DeformInput<'_>) -> AttributeImage {
    let mut out = AttributeImage::with_capacity(input.width, input.height);
    let mut line = input.clip.y1 as usize;

    for cy in 0..input.height {
        let s = at(input.scanlines, line);
        let bank = at(input.line_buffer, line);
        let mut pos = s.position;

        for cx in 0..input.width {
            out.records.push(input.record(pos, bank));
            if input.clip.contains_x(cx) {
                pos += s.deform;
            }
        }

        if input.clip.contains_y(cy) {
            line += 1;
        }
    }
    out
}

/// Line banks only (`1 × height`), for sprite draws.
pub fn encode_line_banks(height: u32, clip: ClipBounds, line_buffer: &[u8]) -> AttributeImage {
    let mut out = AttributeImage::with_capacity(1, height);
    let mut line = clip.y1 as usize;

    for cy in 0..height {
        out.records.push([0.0, 0.0, at(line_buffer, line) as f32, 0.0]);
        if clip.contains_y(cy) {
            line += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(scanlines: &'a [ScanlineInfo], banks: &'a [u8], clip: ClipBounds) -> DeformInput<'a> {
        DeformInput {
            width: 8,
            height: 6,
            screen_height: 6,
            clip,
            width_shift: 4,
            height_shift: 4,
            scanlines,
            line_buffer: banks,
        }
    }

    fn line(x_px: i32, y_px: i32) -> ScanlineInfo {
        ScanlineInfo::new(FixedVec2::from_pixels(x_px, y_px), FixedVec2::default())
    }

    // ── hscroll ───────────────────────────────────────────────────────────

    #[test]
    fn hscroll_normalizes_by_layer_extent() {
        // 16 tiles of 16 px = 256 px; x = 64 px is a quarter of the layer.
        let lines = vec![line(64, 128); 6];
        let img = encode_hscroll(&input(&lines, &[0; 6], ClipBounds::full(8, 6)));

        assert_eq!((img.width, img.height), (1, 6));
        assert_eq!(img.get(0, 0), [0.25, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn hscroll_repeats_lines_outside_clip() {
        let lines: Vec<_> = (0..6).map(|i| line(i * 16, 0)).collect();
        let banks = [0, 1, 2, 3, 4, 5];
        let img = encode_hscroll(&input(&lines, &banks, ClipBounds::new(0, 2, 8, 4)));

        let xs: Vec<f32> = img.records.iter().map(|r| r[0] * 256.0).collect();
        // rows 0..2 repeat line 2; rows 2,3 advance; rows 4,5 hold line 4
        assert_eq!(xs, vec![32.0, 32.0, 32.0, 48.0, 64.0, 64.0]);

        let bs: Vec<f32> = img.records.iter().map(|r| r[2]).collect();
        assert_eq!(bs, vec![2.0, 2.0, 2.0, 3.0, 4.0, 4.0]);
    }

    #[test]
    fn hscroll_tolerates_short_inputs() {
        let lines = vec![line(16, 0)];
        let img = encode_hscroll(&input(&lines, &[], ClipBounds::full(8, 6)));
        assert_eq!(img.records.len(), 6);
        assert!(img.records.iter().all(|r| r[0] == 16.0 / 256.0 && r[2] == 0.0));

        let img = encode_hscroll(&input(&[], &[], ClipBounds::full(8, 6)));
        assert!(img.records.iter().all(|r| *r == [0.0; 4]));
    }

    #[test]
    fn encoding_is_bit_identical_on_repeat() {
        let lines: Vec<_> = (0..6)
            .map(|i| ScanlineInfo::new(FixedVec2::new(i * 12345, -i * 777), FixedVec2::new(3, 5)))
            .collect();
        let banks = [1, 2, 3, 4, 5, 6];
        let i = input(&lines, &banks, ClipBounds::new(1, 1, 7, 5));

        let bits = |img: AttributeImage| img.as_bytes().to_vec();
        assert_eq!(bits(encode_hscroll(&i)), bits(encode_hscroll(&i)));
        assert_eq!(bits(encode_vscroll(&i)), bits(encode_vscroll(&i)));
        assert_eq!(bits(encode_rotozoom(&i)), bits(encode_rotozoom(&i)));
    }

    // ── vscroll ───────────────────────────────────────────────────────────

    #[test]
    fn vscroll_walks_columns_from_clip_start() {
        let cols: Vec<_> = (0..8).map(|i| line(i, 0)).collect();
        let img = encode_vscroll(&input(&cols, &[0; 8], ClipBounds::new(2, 0, 5, 6)));

        assert_eq!((img.width, img.height), (8, 1));
        let xs: Vec<f32> = img.records.iter().map(|r| r[0] * 256.0).collect();
        assert_eq!(xs, vec![2.0, 2.0, 2.0, 3.0, 4.0, 5.0, 5.0, 5.0]);
    }

    #[test]
    fn vscroll_line_banks_stop_at_screen_height() {
        let cols = vec![line(0, 0); 8];
        let banks = [0, 1, 2, 3, 4, 5, 6, 7];
        let mut i = input(&cols, &banks, ClipBounds::full(8, 6));
        i.screen_height = 3;

        let bs: Vec<f32> = encode_vscroll(&i).records.iter().map(|r| r[2]).collect();
        assert_eq!(bs, vec![0.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0, 3.0]);
    }

    // ── rotozoom ──────────────────────────────────────────────────────────

    #[test]
    fn rotozoom_accumulates_deform_inside_clip_only() {
        let s = ScanlineInfo::new(FixedVec2::from_pixels(0, 0), FixedVec2::from_pixels(1, 2));
        let lines = vec![s; 6];
        let img = encode_rotozoom(&input(&lines, &[0; 6], ClipBounds::new(2, 0, 4, 6)));

        assert_eq!((img.width, img.height), (8, 6));
        let row: Vec<(f32, f32)> = (0..8)
            .map(|x| {
                let r = img.get(x, 0);
                (r[0] * 256.0, r[1] * 256.0)
            })
            .collect();
        // steps applied after columns 2 and 3 only
        assert_eq!(row[0], (0.0, 0.0));
        assert_eq!(row[2], (0.0, 0.0));
        assert_eq!(row[3], (1.0, 2.0));
        assert_eq!(row[4], (2.0, 4.0));
        assert_eq!(row[7], (2.0, 4.0));
    }

    // ── sprite line banks ─────────────────────────────────────────────────

    #[test]
    fn line_banks_only_fill_bank_channel() {
        let img = encode_line_banks(4, ClipBounds::new(0, 1, 8, 3), &[7, 8, 9, 10]);
        let bs: Vec<f32> = img.records.iter().map(|r| r[2]).collect();
        assert_eq!(bs, vec![8.0, 8.0, 9.0, 10.0]);
        assert!(img.records.iter().all(|r| r[0] == 0.0 && r[1] == 0.0));
    }
}
