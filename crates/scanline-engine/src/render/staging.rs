//! Byte arena for per-flush texture uploads.
//!
//! Draws snapshot their attribute images and palettes here at queue time.
//! The backend uploads the whole arena once per flush and copies each slice
//! into its texture right before the draw that uses it, so later draws never
//! overwrite data an earlier queued draw still needs.

/// Row alignment required for buffer-to-texture copies.
pub const ROW_ALIGNMENT: u32 = 256;

/// A 2D image stored in the arena.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct StagingSlice {
    pub offset: u64,
    pub bytes_per_row: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Default)]
pub struct StagingArena {
    bytes: Vec<u8>,
}

impl StagingArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies a tightly packed `width × height` image with `texel_size`-byte
    /// texels, padding rows to [`ROW_ALIGNMENT`].
    ///
    /// `data` shorter than the image is zero-extended.
    pub fn push_image(&mut self, width: u32, height: u32, texel_size: u32, data: &[u8]) -> StagingSlice {
        let row = (width * texel_size) as usize;
        let bytes_per_row = align_up(width * texel_size, ROW_ALIGNMENT);

        let offset = align_up(self.bytes.len() as u32, ROW_ALIGNMENT) as usize;
        self.bytes.resize(offset + bytes_per_row as usize * height as usize, 0);

        for y in 0..height as usize {
            let src_start = y * row;
            if src_start >= data.len() {
                break;
            }
            let src = &data[src_start..(src_start + row).min(data.len())];
            let dst = offset + y * bytes_per_row as usize;
            self.bytes[dst..dst + src.len()].copy_from_slice(src);
        }

        StagingSlice {
            offset: offset as u64,
            bytes_per_row,
            width,
            height,
        }
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Forgets all slices. Capacity is kept.
    #[inline]
    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    /// Reads one row of a slice back (tests and diagnostics).
    pub fn row(&self, slice: StagingSlice, y: u32) -> &[u8] {
        let start = slice.offset as usize + (y * slice.bytes_per_row) as usize;
        &self.bytes[start..start + slice.bytes_per_row as usize]
    }
}

#[inline]
pub fn align_up(v: u32, align: u32) -> u32 {
    v.div_ceil(align) * align
}
