use std::sync::Arc;

use crate::config::{PALETTE_BANK_COUNT, PALETTE_BANK_SIZE};

use super::color::{rgb565_to_rgb888, rgb888_to_rgb565};

/// Indexed-color palette banks (RGB565 entries).
///
/// Tile and sprite shaders pick a bank per scanline through the line buffer,
/// then look up the pixel index in that bank. Index 0 is always transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteBanks {
    entries: Vec<u16>,
}

impl Default for PaletteBanks {
    fn default() -> Self {
        Self {
            entries: vec![0; PALETTE_BANK_COUNT * PALETTE_BANK_SIZE],
        }
    }
}

impl PaletteBanks {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn bank(&self, bank: usize) -> &[u16] {
        let start = bank * PALETTE_BANK_SIZE;
        &self.entries[start..start + PALETTE_BANK_SIZE]
    }

    #[inline]
    pub fn bank_mut(&mut self, bank: usize) -> &mut [u16] {
        let start = bank * PALETTE_BANK_SIZE;
        &mut self.entries[start..start + PALETTE_BANK_SIZE]
    }

    #[inline]
    pub fn get(&self, bank: usize, index: u8) -> u16 {
        self.bank(bank)[index as usize]
    }

    /// Sets one entry from a `0xRRGGBB` color.
    #[inline]
    pub fn set_rgb888(&mut self, bank: usize, index: u8, rgb: u32) {
        self.bank_mut(bank)[index as usize] = rgb888_to_rgb565(rgb);
    }

    #[inline]
    pub fn get_rgb888(&self, bank: usize, index: u8) -> u32 {
        rgb565_to_rgb888(self.get(bank, index))
    }

    /// All banks, bank-major, as the bytes of a `256 × PALETTE_BANK_COUNT` R16 image.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.entries)
    }
}

/// RGB565 → RGB565 remap table used by the tint ink.
///
/// Shared by reference: a tint draw holds a clone of the `Arc` until its queue
/// is drained, so callers may swap tables between frames freely.
#[derive(Debug, Clone, PartialEq)]
pub struct TintTable(Arc<[u16]>);

impl TintTable {
    /// Number of entries (one per RGB565 value).
    pub const LEN: usize = 0x10000;

    /// Builds a table by evaluating `f` for every RGB565 value.
    pub fn from_fn(mut f: impl FnMut(u16) -> u16) -> Self {
        let table: Vec<u16> = (0..Self::LEN).map(|c| f(c as u16)).collect();
        Self(table.into())
    }

    pub fn identity() -> Self {
        Self::from_fn(|c| c)
    }

    /// Luma remap, the usual "underwater"/"flash" style tint.
    pub fn grayscale() -> Self {
        Self::from_fn(|c| {
            let rgb = rgb565_to_rgb888(c);
            let r = (rgb >> 16) & 0xFF;
            let g = (rgb >> 8) & 0xFF;
            let b = rgb & 0xFF;
            let l = (r * 77 + g * 150 + b * 29) >> 8;
            rgb888_to_rgb565((l << 16) | (l << 8) | l)
        })
    }

    /// Wraps an existing table. Returns `None` unless it has exactly [`Self::LEN`] entries.
    pub fn from_entries(entries: Vec<u16>) -> Option<Self> {
        (entries.len() == Self::LEN).then(|| Self(entries.into()))
    }

    #[inline]
    pub fn lookup(&self, rgb565: u16) -> u16 {
        self.0[rgb565 as usize]
    }

    /// Table bytes laid out as a 256×256 R16 image.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.0)
    }

    /// True when both handles refer to the same table allocation.
    #[inline]
    pub fn same_table(&self, other: &TintTable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banks_are_independent() {
        let mut p = PaletteBanks::new();
        p.set_rgb888(0, 1, 0xFF0000);
        p.set_rgb888(1, 1, 0x00FF00);
        assert_eq!(p.get(0, 1), 0xF800);
        assert_eq!(p.get(1, 1), 0x07E0);
        assert_eq!(p.get(2, 1), 0);
    }

    #[test]
    fn palette_bytes_cover_every_bank() {
        let p = PaletteBanks::new();
        assert_eq!(p.as_bytes().len(), PALETTE_BANK_COUNT * PALETTE_BANK_SIZE * 2);
    }

    #[test]
    fn identity_tint_maps_to_itself() {
        let t = TintTable::identity();
        assert_eq!(t.lookup(0x1234), 0x1234);
        assert_eq!(t.as_bytes().len(), TintTable::LEN * 2);
    }

    #[test]
    fn grayscale_tint_equalises_channels() {
        let t = TintTable::grayscale();
        let g = rgb565_to_rgb888(t.lookup(0xFFFF));
        assert_eq!((g >> 16) & 0xF8, g & 0xF8);
        assert_eq!(t.lookup(0x0000), 0x0000);
    }

    #[test]
    fn from_entries_rejects_wrong_length() {
        assert!(TintTable::from_entries(vec![0; 16]).is_none());
        assert!(TintTable::from_entries(vec![0; TintTable::LEN]).is_some());
    }

    #[test]
    fn cloned_tables_share_storage() {
        let a = TintTable::identity();
        let b = a.clone();
        assert!(a.same_table(&b));
        assert!(!a.same_table(&TintTable::identity()));
    }
}
