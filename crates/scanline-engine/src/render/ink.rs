//! Ink modes: how a finished scratch run is composited onto a screen.
//!
//! The ink set is closed. Each variant carries only the parameter its
//! equation needs, and backends dispatch on [`Resolve::kind`].
//!
//! Equations (`src` from scratch with coverage `α`, `dst` from the screen):
//!
//! | ink      | result                                   |
//! |----------|------------------------------------------|
//! | None     | `src·α + dst·(1−α)`                      |
//! | Blend    | same with `α·0.5`                        |
//! | Alpha    | same with `α·alpha`                      |
//! | Add      | `dst + src·α·intensity`, clamped to 1    |
//! | Subtract | `dst − src·α·intensity`, clamped to 0    |
//! | Tint     | `lut[rgb565(dst)]` where `α > 0`         |
//! | Masked   | `src` where `α > 0` and `dst == mask`    |
//! | Unmasked | `src` where `α > 0` and `dst != mask`    |
//! | Fill     | per channel `src·a_c + dst·(1−a_c)` where `α > 0` |

use crate::paint::TintTable;
use crate::paint::color::{rgb565_to_rgb888, rgb888_to_rgb565};

/// Legacy ink identifiers, in format order.
pub mod legacy {
    pub const NONE: i32 = 0;
    pub const BLEND: i32 = 1;
    pub const ALPHA: i32 = 2;
    pub const ADD: i32 = 3;
    pub const SUB: i32 = 4;
    pub const TINT: i32 = 5;
    pub const MASKED: i32 = 6;
    pub const UNMASKED: i32 = 7;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Ink {
    #[default]
    None,
    Blend,
    Alpha(f32),
    Add(f32),
    Subtract(f32),
    Tint(TintTable),
    /// Mask color as `0xRRGGBB`.
    Masked(u32),
    Unmasked(u32),
}

impl Ink {
    /// Maps an engine ink id and alpha/intensity to an ink.
    ///
    /// `tint` and `mask` supply the shared tint table and mask color the
    /// legacy ids refer to implicitly. Unknown ids fall back to `None`.
    pub fn from_legacy(id: i32, alpha: f32, tint: &TintTable, mask: u32) -> Ink {
        match id {
            legacy::BLEND => Ink::Blend,
            legacy::ALPHA => Ink::Alpha(alpha),
            legacy::ADD => Ink::Add(alpha),
            legacy::SUB => Ink::Subtract(alpha),
            legacy::TINT => Ink::Tint(tint.clone()),
            legacy::MASKED => Ink::Masked(mask),
            legacy::UNMASKED => Ink::Unmasked(mask),
            _ => Ink::None,
        }
    }
}

/// Resolve step of a queued draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolve {
    Ink(Ink),
    /// Per-channel fill intensities in `[0, 1]`.
    Fill([f32; 3]),
}

impl Default for Resolve {
    fn default() -> Self {
        Resolve::Ink(Ink::None)
    }
}

impl From<Ink> for Resolve {
    fn from(ink: Ink) -> Self {
        Resolve::Ink(ink)
    }
}

/// Pipeline selector for a resolve, parameters stripped.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResolveKind {
    None,
    Blend,
    Alpha,
    Add,
    Subtract,
    Tint,
    Masked,
    Unmasked,
    Fill,
}

impl ResolveKind {
    pub const ALL: [ResolveKind; 9] = [
        ResolveKind::None,
        ResolveKind::Blend,
        ResolveKind::Alpha,
        ResolveKind::Add,
        ResolveKind::Subtract,
        ResolveKind::Tint,
        ResolveKind::Masked,
        ResolveKind::Unmasked,
        ResolveKind::Fill,
    ];

    /// True when the resolve shader samples the screen it writes to.
    #[inline]
    pub fn reads_destination(self) -> bool {
        matches!(
            self,
            ResolveKind::Tint | ResolveKind::Masked | ResolveKind::Unmasked | ResolveKind::Fill
        )
    }
}

impl Resolve {
    /// Fill resolve from 0..=255 channel intensities (clamped).
    pub fn fill(alpha_r: i32, alpha_g: i32, alpha_b: i32) -> Self {
        let n = |a: i32| a.clamp(0, 0xFF) as f32 / 255.0;
        Resolve::Fill([n(alpha_r), n(alpha_g), n(alpha_b)])
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Resolve::Ink(Ink::None))
    }

    #[inline]
    pub fn is_tint(&self) -> bool {
        matches!(self, Resolve::Ink(Ink::Tint(_)))
    }

    pub fn kind(&self) -> ResolveKind {
        match self {
            Resolve::Ink(Ink::None) => ResolveKind::None,
            Resolve::Ink(Ink::Blend) => ResolveKind::Blend,
            Resolve::Ink(Ink::Alpha(_)) => ResolveKind::Alpha,
            Resolve::Ink(Ink::Add(_)) => ResolveKind::Add,
            Resolve::Ink(Ink::Subtract(_)) => ResolveKind::Subtract,
            Resolve::Ink(Ink::Tint(_)) => ResolveKind::Tint,
            Resolve::Ink(Ink::Masked(_)) => ResolveKind::Masked,
            Resolve::Ink(Ink::Unmasked(_)) => ResolveKind::Unmasked,
            Resolve::Fill(_) => ResolveKind::Fill,
        }
    }

    /// Scalar weight applied to scratch coverage (`1` for inks without one).
    pub fn weight(&self) -> f32 {
        match self {
            Resolve::Ink(Ink::Blend) => 0.5,
            Resolve::Ink(Ink::Alpha(a) | Ink::Add(a) | Ink::Subtract(a)) => *a,
            _ => 1.0,
        }
    }

    /// Mask color for masked inks as RGB565, else 0.
    pub fn mask565(&self) -> u16 {
        match self {
            Resolve::Ink(Ink::Masked(m) | Ink::Unmasked(m)) => rgb888_to_rgb565(*m),
            _ => 0,
        }
    }

    /// Applies the resolve to one pixel.
    ///
    /// `src` is the scratch color (`0xRRGGBB`) with coverage `src_alpha`;
    /// `dst` is the current screen color. This is the reference the resolve
    /// shaders implement.
    pub fn composite(&self, src: u32, src_alpha: f32, dst: u32) -> u32 {
        let s = unpack(src);
        let d = unpack(dst);
        let covered = src_alpha > 0.0;

        match self {
            Resolve::Ink(Ink::None | Ink::Blend | Ink::Alpha(_)) => {
                let a = (src_alpha * self.weight()).clamp(0.0, 1.0);
                pack(std::array::from_fn(|c| s[c] * a + d[c] * (1.0 - a)))
            }
            Resolve::Ink(Ink::Add(_)) => {
                let a = src_alpha * self.weight();
                pack(std::array::from_fn(|c| (d[c] + s[c] * a).min(1.0)))
            }
            Resolve::Ink(Ink::Subtract(_)) => {
                let a = src_alpha * self.weight();
                pack(std::array::from_fn(|c| (d[c] - s[c] * a).max(0.0)))
            }
            Resolve::Ink(Ink::Tint(lut)) => {
                if covered {
                    rgb565_to_rgb888(lut.lookup(rgb888_to_rgb565(dst)))
                } else {
                    dst
                }
            }
            Resolve::Ink(Ink::Masked(_)) => {
                if covered && rgb888_to_rgb565(dst) == self.mask565() { src } else { dst }
            }
            Resolve::Ink(Ink::Unmasked(_)) => {
                if covered && rgb888_to_rgb565(dst) != self.mask565() { src } else { dst }
            }
            Resolve::Fill(alpha) => {
                if covered {
                    pack(std::array::from_fn(|c| s[c] * alpha[c] + d[c] * (1.0 - alpha[c])))
                } else {
                    dst
                }
            }
        }
    }
}

fn unpack(rgb: u32) -> [f32; 3] {
    [
        ((rgb >> 16) & 0xFF) as f32 / 255.0,
        ((rgb >> 8) & 0xFF) as f32 / 255.0,
        (rgb & 0xFF) as f32 / 255.0,
    ]
}

fn pack(c: [f32; 3]) -> u32 {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
    (q(c[0]) << 16) | (q(c[1]) << 8) | q(c[2])
}
