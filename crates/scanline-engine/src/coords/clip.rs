/// Clip bounds in working-resolution pixels, as corners.
///
/// Half-open: `[x1, x2) × [y1, y2)`. This is the form scene code edits on a
/// screen; queued draws carry the [`Scissor`] form instead.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ClipBounds {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl ClipBounds {
    #[inline]
    pub const fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Bounds covering a whole `width × height` screen.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }

    /// Clamps the bounds into a `width × height` screen, keeping them ordered.
    #[inline]
    pub fn clamped(self, width: u32, height: u32) -> Self {
        let x2 = self.x2.min(width);
        let y2 = self.y2.min(height);
        Self {
            x1: self.x1.min(x2),
            y1: self.y1.min(y2),
            x2,
            y2,
        }
    }

    #[inline]
    pub fn contains_x(self, x: u32) -> bool {
        x >= self.x1 && x < self.x2
    }

    #[inline]
    pub fn contains_y(self, y: u32) -> bool {
        y >= self.y1 && y < self.y2
    }

    /// Converts corners to origin + extent.
    #[inline]
    pub fn to_scissor(self) -> Scissor {
        Scissor {
            x: self.x1,
            y: self.y1,
            width: self.x2.saturating_sub(self.x1),
            height: self.y2.saturating_sub(self.y1),
        }
    }
}

/// Clip rectangle of a queued draw: origin + extent in pixels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Scissor {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Scissor {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Clamps to a `target_w × target_h` render target.
    ///
    /// Returns `None` for a zero-area result (the draw should be skipped).
    pub fn fit(self, target_w: u32, target_h: u32) -> Option<Self> {
        let x = self.x.min(target_w);
        let y = self.y.min(target_h);
        let x2 = self.x.saturating_add(self.width).min(target_w);
        let y2 = self.y.saturating_add(self.height).min(target_h);
        let (w, h) = (x2.saturating_sub(x), y2.saturating_sub(y));

        if w == 0 || h == 0 { None } else { Some(Self::new(x, y, w, h)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── ClipBounds ────────────────────────────────────────────────────────

    #[test]
    fn to_scissor_converts_corners_to_extent() {
        let s = ClipBounds::new(10, 20, 110, 220).to_scissor();
        assert_eq!(s, Scissor::new(10, 20, 100, 200));
    }

    #[test]
    fn inverted_bounds_give_empty_scissor() {
        let s = ClipBounds::new(50, 50, 10, 10).to_scissor();
        assert_eq!((s.width, s.height), (0, 0));
    }

    #[test]
    fn clamped_keeps_bounds_inside_screen() {
        let c = ClipBounds::new(0, 0, 1000, 1000).clamped(424, 240);
        assert_eq!(c, ClipBounds::full(424, 240));

        let c = ClipBounds::new(500, 300, 600, 400).clamped(424, 240);
        assert!(c.is_empty());
    }

    #[test]
    fn contains_is_half_open() {
        let c = ClipBounds::new(4, 4, 8, 8);
        assert!(c.contains_x(4));
        assert!(!c.contains_x(8));
        assert!(c.contains_y(7));
        assert!(!c.contains_y(3));
    }

    // ── Scissor ───────────────────────────────────────────────────────────

    #[test]
    fn fit_clamps_to_target() {
        let s = Scissor::new(400, 200, 100, 100).fit(424, 240).unwrap();
        assert_eq!(s, Scissor::new(400, 200, 24, 40));
    }

    #[test]
    fn fit_rejects_zero_area() {
        assert!(Scissor::new(0, 0, 0, 10).fit(424, 240).is_none());
        assert!(Scissor::new(500, 0, 10, 10).fit(424, 240).is_none());
    }
}
