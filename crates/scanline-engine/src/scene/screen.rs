use crate::coords::ClipBounds;

/// One logical screen (a split-screen player view).
///
/// Draw entry points target the compositor's current screen and read its
/// clip bounds at push time, so changing the clip between draws scopes each
/// draw independently.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Screen {
    pub width: u32,
    pub height: u32,

    /// Row pitch in pixels: `width` rounded up to a multiple of 16.
    pub pitch: u32,

    /// Camera position in whole pixels.
    pub position: [i32; 2],

    pub clip: ClipBounds,
}

impl Screen {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pitch: (width + 15) & !15,
            position: [0, 0],
            clip: ClipBounds::full(width, height),
        }
    }

    /// Sets clip bounds, clamped to the screen.
    #[inline]
    pub fn set_clip(&mut self, clip: ClipBounds) {
        self.clip = clip.clamped(self.width, self.height);
    }

    #[inline]
    pub fn reset_clip(&mut self) {
        self.clip = ClipBounds::full(self.width, self.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_rounds_to_sixteen() {
        assert_eq!(Screen::new(424, 240).pitch, 432);
        assert_eq!(Screen::new(320, 240).pitch, 320);
    }

    #[test]
    fn clip_is_clamped_and_resettable() {
        let mut s = Screen::new(320, 240);
        s.set_clip(ClipBounds::new(10, 10, 999, 120));
        assert_eq!(s.clip, ClipBounds::new(10, 10, 320, 120));

        s.reset_clip();
        assert_eq!(s.clip, ClipBounds::full(320, 240));
    }
}
