use core::ops::{Add, AddAssign, Sub};

/// 16.16 fixed-point scalar.
pub type Fixed = i32;

/// Converts a 16.16 fixed-point value to `f32`.
#[inline]
pub fn from_fixed(v: Fixed) -> f32 {
    v as f32 / 65536.0
}

/// 2D position or delta in 16.16 fixed point.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct FixedVec2 {
    pub x: Fixed,
    pub y: Fixed,
}

impl FixedVec2 {
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Whole-pixel position.
    #[inline]
    pub const fn from_pixels(x: i32, y: i32) -> Self {
        Self { x: x << 16, y: y << 16 }
    }

    #[inline]
    pub fn to_f32(self) -> (f32, f32) {
        (from_fixed(self.x), from_fixed(self.y))
    }
}

impl Add for FixedVec2 {
    type Output = FixedVec2;
    #[inline]
    fn add(self, rhs: FixedVec2) -> FixedVec2 {
        FixedVec2::new(self.x.wrapping_add(rhs.x), self.y.wrapping_add(rhs.y))
    }
}

impl AddAssign for FixedVec2 {
    #[inline]
    fn add_assign(&mut self, rhs: FixedVec2) {
        *self = *self + rhs;
    }
}

impl Sub for FixedVec2 {
    type Output = FixedVec2;
    #[inline]
    fn sub(self, rhs: FixedVec2) -> FixedVec2 {
        FixedVec2::new(self.x.wrapping_sub(rhs.x), self.y.wrapping_sub(rhs.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pixels_shifts_into_integer_part() {
        let v = FixedVec2::from_pixels(3, -2);
        assert_eq!(v.to_f32(), (3.0, -2.0));
    }

    #[test]
    fn add_wraps_instead_of_overflowing() {
        let mut v = FixedVec2::new(i32::MAX, 0);
        v += FixedVec2::new(1, 1);
        assert_eq!(v, FixedVec2::new(i32::MIN, 1));
    }
}
