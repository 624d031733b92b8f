//! Vertex/index staging ring shared by every screen.
//!
//! The ring is a bump allocator over two fixed-capacity arrays. Allocation
//! hands out a region at the current write offsets without advancing them;
//! the compositor advances the offsets when the owning draw is queued and
//! resets them when it flushes.
//!
//! Invariants:
//! - vertex offsets live in `[RESERVED_VERTICES, limit + RESERVED_VERTICES]`
//! - index offsets live in `[0, limit]`
//! - the first `RESERVED_VERTICES` vertices always hold [`FULL_SCREEN_QUAD`]
//! - a [`GeomRange`] is only valid for the generation it was issued in

use crate::config::RESERVED_VERTICES;

use super::vertex::{FULL_SCREEN_QUAD, QUAD_INDEX_PATTERN, RenderVertex};

/// Handle to a region of the ring, valid until the next reset.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct GeomRange {
    generation: u32,
    offset: u32,
    count: u32,
}

impl GeomRange {
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }

    /// First element of the region (vertices include the reserved prefix).
    #[inline]
    pub fn offset(self) -> u32 {
        self.offset
    }

    #[inline]
    pub fn count(self) -> u32 {
        self.count
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.count == 0
    }

    #[inline]
    fn span(self) -> std::ops::Range<usize> {
        self.offset as usize..(self.offset + self.count) as usize
    }
}

/// Whether serving an allocation forced a flush first.
///
/// `Yes` invalidates every handle issued before the call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Flushed {
    Yes,
    No,
}

#[derive(Debug)]
pub struct GeometryRing {
    vertices: Vec<RenderVertex>,
    indices: Vec<u16>,
    vertex_off: u32,
    index_off: u32,
    limit: u32,
    generation: u32,
}

impl GeometryRing {
    pub fn new(limit: u32) -> Self {
        debug_assert!(
            limit + RESERVED_VERTICES - 1 <= u16::MAX as u32,
            "ring limit {limit} overflows 16-bit indices"
        );
        let mut vertices = vec![RenderVertex::default(); (limit + RESERVED_VERTICES) as usize];
        vertices[..RESERVED_VERTICES as usize].copy_from_slice(&FULL_SCREEN_QUAD);

        Self {
            vertices,
            indices: vec![0; limit as usize],
            vertex_off: RESERVED_VERTICES,
            index_off: 0,
            limit,
            generation: 0,
        }
    }

    /// Absolute per-call maximum for either array.
    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[inline]
    pub fn vertex_offset(&self) -> u32 {
        self.vertex_off
    }

    #[inline]
    pub fn index_offset(&self) -> u32 {
        self.index_off
    }

    #[inline]
    pub fn vertices_fit(&self, count: u32) -> bool {
        self.vertex_off + count <= self.limit + RESERVED_VERTICES
    }

    #[inline]
    pub fn indices_fit(&self, count: u32) -> bool {
        self.index_off + count <= self.limit
    }

    /// Hands out `count` vertices at the write offset without advancing it.
    ///
    /// # Panics
    /// Panics if `count` exceeds the per-call limit, or (in debug builds) if
    /// the caller did not make room first.
    pub fn reserve_vertices(&self, count: u32) -> GeomRange {
        assert!(
            count <= self.limit,
            "vertex allocation of {count} exceeds the ring limit of {}",
            self.limit
        );
        debug_assert!(self.vertices_fit(count), "vertex ring overflow");
        GeomRange {
            generation: self.generation,
            offset: self.vertex_off,
            count,
        }
    }

    /// Index counterpart of [`GeometryRing::reserve_vertices`].
    pub fn reserve_indices(&self, count: u32) -> GeomRange {
        assert!(
            count <= self.limit,
            "index allocation of {count} exceeds the ring limit of {}",
            self.limit
        );
        debug_assert!(self.indices_fit(count), "index ring overflow");
        GeomRange {
            generation: self.generation,
            offset: self.index_off,
            count,
        }
    }

    /// Moves both write offsets past a queued draw.
    pub fn advance(&mut self, vertices: u32, indices: u32) {
        self.vertex_off = (self.vertex_off + vertices).min(self.limit + RESERVED_VERTICES);
        self.index_off = (self.index_off + indices).min(self.limit);
    }

    /// Returns offsets to the reserved prefix and invalidates outstanding handles.
    pub fn reset(&mut self) {
        self.vertex_off = RESERVED_VERTICES;
        self.index_off = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn vertices_mut(&mut self, range: GeomRange) -> &mut [RenderVertex] {
        debug_assert_eq!(range.generation, self.generation, "stale vertex range");
        &mut self.vertices[range.span()]
    }

    pub fn indices_mut(&mut self, range: GeomRange) -> &mut [u16] {
        debug_assert_eq!(range.generation, self.generation, "stale index range");
        &mut self.indices[range.span()]
    }

    /// Vertices written so far this generation, reserved prefix included.
    #[inline]
    pub fn used_vertices(&self) -> &[RenderVertex] {
        &self.vertices[..self.vertex_off as usize]
    }

    #[inline]
    pub fn used_indices(&self) -> &[u16] {
        &self.indices[..self.index_off as usize]
    }
}

/// Writes the quad index pattern for `quads` quads into `dest`.
///
/// Quad `i` uses vertices `4i..4i + 4` relative to the draw's base vertex.
pub fn write_quad_indices(dest: &mut [u16], quads: usize) {
    for (q, chunk) in dest.chunks_exact_mut(6).take(quads).enumerate() {
        let base = (q * 4) as u16;
        for (slot, pattern) in chunk.iter_mut().zip(QUAD_INDEX_PATTERN) {
            *slot = base + pattern;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ring_starts_after_reserved_prefix() {
        let ring = GeometryRing::new(64);
        assert_eq!(ring.vertex_offset(), RESERVED_VERTICES);
        assert_eq!(ring.index_offset(), 0);
        assert_eq!(ring.used_vertices(), &FULL_SCREEN_QUAD);
    }

    #[test]
    fn reserve_does_not_advance() {
        let ring = GeometryRing::new(64);
        let a = ring.reserve_vertices(4);
        let b = ring.reserve_vertices(4);
        assert_eq!(a, b);
        assert_eq!(a.offset(), RESERVED_VERTICES);
    }

    #[test]
    fn capacity_counts_reserved_prefix_separately() {
        let mut ring = GeometryRing::new(16);
        assert!(ring.vertices_fit(16));
        ring.advance(12, 12);
        assert!(ring.vertices_fit(4));
        assert!(!ring.vertices_fit(5));
        assert!(ring.indices_fit(4));
        assert!(!ring.indices_fit(5));
    }

    #[test]
    fn reset_bumps_generation_and_rewinds() {
        let mut ring = GeometryRing::new(16);
        let before = ring.reserve_vertices(4);
        ring.advance(4, 6);
        ring.reset();

        let after = ring.reserve_vertices(4);
        assert_ne!(before.generation(), after.generation());
        assert_eq!(after.offset(), RESERVED_VERTICES);
        assert_eq!(ring.index_offset(), 0);
    }

    #[test]
    #[should_panic(expected = "exceeds the ring limit")]
    fn oversized_request_is_fatal() {
        let ring = GeometryRing::new(16);
        let _ = ring.reserve_vertices(17);
    }

    #[test]
    fn quad_indices_follow_pattern() {
        let mut dest = [0u16; 12];
        write_quad_indices(&mut dest, 2);
        assert_eq!(dest, [0, 1, 2, 1, 3, 2, 4, 5, 6, 5, 7, 6]);
    }

    #[test]
    fn written_data_lands_at_range_offset() {
        let mut ring = GeometryRing::new(16);
        let r = ring.reserve_vertices(2);
        ring.vertices_mut(r)[1].color = 7;
        ring.advance(2, 0);
        assert_eq!(ring.used_vertices()[RESERVED_VERTICES as usize + 1].color, 7);
    }
}
