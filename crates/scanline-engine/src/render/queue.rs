use std::ops::Index;

use crate::coords::Scissor;

use super::ink::Resolve;
use super::ring::GeomRange;
use super::shader::DrawShader;
use super::SurfaceId;

/// One queued draw command.
///
/// The clip is filled from the target screen when the command is pushed
/// through the compositor; geometry ranges expire at the next flush.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    pub shader: DrawShader,
    pub resolve: Resolve,
    pub texture: Option<SurfaceId>,
    pub clip: Scissor,
    pub vertices: GeomRange,
    pub indices: GeomRange,
}

impl RenderState {
    pub fn new(shader: DrawShader, resolve: Resolve) -> Self {
        Self {
            shader,
            resolve,
            ..Self::default()
        }
    }

    pub fn with_texture(mut self, texture: SurfaceId) -> Self {
        self.texture = Some(texture);
        self
    }
}

/// Per-screen FIFO of draw commands.
///
/// Storage is kept across [`RenderStateQueue::finish`] and overwritten in
/// place by later pushes. `front`/`last` return a default sentinel instead of
/// failing when nothing is available, which keeps the compositor's look-ahead
/// branch-free.
#[derive(Debug, Default)]
pub struct RenderStateQueue {
    states: Vec<RenderState>,
    size: usize,
    read: usize,
    sentinel: RenderState,
}

impl RenderStateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, state: RenderState) {
        if self.size < self.states.len() {
            self.states[self.size] = state;
        } else {
            self.states.push(state);
        }
        self.size += 1;
    }

    /// Returns the command at the read cursor and advances it.
    ///
    /// # Panics
    /// Panics when the queue is [`empty`](RenderStateQueue::empty).
    pub fn pop(&mut self) -> &RenderState {
        let i = self.read;
        self.read += 1;
        &self.states[..self.size][i]
    }

    /// Drops every command, keeping storage.
    #[inline]
    pub fn finish(&mut self) {
        self.size = 0;
        self.read = 0;
    }

    /// True when no unread command remains.
    #[inline]
    pub fn empty(&self) -> bool {
        self.read >= self.size
    }

    /// Commands pushed since the last `finish`, read or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn front(&self) -> &RenderState {
        if self.empty() { &self.sentinel } else { &self.states[self.read] }
    }

    #[inline]
    pub fn last(&self) -> &RenderState {
        match self.size {
            0 => &self.sentinel,
            n => &self.states[n - 1],
        }
    }

    #[inline]
    pub fn last_mut(&mut self) -> Option<&mut RenderState> {
        match self.size {
            0 => None,
            n => self.states.get_mut(n - 1),
        }
    }

    /// Allocated slots (diagnostics; never shrinks).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.states.len()
    }
}

impl Index<usize> for RenderStateQueue {
    type Output = RenderState;

    fn index(&self, i: usize) -> &RenderState {
        &self.states[..self.size][i]
    }
}
