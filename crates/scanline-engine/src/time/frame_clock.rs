use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots and pacing presentation.
///
/// Delta time is clamped to avoid pathological values when the application is paused
/// by the debugger, minimized, or stalls.
///
/// With a refresh rate set, [`FrameClock::frame_due`] reports whether a full frame
/// interval has passed since the last tick, and [`FrameClock::next_deadline`] gives
/// the instant the event loop should wake for the next one.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
    interval: Option<Duration>,
}

impl FrameClock {
    /// Creates a new uncapped clock with default clamps.
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
            interval: None,
        }
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            dt_min,
            dt_max,
            ..Self::new()
        }
    }

    /// Caps ticks at `hz` frames per second. Zero removes the cap.
    pub fn with_refresh_rate(mut self, hz: u32) -> Self {
        self.interval = (hz > 0).then(|| Duration::from_secs_f64(1.0 / hz as f64));
        self
    }

    /// Frame interval, if the clock is capped.
    #[inline]
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Resets the clock baseline.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Whether a frame should be produced now.
    pub fn frame_due(&self) -> bool {
        self.frame_due_at(Instant::now())
    }

    fn frame_due_at(&self, now: Instant) -> bool {
        match self.interval {
            Some(interval) => now.saturating_duration_since(self.last) >= interval,
            None => true,
        }
    }

    /// Instant the next frame becomes due, or `None` when uncapped.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.interval.map(|interval| self.last + interval)
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now.saturating_duration_since(self.last).clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
