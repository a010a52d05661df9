use std::time::Instant;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the clock was created; feeds time-driven shader inputs.
    pub elapsed: f32,
}

/// Wall-clock time since the window's first frame.
///
/// One clock per window. Elapsed time is unclamped, so a stall shows up as a
/// jump in shader time rather than a slowdown.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Samples the clock for the current frame.
    pub fn tick(&self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&self, now: Instant) -> FrameTime {
        FrameTime {
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
