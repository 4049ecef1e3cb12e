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

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped to avoid pathological values when the process is paused
/// by the debugger, minimized, or stalls on a blocked present.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

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

/// Aggregated frame statistics over a fixed reporting window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameReport {
    pub frames: u32,
    pub avg_dt: f32,
}

impl FrameReport {
    /// Frames per second implied by the average delta.
    pub fn fps(&self) -> f32 {
        if self.avg_dt > 0.0 { 1.0 / self.avg_dt } else { 0.0 }
    }
}

/// Accumulates `FrameTime`s and yields a `FrameReport` every `window` frames.
#[derive(Debug, Clone)]
pub struct FrameStats {
    window: u32,
    frames: u32,
    total_dt: f32,
}

impl FrameStats {
    pub fn new(window: u32) -> Self {
        Self {
            window: window.max(1),
            frames: 0,
            total_dt: 0.0,
        }
    }

    pub fn record(&mut self, ft: FrameTime) -> Option<FrameReport> {
        self.frames += 1;
        self.total_dt += ft.dt;

        if self.frames < self.window {
            return None;
        }

        let report = FrameReport {
            frames: self.frames,
            avg_dt: self.total_dt / self.frames as f32,
        };
        self.frames = 0;
        self.total_dt = 0.0;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ft(dt: f32, frame_index: u64) -> FrameTime {
        FrameTime { dt, now: Instant::now(), frame_index }
    }

    #[test]
    fn tick_increments_frame_index() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
        assert_eq!(clock.tick().frame_index, 2);
    }

    #[test]
    fn tick_clamps_delta() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(5), Duration::from_millis(10));
        let t = clock.tick();
        assert!(t.dt >= 0.005 && t.dt <= 0.010);
    }

    #[test]
    fn stats_report_once_per_window() {
        let mut stats = FrameStats::new(3);
        assert!(stats.record(ft(0.01, 0)).is_none());
        assert!(stats.record(ft(0.02, 1)).is_none());
        let report = stats.record(ft(0.03, 2)).unwrap();
        assert_eq!(report.frames, 3);
        assert!((report.avg_dt - 0.02).abs() < 1e-6);
        assert!(stats.record(ft(0.01, 3)).is_none());
    }

    #[test]
    fn fps_of_empty_report_is_zero() {
        let r = FrameReport { frames: 0, avg_dt: 0.0 };
        assert_eq!(r.fps(), 0.0);
    }
}
