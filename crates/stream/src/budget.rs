use std::time::Duration;

/// Streaming configuration: active and preload radii plus per-frame budgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Radius (in tiles) around the viewer whose tiles are stepped.
    pub active_radius: u64,
    /// Radius (in tiles) around the viewer whose tiles are kept generated.
    pub preload_radius: u64,
    /// Maximum number of tiles generated per update.
    pub load_budget: usize,
    /// Maximum number of tiles dropped per update.
    pub unload_budget: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            active_radius: 1,
            preload_radius: 2,
            load_budget: 9,
            unload_budget: 9,
        }
    }
}

/// Per-update streaming statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub tiles_loaded_this_frame: usize,
    pub tiles_unloaded_this_frame: usize,
    pub total_loaded_tiles: usize,
    /// Tiles still waiting to load because the budget ran out.
    pub pending_loads: usize,
    /// Tiles advanced by the last `step_active`.
    pub tiles_stepped_this_frame: usize,
    pub frame_time: Duration,
}

/// Recent frame times together with how many tiles each frame stepped.
///
/// Keeps the last `capacity` frames; older ones are overwritten.
#[derive(Debug)]
pub struct FrameTimer {
    frames: Vec<(Duration, usize)>,
    capacity: usize,
    next: usize,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "frame timer capacity must be positive");
        Self {
            frames: Vec::with_capacity(capacity),
            capacity,
            next: 0,
        }
    }

    /// Record one frame that took `dt` and stepped `tiles_stepped` tiles.
    pub fn record(&mut self, dt: Duration, tiles_stepped: usize) {
        if self.frames.len() < self.capacity {
            self.frames.push((dt, tiles_stepped));
        } else {
            self.frames[self.next] = (dt, tiles_stepped);
        }
        self.next = (self.next + 1) % self.capacity;
    }

    fn times(&self) -> impl Iterator<Item = Duration> + '_ {
        self.frames.iter().map(|&(dt, _)| dt)
    }

    pub fn average(&self) -> Duration {
        match self.frames.len() {
            0 => Duration::ZERO,
            n => self.times().sum::<Duration>() / n as u32,
        }
    }

    pub fn max(&self) -> Duration {
        self.times().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.times().min().unwrap_or(Duration::ZERO)
    }

    /// Average cost of stepping one tile over the kept frames.
    /// Zero when no tile was stepped.
    pub fn per_tile(&self) -> Duration {
        let tiles: usize = self.frames.iter().map(|&(_, n)| n).sum();
        if tiles == 0 {
            return Duration::ZERO;
        }
        self.times().sum::<Duration>() / tiles as u32
    }

    /// Frames currently kept.
    pub fn count(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn stream_config_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.active_radius, 1);
        assert_eq!(config.preload_radius, 2);
        assert_eq!(config.load_budget, 9);
        assert_eq!(config.unload_budget, 9);
    }

    #[test]
    fn fresh_timer_reports_zero() {
        let timer = FrameTimer::new(8);
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.average(), Duration::ZERO);
        assert_eq!(timer.min(), Duration::ZERO);
        assert_eq!(timer.per_tile(), Duration::ZERO);
    }

    #[test]
    fn per_tile_spreads_frame_time_over_stepped_tiles() {
        let mut timer = FrameTimer::new(8);
        timer.record(ms(18), 9);
        timer.record(ms(6), 3);
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.average(), ms(12));
        assert_eq!(timer.min(), ms(6));
        assert_eq!(timer.max(), ms(18));
        assert_eq!(timer.per_tile(), ms(2));
    }

    #[test]
    fn frames_without_steps_still_count_toward_time() {
        let mut timer = FrameTimer::new(4);
        timer.record(ms(4), 0);
        timer.record(ms(8), 4);
        assert_eq!(timer.per_tile(), ms(3));
    }

    #[test]
    fn oldest_frames_fall_out_of_the_window() {
        let mut timer = FrameTimer::new(3);
        for (i, tiles) in [(40, 1), (5, 5), (7, 7), (9, 9)] {
            timer.record(ms(i), tiles);
        }
        assert_eq!(timer.count(), 3);
        assert_eq!(timer.max(), ms(9));
        assert_eq!(timer.min(), ms(5));
        assert_eq!(timer.per_tile(), ms(1));
    }
}
