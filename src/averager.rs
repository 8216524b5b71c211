use embassy_time::{Duration, Instant};

/// Averages of one completed window and the acceptance band around the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    pub target_avg: u16,
    pub sense_avg: u16,
    pub min: u16,
    pub max: u16,
}

impl Window {
    pub fn around(target_avg: u16, sense_avg: u16, half_width: u16) -> Self {
        Self {
            target_avg,
            sense_avg,
            min: target_avg.saturating_sub(half_width),
            max: target_avg.saturating_add(half_width),
        }
    }

    /// Bounds are inclusive.
    pub fn contains(&self, value: u16) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Accumulates target/sense pairs, one per sample period, over `depth` samples.
pub struct WindowedAverager {
    depth: u16,
    half_width: u16,
    period: Duration,
    sample_count: u16,
    target_sum: u32,
    sense_sum: u32,
    next_sample_due: Instant,
}

impl WindowedAverager {
    pub fn new(depth: u16, half_width: u16, period: Duration) -> Self {
        Self {
            depth,
            half_width,
            period,
            sample_count: 0,
            target_sum: 0,
            sense_sum: 0,
            next_sample_due: Instant::from_ticks(0),
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_sample_due
    }

    /// Adds one pair of readings.
    ///
    /// Returns the window once `depth` samples are in and starts over from
    /// zero. Calls made before the next sample is due are ignored.
    pub fn accumulate(&mut self, target: u16, sense: u16, now: Instant) -> Option<Window> {
        if !self.is_due(now) {
            return None;
        }
        self.next_sample_due = now + self.period;

        // depth <= u16::MAX, so neither sum can overflow a u32.
        self.target_sum += target as u32;
        self.sense_sum += sense as u32;
        self.sample_count += 1;

        if self.sample_count < self.depth {
            return None;
        }

        let depth = self.depth as u32;
        let window = Window::around(
            (self.target_sum / depth) as u16,
            (self.sense_sum / depth) as u16,
            self.half_width,
        );
        self.reset();
        Some(window)
    }

    /// Drops any partial sums. The sample schedule is left alone.
    pub fn reset(&mut self) {
        self.sample_count = 0;
        self.target_sum = 0;
        self.sense_sum = 0;
    }

    pub fn sample_count(&self) -> u16 {
        self.sample_count
    }
}
