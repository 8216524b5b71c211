use embassy_time::Duration;

use crate::error::Error;

pub const SAMPLE_PERIOD: Duration = Duration::from_millis(10);
pub const SAMPLE_DEPTH: u16 = 64;
pub const DEBOUNCE: Duration = Duration::from_millis(50);
// Must stay shorter than one averaging window (SAMPLE_PERIOD * SAMPLE_DEPTH).
pub const DISCHARGE_TIME: Duration = Duration::from_millis(250);

// Reference readings are 10-bit; the tolerance band is 1% of full scale.
pub const ADC_FULL_SCALE: u16 = 1023;
pub const WINDOW_HALF_WIDTH: u16 = ADC_FULL_SCALE / 100;

/// Timing and threshold settings for one bias/sense pair.
///
/// Fixed at startup; nothing in the loop writes to it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlConfig {
    /// Loop period and minimum spacing between two analog samples.
    pub sample_period: Duration,
    /// Samples per averaging window (N).
    pub sample_depth: u16,
    /// Time a latched switch edge ignores further bounce.
    pub debounce: Duration,
    /// Length of the forced-ON discharge pulse.
    pub discharge_time: Duration,
    /// Largest value the analog sampler returns.
    pub full_scale: u16,
    /// Half width of the acceptance window around the target average.
    pub window_half_width: u16,
}

impl ControlConfig {
    pub const fn new() -> Self {
        Self {
            sample_period: SAMPLE_PERIOD,
            sample_depth: SAMPLE_DEPTH,
            debounce: DEBOUNCE,
            discharge_time: DISCHARGE_TIME,
            full_scale: ADC_FULL_SCALE,
            window_half_width: WINDOW_HALF_WIDTH,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.sample_depth == 0 {
            return Err(Error::InvalidConfig("sample depth must be non-zero"));
        }
        if self.sample_period.as_ticks() == 0 {
            return Err(Error::InvalidConfig("sample period must be non-zero"));
        }
        if self.full_scale == 0 {
            return Err(Error::InvalidConfig("full scale must be non-zero"));
        }
        if self.window_half_width >= self.full_scale {
            return Err(Error::InvalidConfig("window half width exceeds full scale"));
        }
        if self.discharge_time >= self.window_period() {
            return Err(Error::InvalidConfig("discharge pulse must be shorter than one window"));
        }
        Ok(())
    }

    /// Duration of one complete averaging window.
    pub fn window_period(&self) -> Duration {
        self.sample_period * self.sample_depth as u32
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self::new()
    }
}
