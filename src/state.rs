use core::fmt;

use crate::averager::WindowedAverager;
use crate::config::ControlConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMode {
    /// Sense value is policed against the averaged target window.
    Automatic,
    /// Operator override drives the discharge switch directly.
    Manual,
}

impl ControlMode {
    /// An engaged mode-select switch selects manual control.
    pub const fn from_switch(engaged: bool) -> Self {
        if engaged {
            ControlMode::Manual
        } else {
            ControlMode::Automatic
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ControlMode::Automatic => "auto",
            ControlMode::Manual => "manual",
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the control loop remembers between periods.
pub struct ControlContext {
    pub averager: WindowedAverager,
    pub mode: ControlMode,
    /// Periods spent in manual mode since the last report.
    pub manual_periods: u16,
    /// Number of the next status record. Advances only once a record is written.
    pub tick: u32,
}

impl ControlContext {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            averager: WindowedAverager::new(
                config.sample_depth,
                config.window_half_width,
                config.sample_period,
            ),
            mode: ControlMode::Automatic,
            manual_periods: 0,
            tick: 0,
        }
    }

    /// Returns true when `mode` differs from the previous period's mode.
    ///
    /// Any change drops partial averages and restarts the manual cadence.
    pub fn enter_mode(&mut self, mode: ControlMode) -> bool {
        if mode == self.mode {
            return false;
        }
        self.mode = mode;
        self.averager.reset();
        self.manual_periods = 0;
        true
    }

    pub fn advance_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }
}
