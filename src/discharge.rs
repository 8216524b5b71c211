use core::fmt;

use embassy_time::Duration;
use embedded_hal_1::digital::{OutputPin, PinState};

use crate::{averager::Window, clock::Clock, error::Error};

/// Outcome reported for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    Run,
    Discharge,
}

impl Verdict {
    pub const fn tag(self) -> &'static str {
        match self {
            Verdict::Run => "RUN",
            Verdict::Discharge => "DIS",
        }
    }

    pub const fn from_discharging(discharging: bool) -> Self {
        if discharging {
            Verdict::Discharge
        } else {
            Verdict::Run
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Sense average strictly outside the window calls for a discharge.
pub fn classify(window: &Window) -> Verdict {
    Verdict::from_discharging(!window.contains(window.sense_avg))
}

/// Discharge switch plus its indicator. Both outputs always change together.
///
/// The level is only recorded once both writes succeed. After a failed write
/// the outputs are unconfirmed until the next successful one.
pub struct DischargeActuator<D, I> {
    switch: D,
    indicator: I,
    confirmed: Option<bool>,
}

impl<D: OutputPin, I: OutputPin> DischargeActuator<D, I> {
    /// Drives both outputs idle before handing the actuator out.
    pub fn new(switch: D, indicator: I) -> Result<Self, Error> {
        let mut actuator = Self {
            switch,
            indicator,
            confirmed: None,
        };
        actuator.write(false)?;
        Ok(actuator)
    }

    pub fn set(&mut self, discharging: bool) -> Result<(), Error> {
        if self.confirmed != Some(discharging) {
            debug!("Discharge -> {}", discharging);
        }
        self.write(discharging)
    }

    /// Drives both outputs OFF unless they are already confirmed OFF.
    pub fn ensure_off(&mut self) -> Result<(), Error> {
        if self.is_confirmed_off() {
            return Ok(());
        }
        self.set(false)
    }

    /// Forces discharge ON for `duration`, then OFF.
    ///
    /// Nothing else in the loop runs until the pulse ends.
    pub async fn pulse<C: Clock>(&mut self, clock: &mut C, duration: Duration) -> Result<(), Error> {
        self.set(true)?;
        let end = clock.now() + duration;
        clock.sleep_until(end).await;
        self.set(false)
    }

    /// True unless both outputs are confirmed OFF.
    pub fn is_discharging(&self) -> bool {
        !self.is_confirmed_off()
    }

    pub fn is_confirmed_off(&self) -> bool {
        self.confirmed == Some(false)
    }

    fn write(&mut self, discharging: bool) -> Result<(), Error> {
        let state = PinState::from(discharging);
        self.confirmed = None;
        self.switch.set_state(state).map_err(|_| Error::DigitalOutput)?;
        self.indicator.set_state(state).map_err(|_| Error::DigitalOutput)?;
        self.confirmed = Some(discharging);
        Ok(())
    }
}
