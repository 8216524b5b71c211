use embedded_hal_1::digital::{InputPin, OutputPin};
use embedded_io_async::Write;

use crate::{
    analog::{AnalogChannel, AnalogSampler},
    clock::Clock,
    config::ControlConfig,
    debounce::{DebouncedPin, Polarity},
    discharge::{classify, DischargeActuator, Verdict},
    error::Error,
    state::{ControlContext, ControlMode},
    status::{StatusRecord, StatusWriter},
};

/// Peripherals handed to the control loop at startup.
pub struct ControlIo<M, V, A, D, I, W> {
    pub mode_select: M,
    pub override_switch: V,
    /// Level that means "engaged" on both switches.
    pub switch_polarity: Polarity,
    pub analog: A,
    pub discharge: D,
    pub indicator: I,
    pub status: W,
}

/// Fixed-period loop that polices the sense value and drives the discharge switch.
pub struct ControlLoop<M, V, A, D, I, W> {
    config: ControlConfig,
    mode_select: DebouncedPin<M>,
    override_switch: DebouncedPin<V>,
    analog: A,
    actuator: DischargeActuator<D, I>,
    status: StatusWriter<W>,
    ctx: ControlContext,
}

impl<M, V, A, D, I, W> ControlLoop<M, V, A, D, I, W>
where
    M: InputPin,
    V: InputPin,
    A: AnalogSampler,
    D: OutputPin,
    I: OutputPin,
    W: Write,
{
    pub fn new(config: ControlConfig, io: ControlIo<M, V, A, D, I, W>) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            mode_select: DebouncedPin::new(io.mode_select, io.switch_polarity, config.debounce),
            override_switch: DebouncedPin::new(
                io.override_switch,
                io.switch_polarity,
                config.debounce,
            ),
            analog: io.analog,
            actuator: DischargeActuator::new(io.discharge, io.indicator)?,
            status: StatusWriter::new(io.status),
            ctx: ControlContext::new(&config),
            config,
        })
    }

    /// Runs forever. Errors are logged and the next period starts on schedule.
    pub async fn run<C: Clock>(&mut self, clock: &mut C) {
        loop {
            if let Err(e) = self.tick(clock).await {
                warn!("Control step failed: {}", e);
            }
        }
    }

    /// One period: a [`step`](Self::step), then sleep until `start + sample_period`.
    ///
    /// A step that overruns (a discharge pulse) pushes the schedule back
    /// instead of being caught up.
    pub async fn tick<C: Clock>(&mut self, clock: &mut C) -> Result<Option<StatusRecord>, Error> {
        let wake = clock.now() + self.config.sample_period;
        let result = self.step(clock).await;

        let now = clock.now();
        if now > wake {
            debug!("Control period overran by {} ms", (now - wake).as_millis());
        }
        clock.sleep_until(wake).await;
        result
    }

    /// Samples both switches, advances the current mode and reports a
    /// completed cycle, if any.
    pub async fn step<C: Clock>(&mut self, clock: &mut C) -> Result<Option<StatusRecord>, Error> {
        let now = clock.now();
        let manual = self.mode_select.update(now)?;
        let override_engaged = self.override_switch.update(now)?;

        let mode = ControlMode::from_switch(manual);
        if self.ctx.enter_mode(mode) {
            info!("Mode -> {}", mode);
        }

        let record = match mode {
            ControlMode::Automatic => {
                // Outside a pulse the switch stays OFF, including after a failed write.
                self.actuator.ensure_off()?;
                self.automatic_period(clock).await?
            }
            ControlMode::Manual => self.manual_period(override_engaged)?,
        };

        // A record whose write fails keeps its tick number for the next one.
        if let Some(record) = &record {
            self.status.write_record(record).await?;
            self.ctx.advance_tick();
        }
        Ok(record)
    }

    pub async fn write_header(&mut self) -> Result<(), Error> {
        self.status.write_header().await
    }

    pub fn mode(&self) -> ControlMode {
        self.ctx.mode
    }

    pub fn is_discharging(&self) -> bool {
        self.actuator.is_discharging()
    }

    pub fn context(&self) -> &ControlContext {
        &self.ctx
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    async fn automatic_period<C: Clock>(
        &mut self,
        clock: &mut C,
    ) -> Result<Option<StatusRecord>, Error> {
        let now = clock.now();
        if !self.ctx.averager.is_due(now) {
            return Ok(None);
        }

        let full_scale = self.config.full_scale;
        let target = self.analog.sample(AnalogChannel::Target).await?.min(full_scale);
        let sense = self.analog.sample(AnalogChannel::Sense).await?.min(full_scale);

        let Some(window) = self.ctx.averager.accumulate(target, sense, now) else {
            return Ok(None);
        };

        let verdict = classify(&window);
        if verdict == Verdict::Discharge {
            warn!(
                "Sense {} outside [{}, {}] (target {}), discharging for {} ms",
                window.sense_avg,
                window.min,
                window.max,
                window.target_avg,
                self.config.discharge_time.as_millis(),
            );
            self.actuator.pulse(clock, self.config.discharge_time).await?;
        }

        Ok(Some(StatusRecord::automatic(self.ctx.tick, verdict, window)))
    }

    fn manual_period(&mut self, override_engaged: bool) -> Result<Option<StatusRecord>, Error> {
        if override_engaged != self.actuator.is_discharging() {
            info!("Manual override -> {}", override_engaged);
        }
        self.actuator.set(override_engaged)?;

        // Report on the same cadence as an automatic window.
        self.ctx.manual_periods += 1;
        if self.ctx.manual_periods < self.config.sample_depth {
            return Ok(None);
        }
        self.ctx.manual_periods = 0;

        let verdict = Verdict::from_discharging(override_engaged);
        Ok(Some(StatusRecord::manual(self.ctx.tick, verdict)))
    }
}
