#![allow(dead_code)]

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::rc::Rc;

use bias_discharge::{
    analog::{AnalogChannel, AnalogSampler},
    clock::Clock,
    config::ControlConfig,
    debounce::Polarity,
    status::StatusRecord,
    ControlIo, ControlLoop, Error,
};
use embassy_futures::block_on;
use embassy_time::{Duration, Instant};
use embedded_hal_1::digital::{ErrorKind, ErrorType, InputPin, OutputPin};

/// Clock that jumps straight to whatever deadline it is asked to sleep until.
#[derive(Clone, Default)]
pub struct SimClock(Rc<Cell<u64>>);

impl SimClock {
    pub fn ms(&self) -> u64 {
        self.0.get()
    }
}

impl Clock for SimClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.0.get())
    }

    async fn sleep_until(&mut self, deadline: Instant) {
        self.0.set(self.0.get().max(deadline.as_millis()));
    }
}

#[derive(Clone, Default)]
pub struct SwitchPin(Rc<Cell<bool>>);

impl SwitchPin {
    pub fn set_high(&self, high: bool) {
        self.0.set(high);
    }
}

impl ErrorType for SwitchPin {
    type Error = Infallible;
}

impl InputPin for SwitchPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }
}

#[derive(Debug)]
pub struct PinFault;

impl embedded_hal_1::digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Output pin that logs every write with the simulated time it happened at.
///
/// While failing, writes are rejected and the pin keeps its last level.
#[derive(Clone)]
pub struct RecordingPin {
    clock: SimClock,
    writes: Rc<RefCell<Vec<(u64, bool)>>>,
    failing: Rc<Cell<bool>>,
}

impl RecordingPin {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
            writes: Rc::default(),
            failing: Rc::default(),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn writes(&self) -> Vec<(u64, bool)> {
        self.writes.borrow().clone()
    }

    /// Writes that changed the level, starting from the first write.
    pub fn edges(&self) -> Vec<(u64, bool)> {
        let mut edges: Vec<(u64, bool)> = Vec::new();
        for &(at, level) in self.writes.borrow().iter() {
            if edges.last().map(|&(_, last)| last) != Some(level) {
                edges.push((at, level));
            }
        }
        edges
    }

    pub fn level(&self) -> Option<bool> {
        self.writes.borrow().last().map(|&(_, level)| level)
    }
}

impl RecordingPin {
    fn drive(&mut self, level: bool) -> Result<(), PinFault> {
        if self.failing.get() {
            return Err(PinFault);
        }
        self.writes.borrow_mut().push((self.clock.ms(), level));
        Ok(())
    }
}

impl ErrorType for RecordingPin {
    type Error = PinFault;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}

/// Analog inputs held at fixed levels until the test changes them.
#[derive(Clone, Default)]
pub struct FakeAnalog {
    target: Rc<Cell<u16>>,
    sense: Rc<Cell<u16>>,
    failing: Rc<Cell<bool>>,
    samples: Rc<Cell<u32>>,
}

impl FakeAnalog {
    pub fn set(&self, target: u16, sense: u16) {
        self.target.set(target);
        self.sense.set(sense);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn samples(&self) -> u32 {
        self.samples.get()
    }
}

impl AnalogSampler for FakeAnalog {
    async fn sample(&mut self, channel: AnalogChannel) -> Result<u16, Error> {
        if self.failing.get() {
            return Err(Error::Analog);
        }
        self.samples.set(self.samples.get() + 1);
        Ok(match channel {
            AnalogChannel::Target => self.target.get(),
            AnalogChannel::Sense => self.sense.get(),
        })
    }
}

/// Byte sink shared with the test. While failing, nothing is accepted.
#[derive(Clone, Default)]
pub struct SharedSink {
    bytes: Rc<RefCell<Vec<u8>>>,
    failing: Rc<Cell<bool>>,
}

impl SharedSink {
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8(self.bytes.borrow().clone())
            .unwrap()
            .split_terminator("\r\n")
            .map(str::to_owned)
            .collect()
    }
}

impl embedded_io_async::ErrorType for SharedSink {
    type Error = embedded_io_async::ErrorKind;
}

impl embedded_io_async::Write for SharedSink {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.failing.get() {
            return Err(embedded_io_async::ErrorKind::Other);
        }
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }
}

pub type TestLoop =
    ControlLoop<SwitchPin, SwitchPin, FakeAnalog, RecordingPin, RecordingPin, SharedSink>;

/// Window of 4 samples, 10 ms apart, +/-10 counts, 25 ms pulse.
pub fn test_config() -> ControlConfig {
    ControlConfig {
        sample_period: Duration::from_millis(10),
        sample_depth: 4,
        debounce: Duration::from_millis(50),
        discharge_time: Duration::from_millis(25),
        full_scale: 1023,
        window_half_width: 10,
    }
}

pub struct Rig {
    pub control: TestLoop,
    pub clock: SimClock,
    pub mode_select: SwitchPin,
    pub override_switch: SwitchPin,
    pub analog: FakeAnalog,
    pub discharge: RecordingPin,
    pub indicator: RecordingPin,
    pub sink: SharedSink,
}

impl Rig {
    pub fn new(config: ControlConfig) -> Self {
        Self::with_polarity(config, Polarity::ActiveHigh)
    }

    pub fn with_polarity(config: ControlConfig, polarity: Polarity) -> Self {
        let clock = SimClock::default();
        let mode_select = SwitchPin::default();
        let override_switch = SwitchPin::default();
        if polarity == Polarity::ActiveLow {
            mode_select.set_high(true);
            override_switch.set_high(true);
        }
        let analog = FakeAnalog::default();
        let discharge = RecordingPin::new(&clock);
        let indicator = RecordingPin::new(&clock);
        let sink = SharedSink::default();

        let control = ControlLoop::new(
            config,
            ControlIo {
                mode_select: mode_select.clone(),
                override_switch: override_switch.clone(),
                switch_polarity: polarity,
                analog: analog.clone(),
                discharge: discharge.clone(),
                indicator: indicator.clone(),
                status: sink.clone(),
            },
        )
        .unwrap();

        Self {
            control,
            clock,
            mode_select,
            override_switch,
            analog,
            discharge,
            indicator,
            sink,
        }
    }

    pub fn tick(&mut self) -> Result<Option<StatusRecord>, Error> {
        block_on(self.control.tick(&mut self.clock))
    }

    /// Runs `n` periods and returns the records they produced.
    pub fn run(&mut self, n: usize) -> Vec<StatusRecord> {
        (0..n).filter_map(|_| self.tick().unwrap()).collect()
    }
}
