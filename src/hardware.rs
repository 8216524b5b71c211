use bias_discharge::{
    analog::{rescale, AnalogChannel, AnalogSampler},
    clock::Clock,
    config::ControlConfig,
    debounce::Polarity,
    ControlIo, Error,
};
use defmt::info;
use embassy_rp::{
    adc::{self, Adc, Async, Channel},
    bind_interrupts,
    gpio::{Input, Level, Output, Pull},
    peripherals::UART0,
    uart::{self, BufferedUartTx},
    Peripherals,
};
use embassy_time::{Instant, Timer};
use static_cell::StaticCell;

const ADC_BITS: u32 = 12;
const REFERENCE_BITS: u32 = 10;
const STATUS_BAUDRATE: u32 = 115_200;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => adc::InterruptHandler;
    UART0_IRQ => uart::BufferedInterruptHandler<UART0>;
});

static STATUS_TX_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();

/// Target (ADC0) and sense (ADC1) sharing the on-chip converter.
pub struct BoardAnalog {
    adc: Adc<'static, Async>,
    target: Channel<'static>,
    sense: Channel<'static>,
}

impl AnalogSampler for BoardAnalog {
    async fn sample(&mut self, channel: AnalogChannel) -> Result<u16, Error> {
        let channel = match channel {
            AnalogChannel::Target => &mut self.target,
            AnalogChannel::Sense => &mut self.sense,
        };
        let code = self.adc.read(channel).await.map_err(|_| Error::Analog)?;
        Ok(rescale(code, ADC_BITS, REFERENCE_BITS))
    }
}

/// Clock backed by the embassy time driver.
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&mut self, deadline: Instant) {
        Timer::at(deadline).await;
    }
}

pub type BoardIo = ControlIo<
    Input<'static>,
    Input<'static>,
    BoardAnalog,
    Output<'static>,
    Output<'static>,
    BufferedUartTx<'static, UART0>,
>;

pub fn init(p: Peripherals, config: &ControlConfig) -> BoardIo {
    // Both switches are pulled up and short to ground when engaged.
    let mode_select = Input::new(p.PIN_2, Pull::Up);
    let override_switch = Input::new(p.PIN_3, Pull::Up);

    let discharge = Output::new(p.PIN_15, Level::Low);
    let indicator = Output::new(p.PIN_25, Level::Low);

    let adc = Adc::new(p.ADC, Irqs, adc::Config::default());
    let target = Channel::new_pin(p.PIN_26, Pull::None);
    let sense = Channel::new_pin(p.PIN_27, Pull::None);

    let mut uart_cfg = uart::Config::default();
    uart_cfg.baudrate = STATUS_BAUDRATE;
    let tx_buffer = &mut STATUS_TX_BUFFER.init([0; 256])[..];
    let status = BufferedUartTx::new(p.UART0, Irqs, p.PIN_0, tx_buffer, uart_cfg);

    info!("Mode select: GPIO2 (active low)");
    info!("Override: GPIO3 (active low)");
    info!("Discharge: GPIO15, indicator: GPIO25");
    info!("Target: ADC0/GPIO26, sense: ADC1/GPIO27");
    info!("Status: UART0 TX GPIO0 @ {} baud", STATUS_BAUDRATE);
    info!(
        "Window: {} samples every {} ms, +/-{} counts, pulse {} ms",
        config.sample_depth,
        config.sample_period.as_millis(),
        config.window_half_width,
        config.discharge_time.as_millis(),
    );

    ControlIo {
        mode_select,
        override_switch,
        switch_polarity: Polarity::ActiveLow,
        analog: BoardAnalog { adc, target, sense },
        discharge,
        indicator,
        status,
    }
}
