#![no_std]
#![no_main]

use bias_discharge::{config::ControlConfig, ControlLoop};
use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::BufferedUartTx;

use {defmt_rtt as _, panic_probe as _};

mod hardware;

use hardware::{BoardAnalog, EmbassyClock};

type BoardControl = ControlLoop<
    Input<'static>,
    Input<'static>,
    BoardAnalog,
    Output<'static>,
    Output<'static>,
    BufferedUartTx<'static, UART0>,
>;

#[embassy_executor::task]
async fn control_task(mut control: BoardControl) {
    if let Err(e) = control.write_header().await {
        warn!("Status header not sent: {}", e);
    }
    control.run(&mut EmbassyClock).await;
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    let config = ControlConfig::default();
    let io = hardware::init(p, &config);

    let control = unwrap!(ControlLoop::new(config, io));
    info!("Bias discharge controller running");

    unwrap!(spawner.spawn(control_task(control)));
}
