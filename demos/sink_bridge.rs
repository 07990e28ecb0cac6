//! UAC1 sink personality on an STM32H750 board: host audio arrives over
//! USB, is handed to a passthrough DSP stage, and is pulled out by a
//! caller-provided mixer. Modeled on the teacher's `_usb_uac.rs` speaker
//! example's task layout and `main()` shape; the board-support crate that
//! example wires its RCC/pins through isn't part of this crate, so RCC
//! and the OTG FS D+/D- pins are set up directly against `embassy-stm32`
//! here instead.
#![no_std]
#![no_main]

use dap_usb_bridge::class::sink_class;
use dap_usb_bridge::class::BridgeHandler;
use dap_usb_bridge::config::BridgeConfig;
use dap_usb_bridge::control::ControlDispatcher;
use dap_usb_bridge::hooks::{PassthroughDsp, VolumeEngine};
use dap_usb_bridge::sink::SinkPipeline;
use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_stm32::{bind_interrupts, peripherals, usb};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
});

const HW_FREQ_SAMPR: &[u32] = &[96_000, 48_000, 44_100];

/// Stand-in volume engine until a real codec driver is wired in; clamps
/// within a conventional -80..0 dB range.
struct NullVolumeEngine {
    db: i32,
}

impl VolumeEngine for NullVolumeEngine {
    fn set_volume_db(&mut self, db: i32) {
        self.db = db.clamp(self.min_db(), self.max_db());
    }
    fn volume_db(&self) -> i32 {
        self.db
    }
    fn min_db(&self) -> i32 {
        -80
    }
    fn max_db(&self) -> i32 {
        0
    }
    fn res_db(&self) -> i32 {
        1
    }
}

#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, usb::Driver<'static, peripherals::USB_OTG_FS>>) {
    device.run().await;
}

#[embassy_executor::task]
async fn sink_task(
    mut stream_out: usb::Endpoint<'static, peripherals::USB_OTG_FS, embassy_stm32::usb::Out>,
    mut feedback_in: usb::Endpoint<'static, peripherals::USB_OTG_FS, embassy_stm32::usb::In>,
    pipeline: &'static mut SinkPipeline<PassthroughDsp>,
) {
    let _ = sink_class::run::<usb::Driver<'static, peripherals::USB_OTG_FS>, _>(
        &mut stream_out,
        &mut feedback_in,
        pipeline,
    )
    .await;
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("dap_usb_bridge sink demo starting");

    let p = embassy_stm32::init(embassy_stm32::Config::default());

    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 32]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
    static EP_OUT_BUFFER: StaticCell<[u8; 1024 + 64 + 4]> = StaticCell::new();
    static PIPELINE: StaticCell<SinkPipeline<PassthroughDsp>> = StaticCell::new();

    let mut usb_config = usb::Config::default();
    usb_config.vbus_detection = false;
    let usb_driver = usb::Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        EP_OUT_BUFFER.init([0; 1024 + 64 + 4]),
        usb_config,
    );

    let mut device_config = embassy_usb::Config::new(0xdead, 0xbeef);
    device_config.manufacturer = Some("dap_usb_bridge");
    device_config.product = Some("sink demo");
    device_config.serial_number = Some("0001");
    device_config.device_class = 0xEF;
    device_config.device_sub_class = 0x02;
    device_config.device_protocol = 0x01;
    device_config.composite_with_iads = true;

    let mut builder = embassy_usb::Builder::new(
        usb_driver,
        device_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 32]),
        &mut [],
        CONTROL_BUF.init([0; 64]),
    );

    let bridge_config = BridgeConfig::new(HW_FREQ_SAMPR, 0, true);
    let sink_endpoints = sink_class::build(&mut builder, bridge_config.sink_freq_table(), bridge_config.high_speed);

    static HANDLER: StaticCell<BridgeHandler<NullVolumeEngine>> = StaticCell::new();
    let handler = HANDLER.init(BridgeHandler::new(
        ControlDispatcher::new(bridge_config.sink_freq_table(), bridge_config.default_freq(), bridge_config.numdecimals),
        NullVolumeEngine { db: -20 },
    ));
    builder.handler(handler);

    let usb_device = builder.build();

    let pipeline = PIPELINE.init(SinkPipeline::new(
        PassthroughDsp,
        bridge_config.default_freq(),
        bridge_config.feedback_p,
        bridge_config.high_speed,
    ));

    unwrap!(spawner.spawn(usb_task(usb_device)));
    unwrap!(spawner.spawn(sink_task(sink_endpoints.stream_out, sink_endpoints.feedback_in, pipeline)));
}
