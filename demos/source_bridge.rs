//! UAC1 source personality plus the HID-iAP side channel, on an
//! STM32H750 board: locally decoded PCM streams to the host, and the
//! HID-iAP transport installs itself lazily on first accessory traffic.
//! Charging supervision runs as an independent 10ms-tick task, mirroring
//! the Thread/Tick domain split in the concurrency mapping. RCC and the
//! OTG FS D+/D- pins are set up directly against `embassy-stm32`, the
//! same way `sink_bridge.rs` does.
#![no_std]
#![no_main]

use dap_usb_bridge::charging::{ChargeSense, ChargingSupervisor};
use dap_usb_bridge::class::hid_class::{self, HidReportHandler};
use dap_usb_bridge::class::source_class;
use dap_usb_bridge::class::BridgeHandler;
use dap_usb_bridge::config::BridgeConfig;
use dap_usb_bridge::control::ControlDispatcher;
use dap_usb_bridge::hid_iap::{HidIapTransport, TransportHandle};
use dap_usb_bridge::hooks::{IapSink, MixerHook, VolumeEngine};
use dap_usb_bridge::source::SourcePipeline;
use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_stm32::{bind_interrupts, peripherals, usb};
use embassy_time::{Duration, Ticker};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
});

const HW_FREQ_SAMPR_ASCENDING: &[u32] = &[22_050, 44_100, 48_000, 96_000];
const HID_HANDLE: TransportHandle = TransportHandle(1);

struct SilentMixer;
impl MixerHook for SilentMixer {
    fn pull(&mut self, _buf: &mut [u8]) -> usize {
        0
    }
}

struct DiscardSink;
impl IapSink for DiscardSink {
    fn feed(&mut self, _byte: u8) {}
}

/// The source personality has no feature unit; this only ever backs the
/// dispatcher's sampling-frequency endpoint control.
struct NoVolumeEngine;
impl VolumeEngine for NoVolumeEngine {
    fn set_volume_db(&mut self, _db: i32) {}
    fn volume_db(&self) -> i32 {
        0
    }
    fn min_db(&self) -> i32 {
        0
    }
    fn max_db(&self) -> i32 {
        0
    }
    fn res_db(&self) -> i32 {
        1
    }
}

/// Backlight/charger pins are S5L8702-specific in the original and have no
/// Daisy-board equivalent; this demo stands in with an always-present
/// reading so the charging task exercises the debounce state machine
/// without requiring hardware that doesn't exist on this board.
struct StubChargeSense;
impl ChargeSense for StubChargeSense {
    fn backlight_on(&mut self) -> bool {
        true
    }
    fn is_charging(&mut self) -> bool {
        true
    }
}

#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, usb::Driver<'static, peripherals::USB_OTG_FS>>) {
    device.run().await;
}

#[embassy_executor::task]
async fn source_task(
    mut stream_in: usb::Endpoint<'static, peripherals::USB_OTG_FS, embassy_stm32::usb::In>,
    pipeline: &'static mut SourcePipeline<SilentMixer>,
) {
    let _ = source_class::stream_task::<usb::Driver<'static, peripherals::USB_OTG_FS>, _>(&mut stream_in, pipeline)
        .await;
}

#[embassy_executor::task]
async fn hid_iap_task(
    mut report_out: usb::Endpoint<'static, peripherals::USB_OTG_FS, embassy_stm32::usb::Out>,
    transport: &'static mut HidIapTransport,
) {
    let mut sink = DiscardSink;
    let _ = hid_class::rx_task::<usb::Driver<'static, peripherals::USB_OTG_FS>, _>(
        &mut report_out,
        transport,
        HID_HANDLE,
        HID_HANDLE,
        &mut sink,
    )
    .await;
}

#[embassy_executor::task]
async fn charging_task(mut supervisor: ChargingSupervisor<StubChargeSense, embassy_stm32::gpio::Output<'static>>) {
    let mut ticker = Ticker::every(Duration::from_millis(10));
    let mut tick_count = 0u32;
    loop {
        ticker.next().await;
        tick_count += 1;
        if tick_count % 50 == 0 {
            supervisor.poll();
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("dap_usb_bridge source demo starting");

    let p = embassy_stm32::init(embassy_stm32::Config::default());

    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 32]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
    static EP_OUT_BUFFER: StaticCell<[u8; 256 + 64]> = StaticCell::new();
    static SOURCE_PIPELINE: StaticCell<SourcePipeline<SilentMixer>> = StaticCell::new();
    static HID_TRANSPORT: StaticCell<HidIapTransport> = StaticCell::new();

    let mut usb_config = usb::Config::default();
    usb_config.vbus_detection = false;
    let usb_driver = usb::Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        EP_OUT_BUFFER.init([0; 256 + 64]),
        usb_config,
    );

    let mut device_config = embassy_usb::Config::new(0x05ac, 0x1260);
    device_config.manufacturer = Some("dap_usb_bridge");
    device_config.product = Some("source + iAP demo");
    device_config.serial_number = Some("0002");
    device_config.composite_with_iads = true;

    let mut builder = embassy_usb::Builder::new(
        usb_driver,
        device_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 32]),
        &mut [],
        CONTROL_BUF.init([0; 64]),
    );

    let bridge_config = BridgeConfig::new(HW_FREQ_SAMPR_ASCENDING, 0, true);
    let source_endpoints = source_class::build(&mut builder, bridge_config.hw_freq_sampr, bridge_config.high_speed);
    let hid_endpoints = hid_class::build(&mut builder);

    static HID_HANDLER: StaticCell<HidReportHandler> = StaticCell::new();
    builder.handler(HID_HANDLER.init(HidReportHandler));

    static CONTROL_HANDLER: StaticCell<BridgeHandler<NoVolumeEngine>> = StaticCell::new();
    builder.handler(CONTROL_HANDLER.init(BridgeHandler::new(
        ControlDispatcher::new(bridge_config.hw_freq_sampr, bridge_config.default_freq(), bridge_config.numdecimals),
        NoVolumeEngine,
    )));

    let usb_device = builder.build();

    let source_pipeline = SOURCE_PIPELINE.init(SourcePipeline::new(SilentMixer, bridge_config.default_freq()));
    let hid_transport = HID_TRANSPORT.init(HidIapTransport::new());

    let c1 = embassy_stm32::gpio::Output::new(
        p.PC7,
        embassy_stm32::gpio::Level::High,
        embassy_stm32::gpio::Speed::Low,
    );
    let supervisor = ChargingSupervisor::new(StubChargeSense, c1);

    let _ = hid_endpoints.report_in;

    unwrap!(spawner.spawn(usb_task(usb_device)));
    unwrap!(spawner.spawn(source_task(source_endpoints.stream_in, source_pipeline)));
    unwrap!(spawner.spawn(hid_iap_task(hid_endpoints.report_out, hid_transport)));
    unwrap!(spawner.spawn(charging_task(supervisor)));
}
