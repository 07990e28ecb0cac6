//! HID-iAP interface construction and RX/TX tasks, §4.3. Grounded on the
//! endpoint/report-ID tables in `original_source/usb_iap_hid.c`; the
//! report descriptor below declares one input and one output report per
//! entry in [`crate::hid_iap::reports::IN_REPORTS`]/
//! [`crate::hid_iap::reports::OUT_REPORTS`] under a vendor-defined usage
//! page, which is what lets a single fixed-size HID interrupt endpoint
//! carry variable-length reassembled iAP frames.

use embassy_usb::control::{InResponse, Recipient as WireRecipient, Request, RequestType};
use embassy_usb::driver::{Driver, Endpoint, EndpointError, EndpointIn, EndpointOut};
use embassy_usb::{Builder, Handler};

use crate::error::BridgeError;
use crate::hid_iap::{HidIapTransport, TransportHandle};
use crate::hooks::IapSink;

const CLASS_HID: u8 = 0x03;
const SUBCLASS_NONE: u8 = 0x00;
const PROTOCOL_NONE: u8 = 0x00;
const MAX_REPORT_LEN: u16 = 64;
const POLL_INTERVAL_MS: u8 = 4;
const HID_DESCRIPTOR_TYPE: u8 = 0x21;
const HID_REPORT_DESCRIPTOR_TYPE: u8 = 0x22;
const GET_DESCRIPTOR: u8 = 0x06;

/// Fixed vendor-usage-page HID report descriptor. Exact bytes from Apple's
/// iPod firmware (via the ipod-gadget reference implementation); one
/// report per [`crate::hid_iap::reports::IN_REPORTS`]/
/// [`crate::hid_iap::reports::OUT_REPORTS`] entry, in the same order.
#[rustfmt::skip]
pub const REPORT_DESCRIPTOR: [u8; 96] = [
    0x06, 0x00, 0xff, 0x09, 0x01, 0xa1, 0x01, 0x75, 0x08, 0x26, 0x80, 0x00,
    0x15, 0x00, 0x09, 0x01, 0x85, 0x01, 0x95, 0x0c, 0x82, 0x02, 0x01, 0x09,
    0x01, 0x85, 0x02, 0x95, 0x0e, 0x82, 0x02, 0x01, 0x09, 0x01, 0x85, 0x03,
    0x95, 0x14, 0x82, 0x02, 0x01, 0x09, 0x01, 0x85, 0x04, 0x95, 0x3f, 0x82,
    0x02, 0x01, 0x09, 0x01, 0x85, 0x05, 0x95, 0x08, 0x92, 0x02, 0x01, 0x09,
    0x01, 0x85, 0x06, 0x95, 0x0a, 0x92, 0x02, 0x01, 0x09, 0x01, 0x85, 0x07,
    0x95, 0x0e, 0x92, 0x02, 0x01, 0x09, 0x01, 0x85, 0x08, 0x95, 0x14, 0x92,
    0x02, 0x01, 0x09, 0x01, 0x85, 0x09, 0x95, 0x3f, 0x92, 0x02, 0x01, 0xc0,
];

/// Class-specific HID descriptor (bLength=9, bDescriptorType=0x21):
/// bcdHID 1.11, no country code, one report descriptor of
/// [`REPORT_DESCRIPTOR`]'s length.
const fn hid_descriptor_bytes() -> [u8; 9] {
    let len = REPORT_DESCRIPTOR.len();
    [
        9,
        HID_DESCRIPTOR_TYPE,
        0x11,
        0x01,
        0x00,
        0x01,
        HID_REPORT_DESCRIPTOR_TYPE,
        (len & 0xFF) as u8,
        (len >> 8) as u8,
    ]
}

pub struct HidEndpoints<'d, D: Driver<'d>> {
    pub report_in: D::EndpointIn,
    pub report_out: D::EndpointOut,
}

pub fn build<'d, D: Driver<'d>>(builder: &mut Builder<'d, D>) -> HidEndpoints<'d, D> {
    let mut func = builder.function(CLASS_HID, SUBCLASS_NONE, PROTOCOL_NONE);
    let mut iface = func.interface();
    let mut alt = iface.alt_setting(CLASS_HID, SUBCLASS_NONE, PROTOCOL_NONE, None);

    let hid_descriptor = hid_descriptor_bytes();
    alt.descriptor(HID_DESCRIPTOR_TYPE, &hid_descriptor);

    let report_in = alt.endpoint_interrupt_in(MAX_REPORT_LEN, POLL_INTERVAL_MS);
    let report_out = alt.endpoint_interrupt_out(MAX_REPORT_LEN, POLL_INTERVAL_MS);

    HidEndpoints { report_in, report_out }
}

/// Answers the standard `GET_DESCRIPTOR(Report)` control transfer hosts
/// issue after enumerating the HID interface; every other request passes
/// through untouched.
pub struct HidReportHandler;

impl Handler for HidReportHandler {
    fn control_in<'a>(&'a mut self, req: Request, buf: &'a mut [u8]) -> Option<InResponse<'a>> {
        if req.request_type != RequestType::Standard
            || req.recipient != WireRecipient::Interface
            || req.request != GET_DESCRIPTOR
            || (req.value >> 8) as u8 != HID_REPORT_DESCRIPTOR_TYPE
        {
            return None;
        }
        let n = REPORT_DESCRIPTOR.len().min(buf.len());
        buf[..n].copy_from_slice(&REPORT_DESCRIPTOR[..n]);
        Some(InResponse::Accepted(&buf[..n]))
    }
}

#[derive(Debug)]
pub struct Disconnected;

impl From<EndpointError> for Disconnected {
    fn from(_: EndpointError) -> Self {
        Disconnected
    }
}

/// One `SET_REPORT`-equivalent interrupt OUT transfer per loop iteration,
/// reassembled and fed to `sink`, installing the transport lazily on first
/// traffic per §4.3's "no eager registration" requirement.
pub async fn rx_task<'d, D: Driver<'d>, S: IapSink>(
    ep: &mut D::EndpointOut,
    transport: &mut HidIapTransport,
    hid_handle: TransportHandle,
    current_handle: TransportHandle,
    sink: &mut S,
) -> Result<(), Disconnected> {
    let mut buf = [0u8; MAX_REPORT_LEN as usize];
    loop {
        ep.wait_enabled().await;
        transport.init_connection();
        loop {
            let n = match ep.read(&mut buf).await {
                Ok(n) => n,
                Err(EndpointError::Disabled) => break,
                Err(e) => return Err(e.into()),
            };
            if let Err(err) = transport.on_set_report(&buf[..n], current_handle, hid_handle, sink) {
                if matches!(err, BridgeError::ShortHidReport) {
                    continue;
                }
            }
        }
        transport.disconnect();
    }
}

/// Frames an accessory-originated iAP payload and sends it as one
/// interrupt IN report.
pub async fn send_iap_payload<'d, D: Driver<'d>>(
    ep: &mut D::EndpointIn,
    payload: &[u8],
) -> Result<(), Disconnected> {
    let framed = crate::hid_iap::frame_tx(payload);
    ep.write(&framed).await?;
    Ok(())
}
