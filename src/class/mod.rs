//! embassy-usb class wiring: ties the pure-logic `sink`/`source`/`hid_iap`/
//! `control` modules to actual USB interfaces, endpoints and the
//! `embassy_usb::Handler` control callbacks. Modeled on the task layout in
//! the teacher's UAC1 speaker example (`usb_streaming_task`,
//! `usb_feedback_task`, `usb_control_task`, one `embassy_executor::task`
//! per direction) — generalized here to two personalities plus a HID-iAP
//! side channel instead of one fixed speaker class.

pub mod hid_class;
pub mod sink_class;
pub mod source_class;

use embassy_usb::control::{InResponse, OutResponse, Recipient as WireRecipient, Request};
use embassy_usb::Handler;

use crate::control::{ControlDispatcher, Recipient};
use crate::hooks::VolumeEngine;

/// Bridges `embassy_usb::Handler` control callbacks to [`ControlDispatcher`].
/// `wValue` carries `(control selector << 8) | channel`; `wIndex` carries
/// `(entity/interface id << 8) | interface number` for interface-recipient
/// requests, or the endpoint address for endpoint-recipient ones.
pub struct BridgeHandler<E: VolumeEngine> {
    pub dispatcher: ControlDispatcher,
    pub engine: E,
}

impl<E: VolumeEngine> BridgeHandler<E> {
    pub fn new(dispatcher: ControlDispatcher, engine: E) -> Self {
        BridgeHandler { dispatcher, engine }
    }

    fn recipient(req: &Request) -> Option<Recipient> {
        match req.recipient {
            WireRecipient::Endpoint => Some(Recipient::Endpoint),
            WireRecipient::Interface => Some(Recipient::Interface),
            _ => None,
        }
    }
}

impl<E: VolumeEngine> Handler for BridgeHandler<E> {
    fn control_out(&mut self, req: Request, data: &[u8]) -> Option<OutResponse> {
        let recipient = Self::recipient(&req)?;
        let selector = (req.value >> 8) as u8;
        let channel = (req.value & 0xFF) as u8;
        let entity_or_interface = (req.index >> 8) as u8;
        match self.dispatcher.control_out(
            recipient,
            req.request,
            selector,
            channel,
            entity_or_interface,
            data,
            &mut self.engine,
        ) {
            Ok(()) => Some(OutResponse::Accepted),
            Err(_) => Some(OutResponse::Rejected),
        }
    }

    fn control_in<'a>(&'a mut self, req: Request, buf: &'a mut [u8]) -> Option<InResponse<'a>> {
        let recipient = Self::recipient(&req)?;
        let selector = (req.value >> 8) as u8;
        let channel = (req.value & 0xFF) as u8;
        let entity_or_interface = (req.index >> 8) as u8;
        match self.dispatcher.control_in(
            recipient,
            req.request,
            selector,
            channel,
            entity_or_interface,
            &self.engine,
        ) {
            Ok(bytes) => {
                let n = bytes.len();
                buf[..n].copy_from_slice(&bytes);
                Some(InResponse::Accepted(&buf[..n]))
            }
            Err(_) => Some(InResponse::Rejected),
        }
    }
}
