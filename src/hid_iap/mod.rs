//! HID-framed iPod Accessory Protocol transport, §4.3. Presents a
//! vendor-usage-page HID interface, reassembles fragmented `SET_REPORT`
//! transfers into an iAP byte stream, and frames accessory-originated
//! bytes back into HID IN reports.

pub mod framing;
pub mod reassembly;
pub mod reports;
pub mod transport;

pub use framing::frame_tx;
pub use reassembly::Reassembler;
pub use transport::{LazyTransport, TransportHandle};

/// Length of the fixed vendor-usage HID report descriptor in
/// [`crate::class::hid_class::REPORT_DESCRIPTOR`], per §4.3/§6.
pub const REPORT_DESCRIPTOR_LEN: usize = 96;

use crate::error::BridgeError;
use crate::hooks::IapSink;

/// Ties reassembly, lazy transport install, and HID-interface activity
/// flags into one unit, mirroring the file-scope statics in
/// `usb_iap_hid.c`.
pub struct HidIapTransport {
    reassembler: Reassembler,
    transport: LazyTransport,
}

impl HidIapTransport {
    pub fn new() -> Self {
        HidIapTransport {
            reassembler: Reassembler::new(),
            transport: LazyTransport::new(),
        }
    }

    pub fn init_connection(&mut self) {
        self.transport.init_connection();
    }

    pub fn disconnect(&mut self) -> Option<TransportHandle> {
        self.reassembler.reset();
        self.transport.disconnect()
    }

    /// Handle one `SET_REPORT` OUT transfer, lazily installing the HID
    /// transport on the first report and feeding reassembled bytes to
    /// `sink`.
    pub fn on_set_report<S: IapSink>(
        &mut self,
        data: &[u8],
        current_handle: TransportHandle,
        hid_handle: TransportHandle,
        sink: &mut S,
    ) -> Result<(), BridgeError> {
        self.transport.install_if_needed(current_handle, hid_handle);
        self.reassembler.process(data, sink)
    }
}

impl Default for HidIapTransport {
    fn default() -> Self {
        Self::new()
    }
}
