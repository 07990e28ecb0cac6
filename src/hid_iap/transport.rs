//! Lazy transport install: the first `SET_REPORT` that actually produces
//! parser input swaps the iAP layer's send handle over to the HID
//! transport, restoring the previous handle on disconnect. Grounded on
//! the `saved_transport_send`/`iap_hid_transport_active` dance in
//! `original_source/usb_iap_hid.c`, re-architected per Design Notes §9 as
//! an owned opaque token rather than a global function pointer.

/// An opaque handle identifying whichever transport previously owned the
/// iAP send path. The host application defines what this means (e.g. a
/// serial port handle); this crate only stores and swaps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportHandle(pub u32);

pub struct LazyTransport {
    active: bool,
    installed: bool,
    saved: Option<TransportHandle>,
}

impl LazyTransport {
    pub fn new() -> Self {
        LazyTransport {
            active: false,
            installed: false,
            saved: None,
        }
    }

    /// `init_connection()`: marks the interface active without touching
    /// the send handle.
    pub fn init_connection(&mut self) {
        self.active = true;
    }

    /// Called once real HID-iAP data has been reassembled. Installs the
    /// HID send handle, saving whatever handle was previously current.
    /// Returns `true` the first time it runs (the caller should call
    /// `iap_setup(0)` equivalent exactly then).
    pub fn install_if_needed(&mut self, current: TransportHandle, hid_handle: TransportHandle) -> bool {
        if self.installed {
            return false;
        }
        self.saved = Some(current);
        self.installed = true;
        let _ = hid_handle;
        true
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// `disconnect()`: restores the saved handle only if one was
    /// installed, per "accessories using USB for audio only must not
    /// lose serial-iAP control".
    pub fn disconnect(&mut self) -> Option<TransportHandle> {
        self.active = false;
        if self.installed {
            self.installed = false;
            self.saved.take()
        } else {
            None
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Default for LazyTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIAL: TransportHandle = TransportHandle(1);
    const HID: TransportHandle = TransportHandle(2);

    #[test]
    fn install_only_happens_once() {
        let mut t = LazyTransport::new();
        t.init_connection();
        assert!(t.install_if_needed(SERIAL, HID));
        assert!(!t.install_if_needed(SERIAL, HID));
    }

    #[test]
    fn disconnect_restores_saved_handle_only_if_installed() {
        let mut t = LazyTransport::new();
        t.init_connection();
        assert_eq!(t.disconnect(), None); // never installed: audio-only accessory
    }

    #[test]
    fn disconnect_after_install_restores_serial() {
        let mut t = LazyTransport::new();
        t.init_connection();
        t.install_if_needed(SERIAL, HID);
        assert_eq!(t.disconnect(), Some(SERIAL));
        assert!(!t.is_installed());
    }
}
