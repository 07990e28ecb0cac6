//! Error kinds, per spec §7. Steady-state ring/feedback paths are infallible
//! by construction (overflow/underflow are states, not `Err`s); this enum
//! only covers setup-time failures and malformed control requests.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(test), derive(defmt::Format))]
pub enum BridgeError {
    /// The host allocator could not provide the sink/DSP/TX buffers.
    AllocFailed,
    /// A control request had an invalid length, selector, or channel index.
    BadControlRequest,
    /// A control request targeted an endpoint/interface/entity this bridge
    /// does not own.
    UnsupportedRecipient,
    /// A HID-iAP report carried fewer bytes than a report ID plus a
    /// link-control byte requires.
    ShortHidReport,
}

impl core::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            BridgeError::AllocFailed => "buffer allocation failed",
            BridgeError::BadControlRequest => "malformed control request",
            BridgeError::UnsupportedRecipient => "unsupported control recipient",
            BridgeError::ShortHidReport => "HID report too short to carry a link-control byte",
        };
        f.write_str(msg)
    }
}
