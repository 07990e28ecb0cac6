//! Fixed-layout descriptor byte fields, little-endian multi-byte values.
//! Grounded on the packed structs in `original_source/usbstack/usb_audio.c`
//! (`usb_ac_input_terminal`, `usb_ac_output_terminal`,
//! `usb_ac_feature_unit_8_2`, `usb_as_interface`,
//! `usb_as_format_type_i_discrete`, `usb_as_iso_audio_endpoint`,
//! `usb_as_iso_synch_endpoint`), emitted here as raw bytes rather than
//! `#[repr(packed)]` structs since the assembler only ever needs to write
//! them once into a contiguous buffer.

pub const USB_DT_CS_INTERFACE: u8 = 0x24;
pub const USB_DT_CS_ENDPOINT: u8 = 0x25;
pub const USB_DT_ENDPOINT: u8 = 0x05;

pub const AC_SUBTYPE_HEADER: u8 = 0x01;
pub const AC_SUBTYPE_INPUT_TERMINAL: u8 = 0x02;
pub const AC_SUBTYPE_OUTPUT_TERMINAL: u8 = 0x03;
pub const AC_SUBTYPE_FEATURE_UNIT: u8 = 0x06;

pub const AS_SUBTYPE_GENERAL: u8 = 0x01;
pub const AS_SUBTYPE_FORMAT_TYPE: u8 = 0x02;
pub const AS_FORMAT_TYPE_I: u8 = 0x01;
pub const AS_EP_SUBTYPE_GENERAL: u8 = 0x01;

pub const TERMINAL_TYPE_USB_STREAMING: u16 = 0x0101;
pub const TERMINAL_TYPE_SPEAKER: u16 = 0x0301;
pub const TERMINAL_TYPE_MICROPHONE: u16 = 0x0201;

pub const EP_ATTR_ISOC_ASYNC_DATA: u8 = 0x01 | 0x04 | 0x00; // ISOC | SYNC_ASYNC | USAGE_DATA
pub const EP_ATTR_ISOC_NONE_DATA: u8 = 0x01 | 0x00 | 0x00; // ISOC | SYNC_NONE | USAGE_DATA
pub const EP_ATTR_ISOC_NONE_FEEDBACK: u8 = 0x01 | 0x00 | 0x10; // ISOC | SYNC_NONE | USAGE_FEEDBACK

pub const FU_CONTROL_MUTE: u8 = 0x01;
pub const FU_CONTROL_VOLUME: u8 = 0x02;

/// Append helpers onto a `heapless::Vec<u8, N>` byte buffer, mirroring the
/// little-endian field-by-field writes the original performs via packed
/// structs.
pub trait DescriptorWriter {
    fn put_u8(&mut self, v: u8);
    fn put_u16(&mut self, v: u16);
}

impl<const N: usize> DescriptorWriter for heapless::Vec<u8, N> {
    fn put_u8(&mut self, v: u8) {
        let _ = self.push(v);
    }
    fn put_u16(&mut self, v: u16) {
        let _ = self.push((v & 0xFF) as u8);
        let _ = self.push((v >> 8) as u8);
    }
}
