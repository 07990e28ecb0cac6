//! Wire-exact little-endian byte assembly for the two descriptor layouts,
//! §4.5/§6. `wTotalLength` in the Audio Control header covers only the AC
//! class-specific descriptor set (header + terminals + feature unit), not
//! the Audio Streaming descriptors that follow it on the wire — standard
//! UAC1 semantics, matching `usb_audio_init`'s `wTotalLength` accumulation
//! loop over `ac_*_cs_descriptors_list` only.

use super::layout::{
    AC_PLAYBACK_FEATURE, AC_PLAYBACK_INPUT, AC_PLAYBACK_OUTPUT, AC_SOURCE_INPUT, AC_SOURCE_OUTPUT,
    FEEDBACK_P,
};
use super::records::*;

/// Upper bound on the AC class-specific descriptor set for either layout.
pub const MAX_AC_LEN: usize = 64;
/// Upper bound on the AS class-specific + endpoint descriptor set,
/// dominated by the discrete frequency table (up to the full hardware
/// rate table).
pub const MAX_AS_LEN: usize = 256;

/// The AS class-specific descriptors and endpoint descriptors, kept as
/// separate chunks (rather than one concatenated buffer) so the class
/// wiring layer can hand each one to the right `embassy_usb` builder call
/// without re-parsing lengths out of a byte stream.
pub struct Assembled {
    pub ac: heapless::Vec<u8, MAX_AC_LEN>,
    pub as_general: heapless::Vec<u8, 7>,
    pub format_type_i: heapless::Vec<u8, 64>,
    pub data_endpoint: heapless::Vec<u8, 9>,
    pub sync_endpoint: Option<heapless::Vec<u8, 9>>,
}

/// Sink-only layout (§4.5): AC header `bInCollection = 2`, playback input
/// terminal (3), feature unit (4), output terminal (5); descending
/// frequency table; asynchronous feedback endpoint.
pub fn assemble_sink(streaming_interface: u8, freq_table: &[u32]) -> Assembled {
    let mut ac: heapless::Vec<u8, MAX_AC_LEN> = heapless::Vec::new();

    let input_terminal = input_terminal_bytes(AC_PLAYBACK_INPUT, TERMINAL_TYPE_USB_STREAMING);
    let feature_unit = feature_unit_bytes(AC_PLAYBACK_FEATURE, AC_PLAYBACK_INPUT);
    let output_terminal =
        output_terminal_bytes(AC_PLAYBACK_OUTPUT, TERMINAL_TYPE_SPEAKER, AC_PLAYBACK_FEATURE);

    let body_len = input_terminal.len() + feature_unit.len() + output_terminal.len();
    let header = ac_header_bytes(2, &[streaming_interface, streaming_interface], body_len);

    extend(&mut ac, &header);
    extend(&mut ac, &input_terminal);
    extend(&mut ac, &feature_unit);
    extend(&mut ac, &output_terminal);

    Assembled {
        ac,
        as_general: as_general_bytes(AC_PLAYBACK_INPUT),
        format_type_i: format_type_i_bytes(freq_table),
        data_endpoint: iso_data_endpoint_bytes(EP_ATTR_ISOC_ASYNC_DATA, BUFFER_SIZE_SINK, true),
        sync_endpoint: Some(iso_feedback_endpoint_bytes()),
    }
}

/// Source-only layout (§4.5): AC header `bInCollection = 1`, microphone
/// input terminal (1), streaming output terminal (2), no feature unit;
/// ascending frequency table; no sync endpoint.
pub fn assemble_source(streaming_interface: u8, freq_table_ascending: &[u32], high_speed: bool) -> Assembled {
    let mut ac: heapless::Vec<u8, MAX_AC_LEN> = heapless::Vec::new();

    let input_terminal = input_terminal_bytes(AC_SOURCE_INPUT, TERMINAL_TYPE_MICROPHONE);
    let output_terminal =
        output_terminal_bytes(AC_SOURCE_OUTPUT, TERMINAL_TYPE_USB_STREAMING, AC_SOURCE_INPUT);

    let body_len = input_terminal.len() + output_terminal.len();
    let header = ac_header_bytes(1, &[streaming_interface], body_len);

    extend(&mut ac, &header);
    extend(&mut ac, &input_terminal);
    extend(&mut ac, &output_terminal);

    let _ = high_speed; // folded into bInterval by the class wiring layer

    Assembled {
        ac,
        as_general: as_general_bytes(AC_SOURCE_OUTPUT),
        format_type_i: format_type_i_bytes(freq_table_ascending),
        data_endpoint: iso_data_endpoint_bytes(EP_ATTR_ISOC_NONE_DATA, 192, false),
        sync_endpoint: None,
    }
}

const BUFFER_SIZE_SINK: u16 = 1024;

fn extend<const N: usize>(dst: &mut heapless::Vec<u8, N>, src: &[u8]) {
    for &b in src {
        let _ = dst.push(b);
    }
}

fn ac_header_bytes(in_collection: u8, interface_numbers: &[u8], body_len: usize) -> heapless::Vec<u8, 16> {
    let mut v: heapless::Vec<u8, 16> = heapless::Vec::new();
    let fixed_len = 8 + interface_numbers.len();
    v.put_u8(fixed_len as u8);
    v.put_u8(USB_DT_CS_INTERFACE);
    v.put_u8(AC_SUBTYPE_HEADER);
    v.put_u16(0x0100); // bcdADC
    v.put_u16((fixed_len + body_len) as u16); // wTotalLength
    v.put_u8(in_collection);
    for &n in interface_numbers {
        v.put_u8(n);
    }
    v
}

fn input_terminal_bytes(id: u8, terminal_type: u16) -> heapless::Vec<u8, 12> {
    let mut v: heapless::Vec<u8, 12> = heapless::Vec::new();
    v.put_u8(12);
    v.put_u8(USB_DT_CS_INTERFACE);
    v.put_u8(AC_SUBTYPE_INPUT_TERMINAL);
    v.put_u8(id);
    v.put_u16(terminal_type);
    v.put_u8(0); // bAssocTerminal
    v.put_u8(2); // bNrChannels (stereo)
    v.put_u16(0x0003); // wChannelConfig (left+right front)
    v.put_u8(0); // iChannelNames
    v.put_u8(0); // iTerminal
    v
}

fn output_terminal_bytes(id: u8, terminal_type: u16, source_id: u8) -> heapless::Vec<u8, 9> {
    let mut v: heapless::Vec<u8, 9> = heapless::Vec::new();
    v.put_u8(9);
    v.put_u8(USB_DT_CS_INTERFACE);
    v.put_u8(AC_SUBTYPE_OUTPUT_TERMINAL);
    v.put_u8(id);
    v.put_u16(terminal_type);
    v.put_u8(0); // bAssocTerminal
    v.put_u8(source_id);
    v.put_u8(0); // iTerminal
    v
}

fn feature_unit_bytes(id: u8, source_id: u8) -> heapless::Vec<u8, 10> {
    // Per-channel controls bitmap: master + 2 channels, 1 byte each.
    let mut v: heapless::Vec<u8, 10> = heapless::Vec::new();
    v.put_u8(10);
    v.put_u8(USB_DT_CS_INTERFACE);
    v.put_u8(AC_SUBTYPE_FEATURE_UNIT);
    v.put_u8(id);
    v.put_u8(source_id);
    v.put_u8(1); // bControlSize
    v.put_u8(FU_CONTROL_MUTE | FU_CONTROL_VOLUME); // master channel
    v.put_u8(0); // channel 1
    v.put_u8(0); // channel 2
    v.put_u8(0); // iFeature
    v
}

fn as_general_bytes(terminal_link: u8) -> heapless::Vec<u8, 7> {
    let mut v: heapless::Vec<u8, 7> = heapless::Vec::new();
    v.put_u8(7);
    v.put_u8(USB_DT_CS_INTERFACE);
    v.put_u8(AS_SUBTYPE_GENERAL);
    v.put_u8(terminal_link);
    v.put_u8(0); // bDelay
    v.put_u16(0x0001); // wFormatTag: PCM
    v
}

fn format_type_i_bytes(freq_table: &[u32]) -> heapless::Vec<u8, 64> {
    let mut v: heapless::Vec<u8, 64> = heapless::Vec::new();
    let n = freq_table.len().min(20);
    v.put_u8((8 + 3 * n) as u8);
    v.put_u8(USB_DT_CS_INTERFACE);
    v.put_u8(AS_SUBTYPE_FORMAT_TYPE);
    v.put_u8(AS_FORMAT_TYPE_I);
    v.put_u8(2); // bNrChannels
    v.put_u8(2); // bSubframeSize (16-bit)
    v.put_u8(16); // bBitResolution
    v.put_u8(n as u8); // bSamFreqType: discrete
    for &freq in &freq_table[..n] {
        v.put_u8((freq & 0xFF) as u8);
        v.put_u8(((freq >> 8) & 0xFF) as u8);
        v.put_u8(((freq >> 16) & 0xFF) as u8);
    }
    v
}

fn iso_data_endpoint_bytes(attributes: u8, max_packet_size: u16, has_sync: bool) -> heapless::Vec<u8, 9> {
    let mut v: heapless::Vec<u8, 9> = heapless::Vec::new();
    v.put_u8(9);
    v.put_u8(USB_DT_ENDPOINT);
    v.put_u8(0); // bEndpointAddress, filled in by the class wiring layer
    v.put_u8(attributes);
    v.put_u16(max_packet_size);
    v.put_u8(0); // bInterval, filled in by the class wiring layer
    v.put_u8(0); // bRefresh
    v.put_u8(if has_sync { 0xFF } else { 0 }); // bSynchAddress, patched to the feedback EP address
    v
}

fn iso_feedback_endpoint_bytes() -> heapless::Vec<u8, 9> {
    let mut v: heapless::Vec<u8, 9> = heapless::Vec::new();
    v.put_u8(9);
    v.put_u8(USB_DT_ENDPOINT);
    v.put_u8(0); // bEndpointAddress, filled in by the class wiring layer
    v.put_u8(EP_ATTR_ISOC_NONE_FEEDBACK);
    v.put_u16(4);
    v.put_u8(0); // bInterval, filled in by the class wiring layer
    v.put_u8(10 - FEEDBACK_P);
    v.put_u8(0); // bSynchAddress MUST be zero
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_ac_header_references_streaming_interface_twice() {
        let asm = assemble_sink(1, &[96_000, 48_000, 44_100]);
        assert_eq!(asm.ac[2], AC_SUBTYPE_HEADER);
        assert_eq!(asm.ac[6], 2); // bInCollection
        assert_eq!(asm.ac[7], 1);
        assert_eq!(asm.ac[8], 1);
    }

    #[test]
    fn sink_feedback_endpoint_refresh_is_ten_minus_p() {
        let asm = assemble_sink(1, &[44_100]);
        let fb = asm.sync_endpoint.unwrap();
        assert_eq!(fb[7], 10 - FEEDBACK_P);
        assert_eq!(fb[8], 0); // bSynchAddress must be zero
    }

    #[test]
    fn source_layout_has_no_feature_unit() {
        let asm = assemble_source(1, &[22_050, 44_100, 48_000], true);
        assert_eq!(asm.ac[6], 1); // bInCollection
        // body is input terminal (12 bytes) + output terminal (9 bytes), no feature unit
        assert_eq!(asm.ac.len(), 8 + 1 + 12 + 9);
    }

    #[test]
    fn source_data_endpoint_has_no_sync_address() {
        let asm = assemble_source(1, &[48_000], false);
        assert!(asm.sync_endpoint.is_none());
        assert_eq!(asm.data_endpoint[8], 0);
    }
}
