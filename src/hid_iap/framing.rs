//! TX framing: pick the smallest IN report that fits the payload, rewrite
//! a leading serial-sync byte, and zero-pad to the report's fixed size.
//! Grounded on `iap_hid_tx()` in `original_source/usb_iap_hid.c`.

use super::reports::smallest_in_report_for;

/// Largest possible framed report: ID byte + 63-byte payload (report 4).
pub const MAX_FRAMED_LEN: usize = 64;

/// Frame `payload` into a complete HID IN report: `[report_id][payload...
/// ][zero padding]`, total length `1 + report_size`. If no report fits,
/// the largest (ID 4) is used and the payload is truncated, per §4.3.
pub fn frame_tx(payload: &[u8]) -> heapless::Vec<u8, MAX_FRAMED_LEN> {
    let (id, report_size) = smallest_in_report_for(payload.len());
    let n = payload.len().min(report_size);

    let mut out = heapless::Vec::new();
    let _ = out.push(id);
    for (i, &b) in payload[..n].iter().enumerate() {
        // The HID-over-iAP variant omits the serial sync byte: a leading
        // 0xFF stands in for it and is rewritten to 0x00 on the wire.
        let b = if i == 0 && b == 0xFF { 0x00 } else { b };
        let _ = out.push(b);
    }
    while out.len() < 1 + report_size {
        let _ = out.push(0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_exactly_filling_a_report_needs_no_padding() {
        let mut payload = [0x42u8; 14];
        payload[0] = 0xFF;
        let framed = frame_tx(&payload);
        assert_eq!(framed[0], 2); // report 2, capacity 14
        assert_eq!(framed.len(), 15);
        assert_eq!(framed[1], 0x00); // rewritten sync byte
        assert_eq!(&framed[2..], &payload[1..]);
    }

    #[test]
    fn ten_byte_payload_picks_smallest_report_and_pads() {
        let mut payload = [0x10u8; 10];
        payload[0] = 0xFF;
        let framed = frame_tx(&payload);
        assert_eq!(framed[0], 1); // report 1, capacity 12 >= 10
        assert_eq!(framed.len(), 13);
        assert_eq!(framed[1], 0x00);
        assert_eq!(&framed[11..], &[0u8, 0u8]); // two pad bytes
    }

    #[test]
    fn oversized_payload_is_truncated_to_report_4() {
        let payload = [0x7Fu8; 100];
        let framed = frame_tx(&payload);
        assert_eq!(framed[0], 4);
        assert_eq!(framed.len(), 64);
    }

    #[test]
    fn non_sync_leading_byte_is_untouched() {
        let payload = [0x01u8, 0x02, 0x03];
        let framed = frame_tx(&payload);
        assert_eq!(framed[1], 0x01);
    }
}
