//! RX reassembly: link-control-byte dispatch, 0x55 sync-marker scanning,
//! multi-fragment iAP reassembly. Grounded on `iap_hid_process_rx()` in
//! `original_source/usb_iap_hid.c`.

use super::reports::out_report_size;
use crate::error::BridgeError;
use crate::hooks::IapSink;

const LINK_SINGLE: u8 = 0x00;
const LINK_FIRST: u8 = 0x02;
const LINK_MIDDLE: u8 = 0x03;
const LINK_LAST: u8 = 0x01;

pub struct Reassembler {
    rx_in_progress: bool,
}

impl Reassembler {
    pub fn new() -> Self {
        Reassembler {
            rx_in_progress: false,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.rx_in_progress
    }

    pub fn reset(&mut self) {
        self.rx_in_progress = false;
    }

    /// Process one `SET_REPORT` OUT transfer. `data` is the full report
    /// as received: `[report_id][link_control][iap bytes...]`.
    pub fn process<S: IapSink>(&mut self, data: &[u8], sink: &mut S) -> Result<(), BridgeError> {
        if data.len() < 3 {
            return Err(BridgeError::ShortHidReport);
        }

        let report_id = data[0];
        let link_ctrl = data[1];
        let received = data.len() - 2;
        let cap = out_report_size(report_id).map(|size| size - 1).unwrap_or(received);
        let iap_len = cap.min(received);
        let iap_data = &data[2..2 + iap_len];

        match link_ctrl & 0x03 {
            LINK_SINGLE | LINK_FIRST => {
                if let Some(sync) = iap_data.iter().position(|&b| b == 0x55) {
                    self.rx_in_progress = link_ctrl == LINK_FIRST;
                    sink.feed(0xFF);
                    for &b in &iap_data[sync..] {
                        sink.feed(b);
                    }
                }
            }
            LINK_MIDDLE | LINK_LAST => {
                if self.rx_in_progress {
                    for &b in iap_data {
                        sink.feed(b);
                    }
                    if link_ctrl == LINK_LAST {
                        self.rx_in_progress = false;
                    }
                }
            }
            _ => unreachable!("link_ctrl & 0x03 is exhaustive over 2 bits"),
        }

        Ok(())
    }
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collector(heapless::Vec<u8, 256>);

    impl IapSink for Collector {
        fn feed(&mut self, byte: u8) {
            let _ = self.0.push(byte);
        }
    }

    fn out_report(id: u8, link_ctrl: u8, payload: &[u8]) -> heapless::Vec<u8, 65> {
        let mut v = heapless::Vec::new();
        let _ = v.push(id);
        let _ = v.push(link_ctrl);
        for &b in payload {
            let _ = v.push(b);
        }
        v
    }

    #[test]
    fn single_report_injects_ff_then_from_sync_onward() {
        let mut payload = [0u8; 6];
        payload[0] = 0x11;
        payload[1] = 0x55;
        payload[2] = 0xAA;
        payload[3] = 0xBB;
        let report = out_report(5, 0x00, &payload[..4]);
        let mut collector = Collector::default();
        let mut r = Reassembler::new();
        r.process(&report, &mut collector).unwrap();
        assert_eq!(&collector.0[..], &[0xFF, 0x55, 0xAA, 0xBB]);
        assert!(!r.is_in_progress());
    }

    #[test]
    fn fragmented_iap_across_three_reports() {
        let payload: [u8; 62] = [0x55; 62];
        let reports = [
            out_report(9, 0x02, &payload),
            out_report(9, 0x03, &payload),
            out_report(9, 0x01, &payload),
        ];
        let mut collector = Collector::default();
        let mut r = Reassembler::new();
        for rep in &reports {
            r.process(rep, &mut collector).unwrap();
        }
        assert!(!r.is_in_progress());
        let mut expected = heapless::Vec::<u8, 256>::new();
        let _ = expected.push(0xFF);
        for _ in 0..3 {
            for &b in &payload {
                let _ = expected.push(b);
            }
        }
        assert_eq!(&collector.0[..], &expected[..]);
    }

    #[test]
    fn middle_fragment_without_first_is_ignored() {
        let payload = [0x55u8, 0xAA];
        let report = out_report(9, 0x03, &payload);
        let mut collector = Collector::default();
        let mut r = Reassembler::new();
        r.process(&report, &mut collector).unwrap();
        assert!(collector.0.is_empty());
    }

    #[test]
    fn no_sync_marker_discards_report() {
        let payload = [0x11u8, 0x22, 0x33];
        let report = out_report(5, 0x00, &payload);
        let mut collector = Collector::default();
        let mut r = Reassembler::new();
        r.process(&report, &mut collector).unwrap();
        assert!(collector.0.is_empty());
    }

    #[test]
    fn short_report_is_an_error() {
        let mut r = Reassembler::new();
        let mut collector = Collector::default();
        assert_eq!(
            r.process(&[1, 0], &mut collector),
            Err(BridgeError::ShortHidReport)
        );
    }
}
