//! dB <-> device-native volume conversion, §4.4. The wire format is an
//! IEEE-signed 16-bit value in 1/256 dB steps; the device's native volume
//! carries `numdecimals` fractional decimal digits.

/// `dB_device = int16(usb) * 10^numdecimals / 256`.
pub fn usb_audio_volume_to_db(usb: i16, numdecimals: u8) -> i32 {
    let scale = 10i64.pow(numdecimals as u32);
    ((usb as i64 * scale) / 256) as i32
}

/// Inverse of [`usb_audio_volume_to_db`].
pub fn db_to_usb_audio_volume(device: i32, numdecimals: u8) -> i16 {
    let scale = 10i64.pow(numdecimals as u32);
    ((device as i64 * 256) / scale) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_minus_2db_with_zero_decimals() {
        let usb = 0xFE00u16 as i16;
        assert_eq!(usb_audio_volume_to_db(usb, 0), -2);
        assert_eq!(db_to_usb_audio_volume(-2, 0), usb);
    }

    #[test]
    fn round_trip_on_256_aligned_values() {
        for nd in 0..=2u8 {
            for steps in [-5i16, -1, 0, 1, 5] {
                let usb = steps.wrapping_mul(256);
                let db = usb_audio_volume_to_db(usb, nd);
                assert_eq!(db_to_usb_audio_volume(db, nd), usb);
            }
        }
    }

    #[test]
    fn positive_full_scale() {
        // +127.9961 dB is the top of the representable range.
        let usb = i16::MAX;
        let db = usb_audio_volume_to_db(usb, 0);
        assert_eq!(db, 127);
    }
}
