//! Audio class control-request dispatcher, §4.4. Endpoint-recipient
//! requests reach only the sampling-frequency control; interface-recipient
//! requests reach only the playback feature unit (ID 3). Embassy-usb's
//! `Handler::control_out` already stages the data before calling in, so
//! the original's two-pass SET_CUR (RECEIVE then decode) collapses into
//! one call here — see the concurrency mapping in the design notes.

use super::feature_unit::FeatureUnit;
use super::frequency::{decode_freq_bytes, encode_freq_bytes, nearest};
use crate::error::BridgeError;
use crate::hooks::VolumeEngine;

pub const REQ_SET_CUR: u8 = 0x01;
pub const REQ_GET_CUR: u8 = 0x81;
pub const REQ_GET_MIN: u8 = 0x82;
pub const REQ_GET_MAX: u8 = 0x83;
pub const REQ_GET_RES: u8 = 0x84;

pub const CS_MUTE: u8 = 0x01;
pub const CS_VOLUME: u8 = 0x02;
pub const CS_SAMPLING_FREQ: u8 = 0x01;

pub const PLAYBACK_FEATURE_UNIT_ID: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Endpoint,
    Interface,
}

/// Sampling-frequency endpoint control: snap-to-nearest, 3 bytes LE.
pub struct FrequencyControl {
    table: &'static [u32],
    current: u32,
}

impl FrequencyControl {
    pub fn new(table: &'static [u32], default: u32) -> Self {
        FrequencyControl {
            table,
            current: nearest(table, default),
        }
    }

    pub fn set_cur(&mut self, data: &[u8]) -> Result<(), BridgeError> {
        let bytes: [u8; 3] = data.try_into().map_err(|_| BridgeError::BadControlRequest)?;
        self.current = nearest(self.table, decode_freq_bytes(&bytes));
        Ok(())
    }

    pub fn get_cur(&self) -> [u8; 3] {
        encode_freq_bytes(self.current)
    }

    pub fn current(&self) -> u32 {
        self.current
    }
}

/// Combines the endpoint frequency control and the playback feature unit
/// into the one dispatcher the class wiring calls into from its
/// `embassy_usb::Handler` impl.
pub struct ControlDispatcher {
    pub frequency: FrequencyControl,
    pub feature_unit: FeatureUnit,
}

impl ControlDispatcher {
    pub fn new(table: &'static [u32], default_freq: u32, numdecimals: u8) -> Self {
        ControlDispatcher {
            frequency: FrequencyControl::new(table, default_freq),
            feature_unit: FeatureUnit::new(numdecimals),
        }
    }

    pub fn control_out<E: VolumeEngine>(
        &mut self,
        recipient: Recipient,
        request: u8,
        control_selector: u8,
        channel: u8,
        entity_or_interface: u8,
        data: &[u8],
        engine: &mut E,
    ) -> Result<(), BridgeError> {
        if request != REQ_SET_CUR {
            return Err(BridgeError::BadControlRequest);
        }
        match (recipient, control_selector) {
            (Recipient::Endpoint, CS_SAMPLING_FREQ) => self.frequency.set_cur(data),
            (Recipient::Interface, CS_MUTE) if entity_or_interface == PLAYBACK_FEATURE_UNIT_ID => {
                let mute = *data.first().ok_or(BridgeError::BadControlRequest)? != 0;
                self.feature_unit.set_mute(channel, mute, engine)
            }
            (Recipient::Interface, CS_VOLUME) if entity_or_interface == PLAYBACK_FEATURE_UNIT_ID => {
                let bytes: [u8; 2] = data.try_into().map_err(|_| BridgeError::BadControlRequest)?;
                let wire = i16::from_le_bytes(bytes);
                self.feature_unit.set_volume_wire(channel, wire, engine)
            }
            _ => Err(BridgeError::UnsupportedRecipient),
        }
    }

    pub fn control_in<E: VolumeEngine>(
        &self,
        recipient: Recipient,
        request: u8,
        control_selector: u8,
        channel: u8,
        entity_or_interface: u8,
        engine: &E,
    ) -> Result<heapless::Vec<u8, 3>, BridgeError> {
        match (recipient, control_selector) {
            (Recipient::Endpoint, CS_SAMPLING_FREQ) if request == REQ_GET_CUR => {
                Ok(heapless::Vec::from_slice(&self.frequency.get_cur()).unwrap())
            }
            (Recipient::Interface, CS_MUTE) if entity_or_interface == PLAYBACK_FEATURE_UNIT_ID && request == REQ_GET_CUR => {
                let muted = self.feature_unit.get_mute(channel)?;
                Ok(heapless::Vec::from_slice(&[muted as u8]).unwrap())
            }
            (Recipient::Interface, CS_VOLUME) if entity_or_interface == PLAYBACK_FEATURE_UNIT_ID => {
                let wire = match request {
                    REQ_GET_CUR => self.feature_unit.get_volume_wire(channel, engine)?,
                    REQ_GET_MIN => self.feature_unit.get_min_wire(channel, engine)?,
                    REQ_GET_MAX => self.feature_unit.get_max_wire(channel, engine)?,
                    REQ_GET_RES => self.feature_unit.get_res_wire(channel, engine)?,
                    _ => return Err(BridgeError::BadControlRequest),
                };
                Ok(heapless::Vec::from_slice(&wire.to_le_bytes()).unwrap())
            }
            _ => Err(BridgeError::UnsupportedRecipient),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestEngine {
        db: i32,
    }
    impl VolumeEngine for TestEngine {
        fn set_volume_db(&mut self, db: i32) {
            self.db = db;
        }
        fn volume_db(&self) -> i32 {
            self.db
        }
        fn min_db(&self) -> i32 {
            -80
        }
        fn max_db(&self) -> i32 {
            0
        }
        fn res_db(&self) -> i32 {
            1
        }
    }

    const TABLE: &[u32] = &[96_000, 48_000, 44_100];

    #[test]
    fn endpoint_frequency_set_then_get() {
        let mut d = ControlDispatcher::new(TABLE, 44_100, 0);
        let mut engine = TestEngine { db: 0 };
        d.control_out(Recipient::Endpoint, REQ_SET_CUR, CS_SAMPLING_FREQ, 0, 0, &[0x44, 0xAC, 0x00], &mut engine)
            .unwrap();
        let got = d
            .control_in(Recipient::Endpoint, REQ_GET_CUR, CS_SAMPLING_FREQ, 0, 0, &engine)
            .unwrap();
        assert_eq!(&got[..], &[0x44, 0xAC, 0x00]);
    }

    #[test]
    fn interface_request_to_wrong_entity_is_unsupported() {
        let d = ControlDispatcher::new(TABLE, 44_100, 0);
        let engine = TestEngine { db: 0 };
        let err = d
            .control_in(Recipient::Interface, REQ_GET_CUR, CS_MUTE, 0, 99, &engine)
            .unwrap_err();
        assert_eq!(err, BridgeError::UnsupportedRecipient);
    }

    #[test]
    fn mute_round_trip_through_dispatcher() {
        let mut d = ControlDispatcher::new(TABLE, 44_100, 0);
        let mut engine = TestEngine { db: -10 };
        d.control_out(Recipient::Interface, REQ_SET_CUR, CS_MUTE, 0, PLAYBACK_FEATURE_UNIT_ID, &[1], &mut engine)
            .unwrap();
        assert_eq!(engine.volume_db(), -80);
        let got = d
            .control_in(Recipient::Interface, REQ_GET_CUR, CS_MUTE, 0, PLAYBACK_FEATURE_UNIT_ID, &engine)
            .unwrap();
        assert_eq!(&got[..], &[1]);
    }
}
