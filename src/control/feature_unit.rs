//! Playback feature unit (ID 3): MUTE and VOLUME controls on the master
//! channel only, §4.4. Grounded on `feature_unit_get_volume`/
//! `usb_audio_get_cur_volume` from `original_source/usb_audio.c`.

use super::volume::{db_to_usb_audio_volume, usb_audio_volume_to_db};
use crate::error::BridgeError;
use crate::hooks::VolumeEngine;

pub const MASTER_CHANNEL: u8 = 0;

pub struct FeatureUnit {
    numdecimals: u8,
    muted: bool,
    saved_volume_db: i32,
}

impl FeatureUnit {
    pub fn new(numdecimals: u8) -> Self {
        FeatureUnit {
            numdecimals,
            muted: false,
            saved_volume_db: 0,
        }
    }

    fn check_master(channel: u8) -> Result<(), BridgeError> {
        if channel == MASTER_CHANNEL {
            Ok(())
        } else {
            Err(BridgeError::BadControlRequest)
        }
    }

    pub fn get_mute(&self, channel: u8) -> Result<bool, BridgeError> {
        Self::check_master(channel)?;
        Ok(self.muted)
    }

    pub fn set_mute<E: VolumeEngine>(&mut self, channel: u8, mute: bool, engine: &mut E) -> Result<(), BridgeError> {
        Self::check_master(channel)?;
        if mute == self.muted {
            return Ok(());
        }
        if mute {
            self.saved_volume_db = engine.volume_db();
            engine.set_volume_db(engine.min_db());
        } else {
            engine.set_volume_db(self.saved_volume_db);
        }
        self.muted = mute;
        Ok(())
    }

    pub fn get_volume_wire<E: VolumeEngine>(&self, channel: u8, engine: &E) -> Result<i16, BridgeError> {
        Self::check_master(channel)?;
        Ok(db_to_usb_audio_volume(engine.volume_db(), self.numdecimals))
    }

    pub fn set_volume_wire<E: VolumeEngine>(&mut self, channel: u8, wire: i16, engine: &mut E) -> Result<(), BridgeError> {
        Self::check_master(channel)?;
        let db = usb_audio_volume_to_db(wire, self.numdecimals);
        engine.set_volume_db(db);
        if self.muted {
            // a volume write while muted becomes the post-unmute level
            self.saved_volume_db = db;
        }
        Ok(())
    }

    pub fn get_min_wire<E: VolumeEngine>(&self, channel: u8, engine: &E) -> Result<i16, BridgeError> {
        Self::check_master(channel)?;
        Ok(db_to_usb_audio_volume(engine.min_db(), self.numdecimals))
    }

    pub fn get_max_wire<E: VolumeEngine>(&self, channel: u8, engine: &E) -> Result<i16, BridgeError> {
        Self::check_master(channel)?;
        Ok(db_to_usb_audio_volume(engine.max_db(), self.numdecimals))
    }

    pub fn get_res_wire<E: VolumeEngine>(&self, channel: u8, engine: &E) -> Result<i16, BridgeError> {
        Self::check_master(channel)?;
        Ok(db_to_usb_audio_volume(engine.res_db(), self.numdecimals))
    }

    /// `usb_audio_get_cur_volume()`: the current volume the USB host sees,
    /// independent of a pending control transfer.
    pub fn cur_volume_db<E: VolumeEngine>(&self, engine: &E) -> i32 {
        engine.volume_db()
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
            self.db = db.clamp(self.min_db(), self.max_db());
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

    #[test]
    fn non_master_channel_is_rejected() {
        let fu = FeatureUnit::new(0);
        let engine = TestEngine { db: -10 };
        assert_eq!(fu.get_mute(1), Err(BridgeError::BadControlRequest));
        assert_eq!(fu.get_volume_wire(2, &engine), Err(BridgeError::BadControlRequest));
    }

    #[test]
    fn mute_saves_and_unmute_restores() {
        let mut fu = FeatureUnit::new(0);
        let mut engine = TestEngine { db: -10 };
        fu.set_mute(0, true, &mut engine).unwrap();
        assert_eq!(engine.volume_db(), -80);
        fu.set_mute(0, false, &mut engine).unwrap();
        assert_eq!(engine.volume_db(), -10);
    }

    #[test]
    fn wire_volume_round_trips_through_the_engine() {
        let mut fu = FeatureUnit::new(0);
        let mut engine = TestEngine { db: 0 };
        let wire = 0xFE00u16 as i16; // -2 dB, numdecimals = 0
        fu.set_volume_wire(0, wire, &mut engine).unwrap();
        assert_eq!(engine.volume_db(), -2);
        assert_eq!(fu.get_volume_wire(0, &engine).unwrap(), wire);
    }
}
