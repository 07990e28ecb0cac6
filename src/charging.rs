//! Charging supervisor, §4.6. Grounded on `power_input_status()` and
//! `chrg_monitor_cb()` in `original_source/power-6g.c`: a backlight-edge
//! triggered probe into an 8-sample debounce, plus a 10ms high-frequency
//! monitor that catches sub-debounce-period discharge pulses a slower
//! poll loop would miss.

use embedded_hal::digital::OutputPin;

/// Backlight state and the raw charger pin read, both externalized since
/// they are board-specific.
pub trait ChargeSense {
    fn backlight_on(&mut self) -> bool;
    /// Raw `!CHRG` pin read: `true` when the charger is actively sinking
    /// current into the battery.
    fn is_charging(&mut self) -> bool;
}

const DEBOUNCE_THRESHOLD: u8 = 8;

pub struct ChargingSupervisor<S: ChargeSense, P: OutputPin> {
    sense: S,
    c1: P,
    prev_backlight_on: bool,
    monitoring: bool,
    saw_discharge_pulse: bool,
    charger_detected: bool,
    debounce: u8,
}

impl<S: ChargeSense, P: OutputPin> ChargingSupervisor<S, P> {
    pub fn new(sense: S, c1: P) -> Self {
        ChargingSupervisor {
            sense,
            c1,
            prev_backlight_on: false,
            monitoring: false,
            saw_discharge_pulse: false,
            charger_detected: false,
            debounce: 0,
        }
    }

    /// 10ms monitor callback equivalent: records a discharge pulse when
    /// the raw pin reads "not charging". No-op unless a backlight edge
    /// has armed monitoring.
    pub fn monitor_tick(&mut self, not_charging: bool) {
        if self.monitoring && not_charging {
            self.saw_discharge_pulse = true;
        }
    }

    /// Runs once per poll period (the 500ms power thread in the
    /// original). USB presence is assumed by the caller not calling
    /// `poll` while USB is absent; [`Self::on_usb_removed`] handles that
    /// transition instead.
    pub fn poll(&mut self) -> bool {
        let bl_on = self.sense.backlight_on();

        if bl_on && !self.prev_backlight_on {
            let _ = self.c1.set_low();
            self.saw_discharge_pulse = false;
            self.debounce = 0;
            self.monitoring = true;
        } else if bl_on {
            if self.saw_discharge_pulse {
                self.saw_discharge_pulse = false;
                self.charger_detected = false;
                self.debounce = 0;
            } else if !self.charger_detected {
                self.debounce += 1;
                if self.debounce >= DEBOUNCE_THRESHOLD {
                    self.charger_detected = true;
                    self.debounce = 0;
                }
            } else if !self.sense.is_charging() {
                self.debounce += 1;
                if self.debounce >= DEBOUNCE_THRESHOLD {
                    self.charger_detected = false;
                    self.debounce = 0;
                }
            }
        } else {
            self.monitoring = false;
            if !self.charger_detected {
                let _ = self.c1.set_high();
            }
        }

        self.prev_backlight_on = bl_on;
        self.charger_detected
    }

    pub fn on_usb_removed(&mut self) {
        self.monitoring = false;
        self.charger_detected = false;
        self.prev_backlight_on = false;
        self.debounce = 0;
    }

    pub fn is_charger_detected(&self) -> bool {
        self.charger_detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct FakeSense {
        bl: bool,
        charging: bool,
    }
    impl ChargeSense for FakeSense {
        fn backlight_on(&mut self) -> bool {
            self.bl
        }
        fn is_charging(&mut self) -> bool {
            self.charging
        }
    }

    struct FakePin {
        high: bool,
    }
    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = Infallible;
    }
    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    fn sup(bl: bool, charging: bool) -> ChargingSupervisor<FakeSense, FakePin> {
        ChargingSupervisor::new(FakeSense { bl, charging }, FakePin { high: false })
    }

    #[test]
    fn backlight_off_blocks_charging_without_detection() {
        let mut s = sup(false, false);
        assert!(!s.poll());
        assert!(s.c1.high);
    }

    #[test]
    fn eight_consecutive_true_readings_latches_detection() {
        let mut s = sup(true, true);
        for i in 0..DEBOUNCE_THRESHOLD {
            let detected = s.poll();
            if i + 1 < DEBOUNCE_THRESHOLD {
                assert!(!detected);
            } else {
                assert!(detected);
            }
        }
    }

    #[test]
    fn discharge_pulse_resets_detection_latch() {
        let mut s = sup(true, true);
        for _ in 0..DEBOUNCE_THRESHOLD {
            s.poll();
        }
        assert!(s.is_charger_detected());

        s.monitor_tick(true);
        assert!(!s.poll());
        assert!(!s.is_charger_detected());
    }

    #[test]
    fn oscillating_false_readings_accumulate_to_clear_detection() {
        let mut s = sup(true, true);
        for _ in 0..DEBOUNCE_THRESHOLD {
            s.poll();
        }
        assert!(s.is_charger_detected());

        s.sense.charging = false;
        for i in 0..DEBOUNCE_THRESHOLD {
            let detected = s.poll();
            if i + 1 < DEBOUNCE_THRESHOLD {
                assert!(detected, "true readings must not reset early");
            } else {
                assert!(!detected);
            }
        }
    }

    #[test]
    fn usb_removal_clears_sticky_state() {
        let mut s = sup(true, true);
        for _ in 0..DEBOUNCE_THRESHOLD {
            s.poll();
        }
        assert!(s.is_charger_detected());
        s.on_usb_removed();
        assert!(!s.is_charger_detected());
    }
}
