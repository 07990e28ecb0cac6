//! Rate-adaptive feedback controller, §4.1. A PI-like loop (gains 1, 1/4,
//! 1/40) nudging the emitted "samples per frame" value to keep ring
//! occupancy near the prebuffer threshold, grounded on the
//! `feedback_handler`/accumulator statics in `original_source/usb_audio.c`.

use crate::fixed::Q16_16;

pub struct FeedbackController {
    f_nom: Q16_16,
    accumulator_raw: i64,
    count: i32,
    previous_avg: Q16_16,
    high_speed: bool,
    update_rate_frames: u32,
    fb_startframe: Option<u16>,
    started: bool,
    last_emit_frame: Option<u16>,
}

impl FeedbackController {
    pub fn new(hw_freq: u32, feedback_p: u8, high_speed: bool) -> Self {
        FeedbackController {
            f_nom: Q16_16::nominal_samples_per_frame(hw_freq),
            accumulator_raw: 0,
            count: 0,
            previous_avg: Q16_16::ZERO,
            high_speed,
            update_rate_frames: 1 << (10 - feedback_p as u32),
            fb_startframe: None,
            started: false,
            last_emit_frame: None,
        }
    }

    pub fn f_nom(&self) -> Q16_16 {
        self.f_nom
    }

    /// Fold one completion's signed ring occupancy into the current window.
    pub fn accumulate(&mut self, occupancy: i32) {
        self.accumulator_raw += (occupancy as i64) << 16;
        self.count += 1;
    }

    /// Call once per ISO OUT completion. Returns an encoded feedback
    /// payload on frames where the update rate and the startup gate both
    /// allow emission.
    pub fn tick(&mut self, frame_number: u16) -> Option<heapless::Vec<u8, 4>> {
        let start = *self.fb_startframe.get_or_insert(frame_number);
        let delta = (frame_number as u32).wrapping_sub(start as u32) & 0x07FF;

        if !self.started {
            if delta < 2 * self.update_rate_frames {
                return None;
            }
            self.started = true;
        }

        if self.last_emit_frame == Some(frame_number) {
            return None;
        }

        if delta % self.update_rate_frames != 0 {
            return None;
        }
        if self.count == 0 {
            return None;
        }

        let avg = Q16_16::div_count(self.accumulator_raw, self.count);
        let derivative = self.previous_avg - avg;
        let f_f = self.f_nom - (avg / 4) + (derivative / 40);
        let lo = self.f_nom.saturating_sub(Q16_16::ONE);
        let hi = self.f_nom.saturating_add(Q16_16::ONE);
        let f_f = f_f.clamp(lo, hi);

        self.previous_avg = avg;
        self.accumulator_raw = 0;
        self.count = 0;
        self.last_emit_frame = Some(frame_number);

        Some(f_f.encode_feedback(self.high_speed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppresses_until_two_update_windows_after_start() {
        let mut fb = FeedbackController::new(44_100, 5, true);
        for frame in 0..64u16 {
            fb.accumulate(0);
            let out = fb.tick(frame);
            if frame < 64 {
                assert!(out.is_none());
            }
        }
    }

    #[test]
    fn steady_state_emits_f_nom() {
        let mut fb = FeedbackController::new(44_100, 5, true);
        // drive past the startup gate (2 * 32 = 64 frames)
        for frame in 0..64u16 {
            fb.accumulate(0);
            fb.tick(frame);
        }
        fb.accumulate(0);
        let out = fb.tick(64).expect("emission frame");
        assert_eq!(&out[..], &fb.f_nom().encode_feedback(true)[..]);
    }

    #[test]
    fn positive_occupancy_pulls_feedback_below_nominal() {
        let mut fb = FeedbackController::new(44_100, 5, true);
        for frame in 0..64u16 {
            fb.accumulate(0);
            fb.tick(frame);
        }
        for _ in 0..32 {
            fb.accumulate(8);
        }
        let out = fb.tick(96).expect("emission frame");
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&out[..]);
        let emitted = i32::from_le_bytes(raw);
        assert!(emitted < fb.f_nom().raw());
    }

    #[test]
    fn only_emits_once_per_frame() {
        let mut fb = FeedbackController::new(44_100, 5, true);
        for frame in 0..65u16 {
            fb.accumulate(0);
            fb.tick(frame);
        }
        assert!(fb.tick(64).is_none());
    }
}
