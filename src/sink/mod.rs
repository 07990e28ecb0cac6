//! Sink personality: host -> device UAC1 isochronous OUT plus async
//! feedback. Grounded on `usb_audio_rx_complete`/`usb_audio_mixer_read`
//! from `original_source/usb_audio.c`, restructured as a ring type plus a
//! feedback controller that the embassy-usb class wiring in
//! [`crate::class`] drives from its stream/feedback tasks.

pub mod feedback;
pub mod ring;

pub use feedback::FeedbackController;
pub use ring::{SinkRing, NR_BUFFERS};

use crate::hooks::DspSink;
use crate::state::{SinkStats, SinkState};

/// Ties the ring, the feedback controller and a caller-supplied DSP stage
/// into one unit, matching the grouping `usb_audio.c` keeps as file-scope
/// statics.
pub struct SinkPipeline<D: DspSink> {
    pub ring: SinkRing,
    pub feedback: FeedbackController,
    pub dsp: D,
    pub state: SinkState,
    pub stats: SinkStats,
    last_frame_number: u16,
}

impl<D: DspSink> SinkPipeline<D> {
    pub fn new(dsp: D, hw_freq: u32, feedback_p: u8, high_speed: bool) -> Self {
        SinkPipeline {
            ring: SinkRing::new(),
            feedback: FeedbackController::new(hw_freq, feedback_p, high_speed),
            dsp,
            state: SinkState::Priming,
            stats: SinkStats::new(),
            last_frame_number: 0,
        }
    }

    /// Ingress algorithm, step 1-4 of §4.1: call once per completed ISO OUT
    /// transfer with the raw payload and the 11-bit `bFrameNumber`.
    pub fn on_rx_complete(&mut self, frame_number: u16, raw: &[u8]) {
        self.stats.note_frame_number(self.last_frame_number, frame_number);
        self.last_frame_number = frame_number;

        if raw.len() <= 4 {
            // Stray feedback echo, per §4.1 step 2.
            return;
        }

        let overflowed = self.ring.push_with(|out| self.dsp.process(raw, out));
        let prebuffered = self.ring.is_prebuffered();
        self.state = self.state.on_fill(overflowed, prebuffered);
        self.stats.record_occupancy(self.ring.occupancy());
        self.feedback.accumulate(self.ring.occupancy());
    }

    /// Mixer pull, per §4.1's "may run in interrupt context of PCM engine".
    pub fn mixer_pull<'a>(&'a mut self) -> Option<&'a [u8]> {
        let slot = self.ring.pull();
        self.state = self.state.on_pull(slot.is_none());
        slot
    }

    pub fn on_alt_setting_zero(&mut self) {
        self.state = self.state.on_reset();
        self.ring.reset();
    }

    /// Called once per frame (every ISO OUT completion qualifies); returns
    /// an encoded feedback payload when this frame is an emission frame.
    pub fn tick_feedback(&mut self, frame_number: u16) -> Option<heapless::Vec<u8, 4>> {
        self.feedback.tick(frame_number)
    }
}
