//! Source personality: device -> host UAC1 isochronous IN, driven by a
//! fractional frame pacer. Grounded on `source_buffer_hook`/
//! `usb_audio_start_source` in `original_source/usb_audio.c`.

pub mod pacer;
pub mod ring;

pub use pacer::FramePacer;
pub use ring::TxRing;

use crate::hooks::MixerHook;

pub struct SourcePipeline<M: MixerHook> {
    pub ring: TxRing,
    pub pacer: FramePacer,
    pub mixer: M,
    streaming: bool,
}

impl<M: MixerHook> SourcePipeline<M> {
    pub fn new(mixer: M, freq: u32) -> Self {
        SourcePipeline {
            ring: TxRing::new(),
            pacer: FramePacer::new(freq),
            mixer,
            streaming: false,
        }
    }

    /// Start: reset offsets and `frac`, per §4.2. The caller primes the
    /// chain with a silence frame by calling [`Self::next_tx_frame`] once
    /// before the first real completion.
    pub fn start(&mut self) {
        self.ring.reset();
        self.pacer.reset();
        self.streaming = true;
    }

    pub fn stop(&mut self) {
        self.streaming = false;
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Producer side: pull from the mixer hook and push into the ring,
    /// dropping any excess per §4.2's "hook is advisory, not backpressured".
    pub fn feed_from_mixer(&mut self, scratch: &mut [u8]) {
        let n = self.mixer.pull(scratch);
        self.ring.push(&scratch[..n]);
    }

    /// Consumer side: compute this frame's byte count and fill `out[..n]`
    /// either from the ring or with silence. Returns the byte count.
    pub fn next_tx_frame(&mut self, out: &mut [u8]) -> usize {
        let n = self.pacer.frame_bytes();
        debug_assert!(n <= out.len());
        if self.ring.available() >= n {
            self.ring.pop_into(&mut out[..n]);
        } else {
            out[..n].fill(0);
        }
        n
    }
}
