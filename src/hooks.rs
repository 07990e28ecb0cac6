//! Trait boundaries the host application fills in: the PCM DSP stage, the
//! source-direction mixer hook, and the iAP byte-stream parser. None of
//! these are driven concretely by this crate — it only calls them.

/// Sink-direction DSP stage. Stands in for `dsp_process()`: consumes raw
/// ISO OUT bytes, produces processed PCM into `out`, returns the byte
/// count written.
pub trait DspSink {
    fn process(&mut self, raw: &[u8], out: &mut [u8]) -> usize;
}

/// Passthrough implementation for hosts without a DSP stage.
pub struct PassthroughDsp;

impl DspSink for PassthroughDsp {
    fn process(&mut self, raw: &[u8], out: &mut [u8]) -> usize {
        let n = raw.len().min(out.len());
        out[..n].copy_from_slice(&raw[..n]);
        n
    }
}

/// Source-direction mixer hook. Stands in for `source_buffer_hook`: pulls
/// up to `buf.len()` bytes of locally-decoded PCM, returns the byte count
/// actually produced.
pub trait MixerHook {
    fn pull(&mut self, buf: &mut [u8]) -> usize;
}

/// iAP byte-stream sink. Stands in for `iap_getc()`: the HID-iAP
/// transport feeds it one byte at a time as reassembly proceeds. The
/// crate never interprets the stream, only frames/reassembles it.
pub trait IapSink {
    fn feed(&mut self, byte: u8);
}

/// The underlying sound engine's master-channel volume control. Writes
/// clamp to `[min_db, max_db]` inside the engine; this crate only
/// converts wire units and never applies its own clamping.
pub trait VolumeEngine {
    fn set_volume_db(&mut self, db: i32);
    fn volume_db(&self) -> i32;
    fn min_db(&self) -> i32;
    fn max_db(&self) -> i32;
    fn res_db(&self) -> i32;
}
