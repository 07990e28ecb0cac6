//! Which of the two descriptor layouts (§4.5) a given configuration
//! assembles. Modeled as a sum type per Design Notes §9, rather than two
//! near-identical concrete packed records differing only by terminal
//! count.

/// Terminal/unit IDs, fixed across both layouts.
pub const AC_SOURCE_INPUT: u8 = 1;
pub const AC_SOURCE_OUTPUT: u8 = 2;
pub const AC_PLAYBACK_INPUT: u8 = 3;
pub const AC_PLAYBACK_FEATURE: u8 = 4;
pub const AC_PLAYBACK_OUTPUT: u8 = 5;

/// Feedback refresh exponent used to derive `bRefresh = 10 - P`.
pub const FEEDBACK_P: u8 = 5;

#[derive(Debug, Clone, Copy)]
pub enum DescriptorLayout {
    /// Historic playback path: host -> device streaming, feature unit,
    /// asynchronous feedback.
    Sink { freq_table: &'static [u32] },
    /// DAC/MFi interop path: device -> host streaming, no feature unit.
    Source { freq_table_ascending: &'static [u32], high_speed: bool },
}
