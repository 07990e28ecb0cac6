//! Audio class control-request dispatcher, §4.4: endpoint sampling-
//! frequency control plus the playback feature unit's mute/volume.

pub mod dispatch;
pub mod feature_unit;
pub mod frequency;
pub mod volume;

pub use dispatch::{ControlDispatcher, Recipient};
pub use feature_unit::FeatureUnit;
