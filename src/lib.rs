//! Device-side USB audio bridge: a UAC1 sink (host -> device) personality
//! with async sample-rate feedback, a UAC1 source (device -> host)
//! personality with a fractional frame pacer, and a HID-framed iPod
//! Accessory Protocol transport that the source personality installs
//! lazily alongside its audio stream.
//!
//! The crate is generic over [`embassy_usb::driver::Driver`] rather than
//! tied to one microcontroller: the USB controller, the PCM mixer/DSP and
//! the accessory-authentication parser are all supplied by the host
//! application through the traits in [`hooks`].
#![cfg_attr(not(test), no_std)]

pub mod charging;
pub mod class;
pub mod config;
pub mod control;
pub mod descriptors;
pub mod error;
pub mod fixed;
pub mod hid_iap;
pub mod hooks;
pub mod sink;
pub mod source;
pub mod state;

pub use config::BridgeConfig;
pub use error::BridgeError;
