//! System services of the firmware: configuration, bluetooth, time keeping
//! and the device state the watchface peeks.

pub(crate) mod bluetooth;
pub(crate) mod config;
pub(crate) mod state;
pub(crate) mod time;
