//! # PineTime watchface
//!
//! A digital watchface showing the time, a battery icon and a bluetooth
//! connection icon.
//!
//! The [`host`] module provides the small application runtime the face is
//! written against: a window of layers repainted on demand, notification
//! subscriptions and peek queries for the device state. The [`ui`] module is
//! the face itself. The firmware binary owns the hardware and drives both.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod battery;
pub mod config;
pub mod host;
pub mod ui;

pub use config::{ColorMode, Layout, WatchfaceConfig};
pub use ui::DefaultWatchface;
