//! UI definitions module

pub mod background;
pub mod battery;
pub mod bluetooth;
pub mod clock;
mod default_watchface;

pub use default_watchface::DefaultWatchface;
