//! Minimal application runtime
//!
//! Windows made of layers, a compositor repainting dirty layers, notification
//! subscriptions and peek queries. Everything runs on the caller's thread.

pub mod app;
pub mod layer;
pub mod service;
pub mod window;

use core::fmt;

pub use app::App;
pub use layer::{LayerId, LayerPainter, LayerTree, TextAlignment, TextLayer};
pub use service::{BatteryChargeState, Channel, Event, Services, Subscriptions, TimeUnits};
pub use window::{root_bounds, Window, WindowContext, WindowHandlers, WindowState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Channel is subscribed already
    AlreadySubscribed(Channel),
    /// Channel is not subscribed
    NotSubscribed(Channel),
    /// Layer was destroyed or never existed
    LayerDestroyed(LayerId),
    /// All layer slots are in use
    NoFreeLayer,
    /// Text operation on a custom layer
    NotATextLayer(LayerId),
    /// Text exceeds the text layer capacity
    TextTooLong,
    WindowNotLoaded,
    WindowAlreadyLoaded,
    /// Resources left over when the window was destroyed
    ResourceLeak { layers: usize, subscriptions: usize },
    /// Formatting into a fixed buffer failed
    Format,
    /// The draw target reported an error
    Draw,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AlreadySubscribed(channel) => write!(f, "already subscribed to {channel}"),
            Error::NotSubscribed(channel) => write!(f, "not subscribed to {channel}"),
            Error::LayerDestroyed(id) => write!(f, "{id} was destroyed"),
            Error::NoFreeLayer => f.write_str("no free layer slot"),
            Error::NotATextLayer(id) => write!(f, "{id} is not a text layer"),
            Error::TextTooLong => f.write_str("text does not fit the text layer"),
            Error::WindowNotLoaded => f.write_str("window is not loaded"),
            Error::WindowAlreadyLoaded => f.write_str("window is loaded already"),
            Error::ResourceLeak {
                layers,
                subscriptions,
            } => write!(
                f,
                "{layers} layers and {subscriptions} subscriptions left at window destruction"
            ),
            Error::Format => f.write_str("formatting failed"),
            Error::Draw => f.write_str("drawing failed"),
        }
    }
}
