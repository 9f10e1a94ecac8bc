//! Watchface configuration
//!
//! Colors, font and layout are fixed at compile time. The layout is expressed
//! for a 180px tall round display and scaled to the actual panel height.

use embedded_graphics::{
    geometry::{Point, Size},
    mono_font::MonoFont,
    pixelcolor::{Rgb565, RgbColor},
    primitives::Rectangle,
};
use profont::PROFONT_24_POINT;

/// Color type used throughout the watchface
pub type ColorMode = Rgb565;

/// Height of the display the reference layout was drawn for.
const REFERENCE_HEIGHT: i32 = 180;

/// Top of the time text layer on the reference display.
const TIME_TOP: i32 = 60;
/// Height of the time text layer.
const TIME_HEIGHT: u32 = 48;
/// Top of both status icons on the reference display.
const ICON_TOP: i32 = 150;
/// Center height of the backdrop circle on the reference display.
const BACKDROP_CENTER_Y: i32 = 470;
/// Radius of the backdrop circle on the reference display.
const BACKDROP_RADIUS: i32 = 330;

/// Battery icon size in pixels
pub const BATTERY_ICON_SIZE: Size = Size::new(9, 20);
/// Bluetooth icon size in pixels
pub const BLUETOOTH_ICON_SIZE: Size = Size::new(10, 20);

/// Position of every layer on the display
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Frame of the time text layer
    pub time: Rectangle,
    /// Frame of the battery icon layer
    pub battery: Rectangle,
    /// Frame of the bluetooth icon layer
    pub bluetooth: Rectangle,
    /// Center of the backdrop circle, relative to the background layer
    pub backdrop_center: Point,
    /// Diameter of the backdrop circle
    pub backdrop_diameter: u32,
}

impl Layout {
    /// Derive the layout for a display of the given size.
    pub fn for_display(display: Size) -> Self {
        let w = display.width as i32;
        let h = display.height as i32;
        let scale = |v: i32| v * h / REFERENCE_HEIGHT;
        let icon_top = scale(ICON_TOP);

        Self {
            time: Rectangle::new(
                Point::new(0, scale(TIME_TOP)),
                Size::new(display.width, TIME_HEIGHT),
            ),
            battery: Rectangle::new(Point::new(w / 2 - 15, icon_top), BATTERY_ICON_SIZE),
            bluetooth: Rectangle::new(Point::new(w / 2 + 6, icon_top), BLUETOOTH_ICON_SIZE),
            backdrop_center: Point::new(w / 2, scale(BACKDROP_CENTER_Y)),
            backdrop_diameter: 2 * scale(BACKDROP_RADIUS) as u32,
        }
    }
}

/// Compile-time configuration of the watchface
#[derive(Clone, Copy)]
pub struct WatchfaceConfig {
    /// Fill of the upper background area, also the window background
    pub base: ColorMode,
    /// Fill of the backdrop circle at the bottom
    pub backdrop: ColorMode,
    /// Color of the time text
    pub time: ColorMode,
    /// Color of the status icons
    pub icon: ColorMode,
    /// Color of the bluetooth strike-through when disconnected
    pub attention: ColorMode,
    /// Font of the time text
    pub font: &'static MonoFont<'static>,
    /// Layer positions
    pub layout: Layout,
}

impl WatchfaceConfig {
    /// Default configuration for a display of the given size.
    pub fn new(display: Size) -> Self {
        Self {
            base: ColorMode::WHITE,
            backdrop: ColorMode::BLACK,
            time: ColorMode::BLACK,
            icon: ColorMode::WHITE,
            attention: ColorMode::RED,
            font: &PROFONT_24_POINT,
            layout: Layout::for_display(display),
        }
    }

    /// Replace the strike-through color.
    pub fn with_attention(mut self, color: ColorMode) -> Self {
        self.attention = color;
        self
    }

    /// Replace the two background colors.
    pub fn with_background(mut self, base: ColorMode, backdrop: ColorMode) -> Self {
        self.base = base;
        self.backdrop = backdrop;
        self
    }

    /// Replace the foreground colors of the time text and the icons.
    pub fn with_foreground(mut self, time: ColorMode, icon: ColorMode) -> Self {
        self.time = time;
        self.icon = icon;
        self
    }

    /// Replace the time font.
    pub fn with_font(mut self, font: &'static MonoFont<'static>) -> Self {
        self.font = font;
        self
    }
}
