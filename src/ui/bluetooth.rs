//! Bluetooth icon

use embedded_graphics::{
    draw_target::DrawTarget,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Polyline},
};

use crate::config::ColorMode;

const GLYPH_POINTS: [Point; 6] = [
    Point::new(2, 0),
    Point::new(7, 5),
    Point::new(2, 10),
    Point::new(7, 15),
    Point::new(2, 20),
    Point::new(2, 0),
];

const STRIKEOUT_POINTS: [Point; 6] = [
    Point::new(0, 0),
    Point::new(10, 20),
    Point::new(5, 10),
    Point::new(0, 20),
    Point::new(10, 0),
    Point::new(5, 10),
];

/// Closed outline through a fixed list of vertices
#[derive(Clone, Copy, Debug)]
pub struct Path {
    points: &'static [Point],
}

impl Path {
    pub const fn new(points: &'static [Point]) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &'static [Point] {
        self.points
    }

    /// Stroke the outline, closing it back to the first vertex.
    pub fn draw_outline<D>(&self, ctx: &mut D, style: PrimitiveStyle<ColorMode>) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = ColorMode>,
    {
        Polyline::new(self.points).into_styled(style).draw(ctx)?;

        if let (Some(first), Some(last)) = (self.points.first(), self.points.last()) {
            if first != last {
                Line::new(*last, *first).into_styled(style).draw(ctx)?;
            }
        }
        Ok(())
    }
}

/// Outlines of the icon, built once and kept for the lifetime of the face
#[derive(Clone, Copy, Debug)]
pub struct BluetoothPaths {
    pub glyph: Path,
    pub strikeout: Path,
}

impl Default for BluetoothPaths {
    fn default() -> Self {
        Self::new()
    }
}

impl BluetoothPaths {
    pub const fn new() -> Self {
        Self {
            glyph: Path::new(&GLYPH_POINTS),
            strikeout: Path::new(&STRIKEOUT_POINTS),
        }
    }

    /// Draw the glyph, struck out in `attention` when disconnected.
    pub fn paint<D>(
        &self,
        ctx: &mut D,
        connected: bool,
        color: ColorMode,
        attention: ColorMode,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = ColorMode>,
    {
        self.glyph
            .draw_outline(ctx, PrimitiveStyle::with_stroke(color, 1))?;

        if !connected {
            self.strikeout
                .draw_outline(ctx, PrimitiveStyle::with_stroke(attention, 2))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    fn render(connected: bool) -> MockDisplay<ColorMode> {
        let mut display = MockDisplay::new();
        display.set_allow_overdraw(true);
        display.set_allow_out_of_bounds_drawing(true);
        BluetoothPaths::new()
            .paint(&mut display, connected, ColorMode::WHITE, ColorMode::RED)
            .unwrap();
        display
    }

    fn count(display: &MockDisplay<ColorMode>, color: ColorMode) -> usize {
        (0..64)
            .flat_map(|y| (0..64).map(move |x| Point::new(x, y)))
            .filter(|p| display.get_pixel(*p) == Some(color))
            .count()
    }

    #[test]
    fn connected_shows_glyph_only() {
        let display = render(true);
        assert!(count(&display, ColorMode::WHITE) > 0);
        assert_eq!(count(&display, ColorMode::RED), 0);
        assert_eq!(display.get_pixel(Point::new(2, 0)), Some(ColorMode::WHITE));
        assert_eq!(display.get_pixel(Point::new(7, 15)), Some(ColorMode::WHITE));
    }

    #[test]
    fn disconnected_adds_strikeout() {
        let connected = render(true);
        let display = render(false);
        assert!(count(&display, ColorMode::RED) > 0);

        // Every pixel off the strike-through is identical to the connected icon
        for y in 0..21 {
            for x in 0..11 {
                let p = Point::new(x, y);
                if display.get_pixel(p) != Some(ColorMode::RED) {
                    assert_eq!(display.get_pixel(p), connected.get_pixel(p), "{p:?}");
                }
            }
        }
    }

    #[test]
    fn paths_have_six_vertices() {
        let paths = BluetoothPaths::default();
        assert_eq!(paths.glyph.points().len(), 6);
        assert_eq!(paths.strikeout.points().len(), 6);
    }
}
