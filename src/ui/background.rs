//! Two-tone backdrop

use embedded_graphics::{
    draw_target::DrawTarget,
    prelude::*,
    primitives::{Circle, PrimitiveStyle, Rectangle},
};

use crate::config::{ColorMode, WatchfaceConfig};

/// Fill `bounds` with the base color, then the backdrop circle reaching up
/// from below the visible area.
pub fn paint<D>(ctx: &mut D, bounds: Rectangle, config: &WatchfaceConfig) -> Result<(), D::Error>
where
    D: DrawTarget<Color = ColorMode>,
{
    ctx.fill_solid(&bounds, config.base)?;

    Circle::with_center(config.layout.backdrop_center, config.layout.backdrop_diameter)
        .into_styled(PrimitiveStyle::with_fill(config.backdrop))
        .draw(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::test_support::FrameBuffer;

    #[test]
    fn backdrop_covers_bottom_only() {
        let config = WatchfaceConfig::new(Size::new(180, 180));
        let mut screen = FrameBuffer::<180, 180>::new();
        paint(&mut screen, Rectangle::new(Point::zero(), Size::new(180, 180)), &config).unwrap();

        assert_eq!(screen.pixel(90, 10), ColorMode::WHITE);
        assert_eq!(screen.pixel(90, 100), ColorMode::WHITE);
        assert_eq!(screen.pixel(90, 139), ColorMode::WHITE);
        assert_eq!(screen.pixel(90, 145), ColorMode::BLACK);
        assert_eq!(screen.pixel(90, 179), ColorMode::BLACK);
        // The arc is rounded, so the corners above it stay white
        assert_eq!(screen.pixel(0, 145), ColorMode::WHITE);
    }
}
