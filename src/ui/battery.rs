//! Battery icon
//!
//! A terminal on top of a housing, filled proportionally to the charge.

use embedded_graphics::{
    draw_target::DrawTarget,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};

use crate::config::ColorMode;

/// Terminal of the battery glyph
pub const TERMINAL: Rectangle = Rectangle::new(Point::new(2, 0), Size::new(5, 2));
/// Housing of the battery glyph
pub const HOUSING: Rectangle = Rectangle::new(Point::new(0, 2), Size::new(9, 18));

/// Height of a full fill
const FULL: u32 = 14;
/// Rows of the fill hidden at 0%. One less than `FULL` so a nearly empty
/// battery still shows a sliver.
const EMPTY_GONE: u32 = 13;
/// The fill is not drawn below this height.
pub const MIN_FILL: u32 = 2;

/// Height of the charge fill for `percent`, 0 when it is not drawn.
pub fn fill_height(percent: u8) -> u32 {
    let percent = u32::from(percent.min(100));
    // Same as truncating 13 - 0.13 * percent
    let gone = (EMPTY_GONE * 100 - EMPTY_GONE * percent) / 100;
    match FULL - gone {
        height if height >= MIN_FILL => height,
        _ => 0,
    }
}

/// Area of the charge fill for `percent`, if any.
pub fn fill_area(percent: u8) -> Option<Rectangle> {
    match fill_height(percent) {
        0 => None,
        height => Some(Rectangle::new(
            Point::new(2, (4 + FULL - height) as i32),
            Size::new(5, height),
        )),
    }
}

/// Draw the glyph with the fill for `percent`.
pub fn paint<D>(ctx: &mut D, percent: u8, color: ColorMode) -> Result<(), D::Error>
where
    D: DrawTarget<Color = ColorMode>,
{
    let outline = PrimitiveStyle::with_stroke(color, 1);
    TERMINAL.into_styled(outline).draw(ctx)?;
    HOUSING.into_styled(outline).draw(ctx)?;

    if let Some(fill) = fill_area(percent) {
        ctx.fill_solid(&fill, color)?;
    }
    Ok(())
}
