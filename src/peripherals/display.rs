//! Display control module for PineTime

use display_interface_spi::SPIInterface;
use embassy_nrf::{
    gpio::Output,
    peripherals::{P0_18, P0_25, P0_26, SPI2},
    spim::Spim,
};
use embassy_time::Delay;
use embedded_graphics::{pixelcolor::Rgb565, prelude::*, primitives::Rectangle, Pixel};
use mipidsi::{models::ST7789, Builder, Orientation};

pub const LCD_W: u16 = 240;
pub const LCD_H: u16 = 240;

type Lcd = mipidsi::Display<
    SPIInterface<Spim<'static, SPI2>, Output<'static, P0_18>, Output<'static, P0_25>>,
    ST7789,
    Output<'static, P0_26>,
>;

/// ST7789 LCD driven over SPI
pub struct Display {
    lcd: Lcd,
}

impl Display {
    /// Configure display settings on boot
    pub fn init(
        spim: Spim<'static, SPI2>,
        cs_pin: Output<'static, P0_25>,
        dc_pin: Output<'static, P0_18>,
        rst_pin: Output<'static, P0_26>,
    ) -> Result<Self, Error> {
        let lcd = Builder::st7789(SPIInterface::new(spim, dc_pin, cs_pin))
            .with_display_size(LCD_W, LCD_H)
            .with_orientation(Orientation::Portrait(false))
            .init(&mut Delay, Some(rst_pin))
            .map_err(|_| Error::Init)?;

        Ok(Self { lcd })
    }
}

impl OriginDimensions for Display {
    fn size(&self) -> Size {
        Size::new(LCD_W as u32, LCD_H as u32)
    }
}

impl DrawTarget for Display {
    type Color = Rgb565;
    type Error = mipidsi::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.lcd.draw_iter(pixels)
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.lcd.fill_contiguous(area, colors)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.lcd.fill_solid(area, color)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.lcd.clear(color)
    }
}

#[derive(Debug, defmt::Format)]
pub enum Error {
    /// The controller did not accept the initialization sequence
    Init,
}
