//! Layer tree and compositor

use core::fmt;

use embedded_graphics::{
    draw_target::{DrawTarget, DrawTargetExt},
    geometry::{Point, Size},
    mono_font::{MonoFont, MonoTextStyle},
    primitives::Rectangle,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
    Drawable,
};

use super::Error;
use crate::config::ColorMode;

/// Maximum number of layers a window can hold at once.
pub const MAX_LAYERS: usize = 8;
/// Capacity of a text layer in bytes.
pub const TEXT_LEN: usize = 32;

/// Handle to a layer of a window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerId {
    slot: u8,
    generation: u16,
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer {}.{}", self.slot, self.generation)
    }
}

/// Horizontal placement of text inside its layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

/// Text content drawn by the compositor itself
pub struct TextLayer {
    buf: [u8; TEXT_LEN],
    len: usize,
    /// Text color
    pub color: ColorMode,
    /// Fill behind the text, `None` leaves the layers below visible
    pub background: Option<ColorMode>,
    pub font: &'static MonoFont<'static>,
    pub alignment: TextAlignment,
}

impl TextLayer {
    /// Create an empty, transparent text layer.
    pub fn new(font: &'static MonoFont<'static>, color: ColorMode) -> Self {
        Self {
            buf: [0; TEXT_LEN],
            len: 0,
            color,
            background: None,
            font,
            alignment: TextAlignment::Left,
        }
    }

    pub fn with_background(mut self, background: Option<ColorMode>) -> Self {
        self.background = background;
        self
    }

    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Currently displayed text
    pub fn text(&self) -> &str {
        // Only whole `&str`s are ever copied in, so the prefix is valid UTF-8.
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }

    fn set_text(&mut self, text: &str) -> Result<(), Error> {
        let bytes = text.as_bytes();
        if bytes.len() > TEXT_LEN {
            return Err(Error::TextTooLong);
        }
        self.buf[..bytes.len()].copy_from_slice(bytes);
        self.len = bytes.len();
        Ok(())
    }

    fn draw<D>(&self, target: &mut D, size: Size) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = ColorMode>,
    {
        if let Some(background) = self.background {
            target.fill_solid(&Rectangle::new(Point::zero(), size), background)?;
        }

        let (alignment, x) = match self.alignment {
            TextAlignment::Left => (Alignment::Left, 0),
            TextAlignment::Center => (Alignment::Center, size.width as i32 / 2),
            TextAlignment::Right => (Alignment::Right, size.width as i32 - 1),
        };
        let text_style = TextStyleBuilder::new()
            .alignment(alignment)
            .baseline(Baseline::Middle)
            .build();

        Text::with_text_style(
            self.text(),
            Point::new(x, size.height as i32 / 2),
            MonoTextStyle::new(self.font, self.color),
            text_style,
        )
        .draw(target)?;

        Ok(())
    }
}

enum Content {
    /// Drawn by the window's paint handler
    Custom,
    /// Drawn by the compositor
    Text(TextLayer),
}

struct Slot {
    frame: Rectangle,
    dirty: bool,
    attached: bool,
    content: Content,
}

/// Draws the content of custom layers.
pub trait LayerPainter {
    /// Paint `layer` into `ctx`, whose origin is the layer's top left corner.
    fn paint<D>(&self, layer: LayerId, bounds: Rectangle, ctx: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = ColorMode>;
}

/// Live layers of a [`LayerTree`] at some point in time
pub(super) struct Checkpoint {
    live: [Option<u16>; MAX_LAYERS],
}

/// Layers of a window, in drawing order
pub struct LayerTree {
    slots: [Option<Slot>; MAX_LAYERS],
    generations: [u16; MAX_LAYERS],
    /// Attached slots, bottom first
    order: [Option<u8>; MAX_LAYERS],
}

impl Default for LayerTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerTree {
    pub fn new() -> Self {
        Self {
            slots: Default::default(),
            generations: [0; MAX_LAYERS],
            order: [None; MAX_LAYERS],
        }
    }

    /// Create a custom-painted layer.
    pub fn create(&mut self, frame: Rectangle) -> Result<LayerId, Error> {
        self.insert(frame, Content::Custom)
    }

    /// Create a text layer.
    pub fn create_text(&mut self, frame: Rectangle, text: TextLayer) -> Result<LayerId, Error> {
        self.insert(frame, Content::Text(text))
    }

    fn insert(&mut self, frame: Rectangle, content: Content) -> Result<LayerId, Error> {
        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(Error::NoFreeLayer)?;

        self.slots[slot] = Some(Slot {
            frame,
            dirty: true,
            attached: false,
            content,
        });
        let id = LayerId {
            slot: slot as u8,
            generation: self.generations[slot],
        };
        debug!("Created {}", id);
        Ok(id)
    }

    /// Attach a layer on top of the already attached ones.
    pub fn add_child(&mut self, id: LayerId) -> Result<(), Error> {
        let slot = self.slot_mut(id)?;
        if slot.attached {
            return Ok(());
        }
        slot.attached = true;
        slot.dirty = true;

        if let Some(free) = self.order.iter_mut().find(|entry| entry.is_none()) {
            *free = Some(id.slot);
        }
        Ok(())
    }

    /// Destroy a layer. The handle is invalid afterwards.
    pub fn destroy(&mut self, id: LayerId) -> Result<(), Error> {
        self.slot(id)?;
        let index = id.slot as usize;
        self.slots[index] = None;
        self.generations[index] = self.generations[index].wrapping_add(1);

        // Keep the drawing order compact
        if let Some(pos) = self.order.iter().position(|entry| *entry == Some(id.slot)) {
            self.order.copy_within(pos + 1.., pos);
            self.order[MAX_LAYERS - 1] = None;
        }
        debug!("Destroyed {}", id);
        Ok(())
    }

    /// Request a repaint of the layer.
    pub fn mark_dirty(&mut self, id: LayerId) -> Result<(), Error> {
        self.slot_mut(id)?.dirty = true;
        Ok(())
    }

    /// Frame of the layer, relative to the window.
    pub fn frame(&self, id: LayerId) -> Result<Rectangle, Error> {
        Ok(self.slot(id)?.frame)
    }

    /// Replace the text of a text layer and mark it dirty.
    pub fn set_text(&mut self, id: LayerId, text: &str) -> Result<(), Error> {
        let slot = self.slot_mut(id)?;
        match &mut slot.content {
            Content::Text(layer) => layer.set_text(text)?,
            Content::Custom => return Err(Error::NotATextLayer(id)),
        }
        slot.dirty = true;
        Ok(())
    }

    /// Text of a text layer.
    pub fn text(&self, id: LayerId) -> Result<&str, Error> {
        match &self.slot(id)?.content {
            Content::Text(layer) => Ok(layer.text()),
            Content::Custom => Err(Error::NotATextLayer(id)),
        }
    }

    /// Number of layers that have not been destroyed.
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether any attached layer waits for a repaint.
    pub fn needs_redraw(&self) -> bool {
        self.slots.iter().flatten().any(|slot| slot.attached && slot.dirty)
    }

    /// Smallest rectangle covering every dirty attached layer.
    pub fn damage(&self) -> Option<Rectangle> {
        self.slots
            .iter()
            .flatten()
            .filter(|slot| slot.attached && slot.dirty)
            .filter_map(|slot| {
                let bottom_right = slot.frame.bottom_right()?;
                Some((slot.frame.top_left, bottom_right))
            })
            .reduce(|(a_min, a_max), (b_min, b_max)| {
                (a_min.component_min(b_min), a_max.component_max(b_max))
            })
            .map(|(min, max)| Rectangle::with_corners(min, max))
    }

    /// Repaint `damage`: every attached layer overlapping it is painted
    /// bottom to top, clipped to its frame and to `damage`. Clears all dirty
    /// flags.
    pub fn render<D, P>(
        &mut self,
        target: &mut D,
        damage: Rectangle,
        painter: &P,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = ColorMode>,
        P: LayerPainter,
    {
        for index in self.order.iter().flatten() {
            let index = *index as usize;
            let Some(slot) = self.slots[index].as_ref() else {
                continue;
            };
            let id = LayerId {
                slot: index as u8,
                generation: self.generations[index],
            };

            let frame = slot.frame;
            let area = frame.intersection(&damage);
            if area.is_zero_sized() {
                continue;
            }

            let mut clipped = target.clipped(&area);
            let mut local = clipped.translated(frame.top_left);
            match &slot.content {
                Content::Custom => {
                    painter.paint(id, Rectangle::new(Point::zero(), frame.size), &mut local)?
                }
                Content::Text(text) => text.draw(&mut local, frame.size)?,
            }
        }

        for slot in self.slots.iter_mut().flatten() {
            slot.dirty = false;
        }
        Ok(())
    }

    /// Current set of live layers, to roll back to with [`Self::rollback`].
    pub(super) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            live: core::array::from_fn(|index| {
                self.slots[index].as_ref().map(|_| self.generations[index])
            }),
        }
    }

    /// Destroy every layer created since `checkpoint` was taken.
    pub(super) fn rollback(&mut self, checkpoint: &Checkpoint) {
        for index in 0..MAX_LAYERS {
            let generation = self.generations[index];
            if self.slots[index].is_some() && checkpoint.live[index] != Some(generation) {
                let id = LayerId {
                    slot: index as u8,
                    generation,
                };
                // The slot is live, so this cannot fail
                let _ = self.destroy(id);
            }
        }
    }

    fn slot(&self, id: LayerId) -> Result<&Slot, Error> {
        let index = id.slot as usize;
        match self.slots.get(index) {
            Some(Some(slot)) if self.generations[index] == id.generation => Ok(slot),
            _ => Err(Error::LayerDestroyed(id)),
        }
    }

    fn slot_mut(&mut self, id: LayerId) -> Result<&mut Slot, Error> {
        let index = id.slot as usize;
        match self.slots.get_mut(index) {
            Some(Some(slot)) if self.generations[index] == id.generation => Ok(slot),
            _ => Err(Error::LayerDestroyed(id)),
        }
    }
}
