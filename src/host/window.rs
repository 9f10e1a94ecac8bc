//! Window lifecycle

use embedded_graphics::{
    draw_target::DrawTarget, geometry::Point, primitives::Rectangle,
};

use super::{
    layer::{LayerId, LayerPainter, LayerTree},
    service::{Event, Services, Subscriptions},
    Error,
};
use crate::config::ColorMode;

/// Everything a handler may touch while the window is loaded
pub struct WindowContext<'a> {
    /// Layers of the window
    pub layers: &'a mut LayerTree,
    /// Notification subscriptions of the application
    pub subscriptions: &'a mut Subscriptions,
    /// Bounds of the window's root layer
    pub root: Rectangle,
}

/// Callbacks the host invokes on a window
pub trait WindowHandlers {
    /// Create layers and subscribe to notifications.
    fn load<S: Services>(&mut self, ctx: &mut WindowContext<'_>, services: &S)
        -> Result<(), Error>;

    /// Release everything `load` acquired.
    fn unload(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), Error>;

    /// Handle a notification the application subscribed to.
    fn handle_event(&mut self, ctx: &mut WindowContext<'_>, event: &Event) -> Result<(), Error>;

    /// Paint a custom layer.
    fn paint<D, S>(
        &self,
        layer: LayerId,
        bounds: Rectangle,
        ctx: &mut D,
        services: &S,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = ColorMode>,
        S: Services;
}

/// Lifecycle state of a window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WindowState {
    Created,
    Loaded,
    Unloaded,
}

/// Top-level container of the layers
pub struct Window<H> {
    handlers: H,
    background: ColorMode,
    root: Rectangle,
    layers: LayerTree,
    state: WindowState,
    /// The whole window needs a repaint, not only the dirty layers
    invalidated: bool,
}

impl<H: WindowHandlers> Window<H> {
    /// Create a window covering a display of the given bounds.
    pub fn new(handlers: H, root: Rectangle, background: ColorMode) -> Self {
        Self {
            handlers,
            background,
            root,
            layers: LayerTree::new(),
            state: WindowState::Created,
            invalidated: false,
        }
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn handlers(&self) -> &H {
        &self.handlers
    }

    pub fn layers(&self) -> &LayerTree {
        &self.layers
    }

    pub(super) fn load<S: Services>(
        &mut self,
        subscriptions: &mut Subscriptions,
        services: &S,
    ) -> Result<(), Error> {
        if self.state == WindowState::Loaded {
            return Err(Error::WindowAlreadyLoaded);
        }

        let checkpoint = self.layers.checkpoint();
        let subscribed = *subscriptions;
        let mut ctx = WindowContext {
            layers: &mut self.layers,
            subscriptions: &mut *subscriptions,
            root: self.root,
        };
        if let Err(e) = self.handlers.load(&mut ctx, services) {
            warn!("Window failed to load: {}", e);
            self.layers.rollback(&checkpoint);
            *subscriptions = subscribed;
            return Err(e);
        }

        self.state = WindowState::Loaded;
        self.invalidated = true;
        info!("Window loaded");
        Ok(())
    }

    pub(super) fn unload(&mut self, subscriptions: &mut Subscriptions) -> Result<(), Error> {
        if self.state != WindowState::Loaded {
            return Err(Error::WindowNotLoaded);
        }

        let mut ctx = WindowContext {
            layers: &mut self.layers,
            subscriptions,
            root: self.root,
        };
        // The window is unloaded even if releasing failed half way
        self.state = WindowState::Unloaded;
        self.handlers.unload(&mut ctx)?;
        info!("Window unloaded");
        Ok(())
    }

    pub(super) fn handle_event(
        &mut self,
        subscriptions: &mut Subscriptions,
        event: &Event,
    ) -> Result<(), Error> {
        if self.state != WindowState::Loaded {
            return Err(Error::WindowNotLoaded);
        }

        let mut ctx = WindowContext {
            layers: &mut self.layers,
            subscriptions,
            root: self.root,
        };
        self.handlers.handle_event(&mut ctx, event)
    }

    /// Whether a repaint is pending.
    pub fn needs_redraw(&self) -> bool {
        self.state == WindowState::Loaded && (self.invalidated || self.layers.needs_redraw())
    }

    /// Area the next render repaints: the whole window right after loading,
    /// otherwise the dirty layers.
    pub fn damage(&self) -> Option<Rectangle> {
        if self.state != WindowState::Loaded {
            None
        } else if self.invalidated {
            Some(self.root)
        } else {
            self.layers.damage()
        }
    }

    /// Clear the damaged area to the background color and paint the layers
    /// overlapping it.
    pub(super) fn render<D, S>(&mut self, target: &mut D, services: &S) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = ColorMode>,
        S: Services,
    {
        let Some(damage) = self.damage() else {
            return Ok(());
        };

        target.fill_solid(&damage, self.background)?;
        let painter = Painter {
            handlers: &self.handlers,
            services,
        };
        self.layers.render(target, damage, &painter)?;
        self.invalidated = false;
        Ok(())
    }
}

/// Routes custom layer paints to the window handlers together with the
/// services they peek.
struct Painter<'a, H, S> {
    handlers: &'a H,
    services: &'a S,
}

impl<H: WindowHandlers, S: Services> LayerPainter for Painter<'_, H, S> {
    fn paint<D>(&self, layer: LayerId, bounds: Rectangle, ctx: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = ColorMode>,
    {
        self.handlers.paint(layer, bounds, ctx, self.services)
    }
}

/// Bounds of the root layer of a display with the given size.
pub fn root_bounds(size: embedded_graphics::geometry::Size) -> Rectangle {
    Rectangle::new(Point::zero(), size)
}
