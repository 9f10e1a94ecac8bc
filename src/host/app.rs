//! Application event loop
//!
//! Owns the window, the subscriptions and the services. Events are handled
//! one at a time and every event is followed by a repaint of dirty layers.

use embedded_graphics::draw_target::DrawTarget;

use super::{
    service::{Event, Services, Subscriptions},
    window::{Window, WindowHandlers, WindowState},
    Error,
};
use crate::config::ColorMode;

pub struct App<H, S> {
    window: Window<H>,
    subscriptions: Subscriptions,
    services: S,
}

impl<H: WindowHandlers, S: Services> App<H, S> {
    pub fn new(window: Window<H>, services: S) -> Self {
        Self {
            window,
            subscriptions: Subscriptions::default(),
            services,
        }
    }

    pub fn window(&self) -> &Window<H> {
        &self.window
    }

    pub fn services(&self) -> &S {
        &self.services
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    /// Push the window onto the display, which loads it.
    pub fn push(&mut self) -> Result<(), Error> {
        self.window.load(&mut self.subscriptions, &self.services)
    }

    /// Remove the window from the display, which unloads it.
    pub fn pop(&mut self) -> Result<(), Error> {
        self.window.unload(&mut self.subscriptions)
    }

    /// Deliver an event if the application subscribed to its channel.
    /// Returns whether it was delivered.
    pub fn dispatch(&mut self, event: &Event) -> Result<bool, Error> {
        if self.window.state() != WindowState::Loaded || !self.subscriptions.wants(event) {
            return Ok(false);
        }
        self.window.handle_event(&mut self.subscriptions, event)?;
        Ok(true)
    }

    /// Repaint the window if any layer is dirty. Returns whether it painted.
    pub fn render<D>(&mut self, target: &mut D) -> Result<bool, Error>
    where
        D: DrawTarget<Color = ColorMode>,
    {
        if !self.window.needs_redraw() {
            return Ok(false);
        }
        self.window
            .render(target, &self.services)
            .map_err(|_| Error::Draw)?;
        Ok(true)
    }

    /// Run the event loop until `events` is exhausted.
    pub fn run<D, I>(&mut self, events: I, target: &mut D) -> Result<(), Error>
    where
        D: DrawTarget<Color = ColorMode>,
        I: IntoIterator<Item = Event>,
    {
        self.render(target)?;
        for event in events {
            self.dispatch(&event)?;
            self.render(target)?;
        }
        Ok(())
    }

    /// Destroy the application, checking that the window released everything
    /// it acquired.
    pub fn destroy(mut self) -> Result<S, Error> {
        if self.window.state() == WindowState::Loaded {
            warn!("Destroying a loaded window");
            self.pop()?;
        }

        let layers = self.window.layers().live();
        let subscriptions = self.subscriptions.outstanding();
        if layers != 0 || subscriptions != 0 {
            return Err(Error::ResourceLeak {
                layers,
                subscriptions,
            });
        }
        Ok(self.services)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{
        root_bounds,
        test_support::{FakeServices, FrameBuffer},
        Channel, LayerId, WindowContext,
    };
    use embedded_graphics::{
        geometry::{Point, Size},
        pixelcolor::RgbColor,
        primitives::Rectangle,
    };

    /// Acquires a layer and a battery subscription, and gives back only
    /// what it is told to release
    #[derive(Default)]
    struct Handler {
        layer: Option<LayerId>,
        releases_layer: bool,
        releases_subscription: bool,
        /// Subscribe twice while loading, which fails
        fails_to_load: bool,
    }

    impl WindowHandlers for Handler {
        fn load<S: Services>(&mut self, ctx: &mut WindowContext<'_>, _: &S) -> Result<(), Error> {
            let layer = ctx.layers.create(Rectangle::new(Point::zero(), Size::new(4, 4)))?;
            ctx.layers.add_child(layer)?;
            ctx.subscriptions.subscribe_battery()?;
            if self.fails_to_load {
                ctx.subscriptions.subscribe_battery()?;
            }
            self.layer = Some(layer);
            Ok(())
        }

        fn unload(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), Error> {
            let layer = self.layer.take();
            if let (Some(layer), true) = (layer, self.releases_layer) {
                ctx.layers.destroy(layer)?;
            }
            if self.releases_subscription {
                ctx.subscriptions.unsubscribe(Channel::Battery)?;
            }
            Ok(())
        }

        fn handle_event(&mut self, _: &mut WindowContext<'_>, _: &Event) -> Result<(), Error> {
            Ok(())
        }

        fn paint<D, S>(&self, _: LayerId, bounds: Rectangle, ctx: &mut D, _: &S) -> Result<(), D::Error>
        where
            D: DrawTarget<Color = ColorMode>,
            S: Services,
        {
            ctx.fill_solid(&bounds, ColorMode::BLUE)
        }
    }

    fn app(handler: Handler) -> App<Handler, FakeServices> {
        let window = Window::new(handler, root_bounds(Size::new(16, 16)), ColorMode::BLACK);
        App::new(window, FakeServices::new(0, 0, 0))
    }

    fn forgets_subscription() -> Handler {
        Handler {
            releases_layer: true,
            ..Default::default()
        }
    }

    #[test]
    fn leaked_subscription_is_reported() {
        let mut app = app(forgets_subscription());
        app.push().unwrap();
        app.pop().unwrap();

        assert_eq!(
            app.destroy().err(),
            Some(Error::ResourceLeak {
                layers: 0,
                subscriptions: 1
            })
        );
    }

    #[test]
    fn leaked_layer_is_reported() {
        let mut app = app(Handler {
            releases_subscription: true,
            ..Default::default()
        });
        app.push().unwrap();
        app.pop().unwrap();

        assert_eq!(
            app.destroy().err(),
            Some(Error::ResourceLeak {
                layers: 1,
                subscriptions: 0
            })
        );
    }

    #[test]
    fn clean_handler_is_destroyed() {
        let mut app = app(Handler {
            releases_layer: true,
            releases_subscription: true,
            ..Default::default()
        });
        app.push().unwrap();
        app.pop().unwrap();
        assert!(app.destroy().is_ok());
    }

    #[test]
    fn destroying_a_loaded_window_unloads_it() {
        let mut app = app(forgets_subscription());
        app.push().unwrap();
        // The layer is released by unload, the subscription is not
        assert_eq!(
            app.destroy().err(),
            Some(Error::ResourceLeak {
                layers: 0,
                subscriptions: 1
            })
        );
    }

    #[test]
    fn failed_load_releases_what_it_acquired() {
        let mut app = app(Handler {
            fails_to_load: true,
            ..Default::default()
        });
        assert_eq!(app.push(), Err(Error::AlreadySubscribed(Channel::Battery)));

        assert_eq!(app.window().state(), WindowState::Created);
        assert_eq!(app.window().layers().live(), 0);
        assert_eq!(app.subscriptions().outstanding(), 0);
        assert_eq!(app.render(&mut FrameBuffer::<16, 16>::new()), Ok(false));
        assert!(app.destroy().is_ok());
    }

    #[test]
    fn nothing_is_painted_before_push() {
        let mut app = app(forgets_subscription());
        let mut screen = FrameBuffer::<16, 16>::new();
        assert_eq!(app.render(&mut screen), Ok(false));
        assert_eq!(screen.pixel(0, 0), ColorMode::MAGENTA);

        app.push().unwrap();
        assert_eq!(app.render(&mut screen), Ok(true));
        assert_eq!(screen.pixel(0, 0), ColorMode::BLUE);
        assert_eq!(screen.pixel(8, 8), ColorMode::BLACK);
        assert_eq!(app.render(&mut screen), Ok(false));
    }
}
