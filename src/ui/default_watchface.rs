//! Default watchface
//!
//! Time in the middle, battery and bluetooth icons on the backdrop below.

use embedded_graphics::{draw_target::DrawTarget, primitives::Rectangle};

use super::{background, battery, bluetooth::BluetoothPaths, clock};
use crate::{
    config::{ColorMode, WatchfaceConfig},
    host::{
        Channel, Error, Event, LayerId, Services, TextAlignment, TextLayer, TimeUnits,
        WindowContext, WindowHandlers,
    },
};

/// Layers owned by the face while its window is loaded
#[derive(Clone, Copy, Debug)]
struct FaceLayers {
    background: LayerId,
    time: LayerId,
    battery: LayerId,
    bluetooth: LayerId,
}

/// Basic default watchface
pub struct DefaultWatchface {
    config: WatchfaceConfig,
    paths: BluetoothPaths,
    layers: Option<FaceLayers>,
}

impl DefaultWatchface {
    /// Create new watchface
    pub fn new(config: WatchfaceConfig) -> Self {
        Self {
            config,
            paths: BluetoothPaths::new(),
            layers: None,
        }
    }

    pub fn config(&self) -> &WatchfaceConfig {
        &self.config
    }

    /// Time text layer, while loaded
    pub fn time_layer(&self) -> Option<LayerId> {
        self.layers.map(|layers| layers.time)
    }

    /// Battery icon layer, while loaded
    pub fn battery_layer(&self) -> Option<LayerId> {
        self.layers.map(|layers| layers.battery)
    }

    /// Bluetooth icon layer, while loaded
    pub fn bluetooth_layer(&self) -> Option<LayerId> {
        self.layers.map(|layers| layers.bluetooth)
    }

    fn loaded(&self) -> Result<FaceLayers, Error> {
        self.layers.ok_or(Error::WindowNotLoaded)
    }

    fn show_time(
        ctx: &mut WindowContext<'_>,
        layer: LayerId,
        time: &chrono::NaiveDateTime,
    ) -> Result<(), Error> {
        let mut buf = [0u8; clock::TIME_LEN];
        let text = clock::format_time(&mut buf, time)?;
        ctx.layers.set_text(layer, text)
    }
}

impl WindowHandlers for DefaultWatchface {
    fn load<S: Services>(
        &mut self,
        ctx: &mut WindowContext<'_>,
        services: &S,
    ) -> Result<(), Error> {
        let layout = self.config.layout;

        let background = ctx.layers.create(ctx.root)?;
        ctx.layers.add_child(background)?;

        let time = ctx.layers.create_text(
            layout.time,
            TextLayer::new(self.config.font, self.config.time)
                .with_background(None)
                .with_alignment(TextAlignment::Center),
        )?;

        let battery = ctx.layers.create(layout.battery)?;
        ctx.subscriptions.subscribe_battery()?;

        let bluetooth = ctx.layers.create(layout.bluetooth)?;
        ctx.subscriptions.subscribe_connection()?;

        // Show the time right away instead of waiting for the first tick
        Self::show_time(ctx, time, &services.local_time())?;
        ctx.subscriptions.subscribe_tick(TimeUnits::SECOND)?;

        ctx.layers.add_child(time)?;
        ctx.layers.add_child(battery)?;
        ctx.layers.add_child(bluetooth)?;

        // Initial icon state
        ctx.layers.mark_dirty(battery)?;
        ctx.layers.mark_dirty(bluetooth)?;

        // Only once everything is in place, a failed load is rolled back by
        // the window
        self.layers = Some(FaceLayers {
            background,
            time,
            battery,
            bluetooth,
        });
        Ok(())
    }

    fn unload(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), Error> {
        let layers = self.layers.take().ok_or(Error::WindowNotLoaded)?;

        ctx.subscriptions.unsubscribe(Channel::Tick)?;
        ctx.subscriptions.unsubscribe(Channel::Connection)?;
        ctx.subscriptions.unsubscribe(Channel::Battery)?;

        ctx.layers.destroy(layers.background)?;
        ctx.layers.destroy(layers.battery)?;
        ctx.layers.destroy(layers.bluetooth)?;
        ctx.layers.destroy(layers.time)?;
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut WindowContext<'_>, event: &Event) -> Result<(), Error> {
        let layers = self.loaded()?;
        match event {
            Event::Tick { time, .. } => Self::show_time(ctx, layers.time, time),
            Event::Battery(state) => {
                debug!("Battery at {}%", state.charge_percent);
                ctx.layers.mark_dirty(layers.battery)
            }
            Event::Connection(connected) => {
                debug!("Companion app connected: {}", connected);
                ctx.layers.mark_dirty(layers.bluetooth)
            }
        }
    }

    fn paint<D, S>(
        &self,
        layer: LayerId,
        bounds: Rectangle,
        ctx: &mut D,
        services: &S,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = ColorMode>,
        S: Services,
    {
        let Some(layers) = self.layers else {
            return Ok(());
        };

        if layer == layers.background {
            background::paint(ctx, bounds, &self.config)
        } else if layer == layers.battery {
            battery::paint(ctx, services.battery_state().charge_percent, self.config.icon)
        } else if layer == layers.bluetooth {
            self.paths.paint(
                ctx,
                services.app_connected(),
                self.config.icon,
                self.config.attention,
            )
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{
        root_bounds,
        test_support::{time, FakeServices, FrameBuffer, PixelCounter},
        App, BatteryChargeState, Window,
    };
    use embedded_graphics::{geometry::Size, pixelcolor::RgbColor};

    type Screen = FrameBuffer<180, 180>;

    fn app(services: FakeServices) -> App<DefaultWatchface, FakeServices> {
        let size = Size::new(180, 180);
        let config = WatchfaceConfig::new(size);
        let window = Window::new(DefaultWatchface::new(config), root_bounds(size), config.base);
        App::new(window, services)
    }

    fn frame(app: &App<DefaultWatchface, FakeServices>, layer: Option<LayerId>) -> Rectangle {
        let layer = layer.expect("window is loaded");
        app.window().layers().frame(layer).unwrap()
    }

    #[test]
    fn time_is_shown_at_load() {
        let mut app = app(FakeServices::new(9, 5, 3));
        app.push().unwrap();

        let layer = app.window().handlers().time_layer().unwrap();
        assert_eq!(app.window().layers().text(layer), Ok("09:05:03"));

        let mut screen = Screen::new();
        assert_eq!(app.render(&mut screen), Ok(true));
        let time_frame = frame(&app, Some(layer));
        assert!(screen.count(time_frame, ColorMode::BLACK) > 0);
    }

    #[test]
    fn tick_replaces_time() {
        let mut app = app(FakeServices::new(9, 5, 3));
        app.push().unwrap();

        let tick = Event::Tick {
            time: time(9, 5, 4),
            units_changed: TimeUnits::SECOND,
        };
        assert_eq!(app.dispatch(&tick), Ok(true));

        let layer = app.window().handlers().time_layer().unwrap();
        assert_eq!(app.window().layers().text(layer), Ok("09:05:04"));
    }

    #[test]
    fn load_unload_leaves_nothing_behind() {
        let mut app = app(FakeServices::new(12, 0, 0));

        for _ in 0..2 {
            app.push().unwrap();
            assert_eq!(app.subscriptions().outstanding(), 3);
            assert_eq!(app.window().layers().live(), 4);

            app.pop().unwrap();
            assert_eq!(app.subscriptions().outstanding(), 0);
            assert_eq!(app.window().layers().live(), 0);
            assert_eq!(app.window().handlers().time_layer(), None);
        }

        assert!(app.destroy().is_ok());
    }

    #[test]
    fn double_push_is_rejected() {
        let mut app = app(FakeServices::new(12, 0, 0));
        app.push().unwrap();
        assert_eq!(app.push(), Err(Error::WindowAlreadyLoaded));
        assert_eq!(app.subscriptions().outstanding(), 3);
    }

    #[test]
    fn events_after_unload_are_dropped() {
        let mut app = app(FakeServices::new(12, 0, 0));
        let event = Event::Battery(BatteryChargeState::discharging(10));
        assert_eq!(app.dispatch(&event), Ok(false));

        app.push().unwrap();
        assert_eq!(app.dispatch(&event), Ok(true));

        app.pop().unwrap();
        assert_eq!(app.dispatch(&event), Ok(false));
        assert_eq!(app.pop(), Err(Error::WindowNotLoaded));
    }

    #[test]
    fn battery_fill_follows_charge() {
        let services = FakeServices::new(12, 0, 0);
        let mut app = app(services);
        app.push().unwrap();
        let mut screen = Screen::new();
        app.render(&mut screen).unwrap();
        let battery = frame(&app, app.window().handlers().battery_layer());

        let mut lit = |app: &mut App<DefaultWatchface, FakeServices>, percent: u8| {
            let state = BatteryChargeState::discharging(percent);
            app.services().battery.set(state);
            assert_eq!(app.dispatch(&Event::Battery(state)), Ok(true));
            assert_eq!(app.render(&mut screen), Ok(true));
            screen.count(battery, ColorMode::WHITE)
        };

        let half = lit(&mut app, 50);
        let empty = lit(&mut app, 0);
        let outline = 10 + 2 * 9 + 2 * 16;
        assert_eq!(half, outline + 5 * 8);
        assert_eq!(empty, outline);
        assert!(empty < half);
    }

    #[test]
    fn strikeout_only_while_disconnected() {
        let services = FakeServices::new(12, 0, 0);
        services.connected.set(false);
        let mut app = app(services);
        app.push().unwrap();

        let mut screen = Screen::new();
        app.render(&mut screen).unwrap();
        let icon = frame(&app, app.window().handlers().bluetooth_layer());
        assert!(screen.count(icon, ColorMode::RED) > 0);
        assert!(screen.count(icon, ColorMode::WHITE) > 0);

        app.services().connected.set(true);
        assert_eq!(app.dispatch(&Event::Connection(true)), Ok(true));
        assert_eq!(app.render(&mut screen), Ok(true));
        assert_eq!(screen.count(icon, ColorMode::RED), 0);
        assert!(screen.count(icon, ColorMode::WHITE) > 0);
    }

    #[test]
    fn attention_color_is_used_for_strikeout() {
        let size = Size::new(180, 180);
        let config = WatchfaceConfig::new(size).with_attention(ColorMode::YELLOW);
        let window = Window::new(DefaultWatchface::new(config), root_bounds(size), config.base);
        let services = FakeServices::new(12, 0, 0);
        services.connected.set(false);
        let mut app = App::new(window, services);
        app.push().unwrap();

        let mut screen = Screen::new();
        app.render(&mut screen).unwrap();
        let icon = frame(&app, app.window().handlers().bluetooth_layer());
        assert!(screen.count(icon, ColorMode::YELLOW) > 0);
        assert_eq!(screen.count(icon, ColorMode::RED), 0);
    }

    #[test]
    fn redraw_is_idempotent() {
        let mut app = app(FakeServices::new(7, 30, 0));
        app.push().unwrap();

        let mut screen = Screen::new();
        app.render(&mut screen).unwrap();
        // Nothing dirty, nothing painted
        assert_eq!(app.render(&mut screen), Ok(false));

        let before = screen.clone();
        app.dispatch(&Event::Connection(true)).unwrap();
        assert_eq!(app.render(&mut screen), Ok(true));
        assert!(screen == before);
    }

    #[test]
    fn tick_repaints_time_layer_only() {
        let size = Size::new(240, 240);
        let config = WatchfaceConfig::new(size);
        let window = Window::new(DefaultWatchface::new(config), root_bounds(size), config.base);
        let mut app = App::new(window, FakeServices::new(10, 0, 0));
        app.push().unwrap();
        app.render(&mut PixelCounter::new(size)).unwrap();

        let tick = Event::Tick {
            time: time(10, 0, 1),
            units_changed: TimeUnits::SECOND,
        };
        app.dispatch(&tick).unwrap();
        let mut counter = PixelCounter::new(size);
        assert_eq!(app.render(&mut counter), Ok(true));

        let time_frame = frame(&app, app.window().handlers().time_layer());
        let area = time_frame.size.width as usize * time_frame.size.height as usize;
        assert!(counter.written() > 0);
        assert_eq!(counter.written_within(time_frame), counter.written());
        // Window background, backdrop and the glyphs on top
        assert!(counter.written() <= 3 * area);
    }

    #[test]
    fn run_paints_every_event() {
        let mut app = app(FakeServices::new(23, 59, 58));
        app.push().unwrap();

        let events = [
            Event::Tick {
                time: time(23, 59, 59),
                units_changed: TimeUnits::SECOND,
            },
            Event::Connection(false),
        ];
        let mut screen = Screen::new();
        app.run(events, &mut screen).unwrap();

        let layer = app.window().handlers().time_layer().unwrap();
        assert_eq!(app.window().layers().text(layer), Ok("23:59:59"));
        assert!(!app.window().needs_redraw());
        assert!(app.destroy().is_ok());
    }
}
