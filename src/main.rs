#![no_std]
#![no_main]

mod peripherals;
mod system;

// Panic handler and debugging
use defmt::unwrap;

use defmt_rtt as _;
use panic_probe as _;

// Device
use embassy_executor::Spawner;
use embassy_nrf::{
    bind_interrupts,
    gpio::{Input, Level, Output, OutputDrive, Pull},
    peripherals::SPI2,
    saadc::{self, ChannelConfig, Resolution, Saadc},
    spim,
};
use embassy_time::{Duration, Ticker, Timer};
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<SPI2>;
});

// Crate
use peripherals::{backlight::Backlight, battery::Battery, display::Display};
use system::{
    bluetooth::{self, Server},
    config::{self, system_config},
    state::{self, DeviceServices, BATTERY_CHANGED, CONNECTION_CHANGED},
    time::{TimeManager, TimeReference},
};

// Watchface
use embedded_graphics::geometry::OriginDimensions;
use pinetime_watchface::{
    host::{root_bounds, App, Event, Services, TimeUnits, Window},
    ui::clock,
    DefaultWatchface, WatchfaceConfig,
};

// Include current UTC epoch at compile time
include!(concat!(env!("OUT_DIR"), "/utc.rs"));
const TIMEZONE: i32 = 1 * 3_600;

/// Delay after a second boundary before the clock is sampled
const TICK_MARGIN_MS: u32 = 10;

static SERVER: StaticCell<Server> = StaticCell::new();
static BACKLIGHT: StaticCell<Backlight> = StaticCell::new();

/// Drive the SoftDevice event loop.
#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Keep the companion app connection up.
#[embassy_executor::task]
async fn bluetooth_task(sd: &'static Softdevice, server: &'static Server) {
    loop {
        bluetooth::advertise_and_serve(sd, server).await;
    }
}

/// Fetch the battery status from the hardware.
#[embassy_executor::task]
async fn update_battery_status(mut battery: Battery, server: &'static Server) {
    loop {
        match battery.update().await {
            Ok(true) => {
                // Battery status changed
                let status = battery.state();
                defmt::info!(
                    "Battery status: {}% ({})",
                    status.charge_percent,
                    if status.is_charging {
                        "charging"
                    } else {
                        "discharging"
                    }
                );
                state::set_battery(status);
                bluetooth::set_battery_level(server, status.charge_percent);
            }
            Ok(false) => {}
            Err(e) => defmt::warn!("Battery measurement failed: {}", e),
        }

        // Re-schedule the timer interrupt in 1s
        Timer::after(Duration::from_secs(1)).await;
    }
}

/// Run the watchface: deliver ticks and state changes, repaint what changed.
#[embassy_executor::task]
async fn ui(mut display: Display, services: DeviceServices) {
    let size = display.size();
    let config = WatchfaceConfig::new(size);
    let window = Window::new(DefaultWatchface::new(config), root_bounds(size), config.base);
    let mut app = App::new(window, services);

    if let Err(e) = app.push() {
        defmt::error!("Failed to load watchface: {}", e);
        return;
    }

    // Sample the clock just after each second starts
    let now = app.services().local_time();
    let offset = clock::millis_to_next_second(&now) + TICK_MARGIN_MS;
    Timer::after(Duration::from_millis(u64::from(offset))).await;

    let mut last_tick = now;
    let mut tick = Ticker::every(Duration::from_secs(1));
    loop {
        if BATTERY_CHANGED.signaled() {
            let status = BATTERY_CHANGED.wait().await;
            dispatch(&mut app, Event::Battery(status));
        }

        if CONNECTION_CHANGED.signaled() {
            let connected = CONNECTION_CHANGED.wait().await;
            dispatch(&mut app, Event::Connection(connected));
        }

        let now = app.services().local_time();
        let units_changed = TimeUnits::changed_between(&last_tick, &now);
        if !units_changed.is_empty() {
            dispatch(
                &mut app,
                Event::Tick {
                    time: now,
                    units_changed,
                },
            );
            last_tick = now;
        }

        if let Err(e) = app.render(&mut display) {
            defmt::error!("Failed to draw watchface: {}", e);
        }

        // Re-schedule the timer interrupt in 1s
        tick.next().await;
    }
}

fn dispatch(app: &mut App<DefaultWatchface, DeviceServices>, event: Event) {
    if let Err(e) = app.dispatch(&event) {
        defmt::error!("Failed to handle event: {}", e);
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut p = embassy_nrf::init(system_config());
    defmt::info!("Initializing");

    config::set_peripheral_priorities();

    // Initialize Bluetooth
    let sd = Softdevice::enable(&bluetooth::softdevice_config());
    let server = SERVER.init(unwrap!(Server::new(sd)));
    let sd: &'static Softdevice = sd;
    let server: &'static Server = server;
    unwrap!(spawner.spawn(softdevice_task(sd)));

    // Initialize SAADC
    let mut saadc_config = saadc::Config::default();
    // Set resolution to 12bit, necessary for correct battery status calculation
    saadc_config.resolution = Resolution::_12BIT;
    // Pin P0.31: Voltage level
    let channel_config = ChannelConfig::single_ended(&mut p.P0_31);
    let saadc = Saadc::new(p.SAADC, Irqs, saadc_config, [channel_config]);
    saadc.calibrate().await;

    // Initialize Battery
    let mut battery = Battery::init(
        saadc,
        Input::new(p.P0_12, Pull::None),
        Input::new(p.P0_19, Pull::None),
    );
    if let Err(e) = battery.update().await {
        defmt::warn!("Initial battery measurement failed: {}", e);
    }
    // Later updates only publish changes
    state::set_battery(battery.state());
    bluetooth::set_battery_level(server, battery.state().charge_percent);

    // Initialize Backlight
    let backlight = BACKLIGHT.init(unwrap!(Backlight::init(
        Output::new(p.P0_14, Level::High, OutputDrive::Standard),
        Output::new(p.P0_22, Level::High, OutputDrive::Standard),
        Output::new(p.P0_23, Level::High, OutputDrive::Standard),
        2,
    )));
    defmt::info!("Backlight at level {}", backlight.brightness());

    // Initialize SPI
    let mut spim_config = spim::Config::default();
    // Use SPI at 8MHz (the fastest clock available on the nRF52832),
    // otherwise refreshing will be super slow.
    spim_config.frequency = spim::Frequency::M8;
    // SPI must be used in mode 3. Mode 0 (the default) won't work.
    spim_config.mode = spim::MODE_3;

    let spim = spim::Spim::new(p.SPI2, Irqs, p.P0_02, p.P0_04, p.P0_03, spim_config);

    // Initialize LCD
    let display = unwrap!(Display::init(
        spim,
        Output::new(p.P0_25, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_18, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_26, Level::Low, OutputDrive::Standard),
    ));

    // Initialize clock from build time
    let reference = unwrap!(TimeReference::from_timestamp(UTC_EPOCH, TIMEZONE));
    let services = DeviceServices::new(TimeManager::init(reference));

    defmt::info!("Initialization finished");

    // Schedule tasks
    unwrap!(spawner.spawn(bluetooth_task(sd, server)));
    unwrap!(spawner.spawn(update_battery_status(battery, server)));
    unwrap!(spawner.spawn(ui(display, services)));
}
