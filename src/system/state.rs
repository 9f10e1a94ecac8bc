//! Device state
//!
//! The hardware tasks own the authoritative battery and connection state and
//! publish it here. The watchface reads it through [`DeviceServices`] whenever
//! it paints and is woken through the change signals.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use chrono::NaiveDateTime;
use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, signal::Signal};
use pinetime_watchface::host::{BatteryChargeState, Services};

use super::time::TimeManager;

static BATTERY_PERCENT: AtomicU8 = AtomicU8::new(0);
static BATTERY_CHARGING: AtomicBool = AtomicBool::new(false);
static BATTERY_PLUGGED: AtomicBool = AtomicBool::new(false);
static APP_CONNECTED: AtomicBool = AtomicBool::new(false);

// Communication channels
pub static BATTERY_CHANGED: Signal<ThreadModeRawMutex, BatteryChargeState> = Signal::new();
pub static CONNECTION_CHANGED: Signal<ThreadModeRawMutex, bool> = Signal::new();

/// Publish a new battery state and wake the watchface.
pub fn set_battery(state: BatteryChargeState) {
    BATTERY_PERCENT.store(state.charge_percent, Ordering::Relaxed);
    BATTERY_CHARGING.store(state.is_charging, Ordering::Relaxed);
    BATTERY_PLUGGED.store(state.is_plugged, Ordering::Relaxed);
    BATTERY_CHANGED.signal(state);
}

/// Publish the companion connection state and wake the watchface.
pub fn set_connected(connected: bool) {
    if APP_CONNECTED.swap(connected, Ordering::Relaxed) != connected {
        CONNECTION_CHANGED.signal(connected);
    }
}

/// Peek queries of the watchface, answered from the published state
pub struct DeviceServices {
    time: TimeManager,
}

impl DeviceServices {
    pub fn new(time: TimeManager) -> Self {
        Self { time }
    }
}

impl Services for DeviceServices {
    fn battery_state(&self) -> BatteryChargeState {
        BatteryChargeState {
            charge_percent: BATTERY_PERCENT.load(Ordering::Relaxed),
            is_charging: BATTERY_CHARGING.load(Ordering::Relaxed),
            is_plugged: BATTERY_PLUGGED.load(Ordering::Relaxed),
        }
    }

    fn app_connected(&self) -> bool {
        APP_CONNECTED.load(Ordering::Relaxed)
    }

    fn local_time(&self) -> NaiveDateTime {
        self.time.local_time()
    }
}
