//! Notification channels and peek queries
//!
//! The host keeps the authoritative battery, connection and time state. Paint
//! routines read it through [`Services`] every time they run; the watchface
//! never keeps a copy.

use core::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike};

use super::Error;

/// Battery state as reported by the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryChargeState {
    /// Charge in percent (0–100)
    pub charge_percent: u8,
    /// Battery is currently charging
    pub is_charging: bool,
    /// Charger is connected
    pub is_plugged: bool,
}

impl BatteryChargeState {
    /// Battery state for a discharging battery at the given level.
    pub fn discharging(charge_percent: u8) -> Self {
        Self {
            charge_percent: charge_percent.min(100),
            is_charging: false,
            is_plugged: false,
        }
    }
}

/// Peek queries answered by the host
pub trait Services {
    /// Current battery state
    fn battery_state(&self) -> BatteryChargeState;

    /// Whether the companion app is connected
    fn app_connected(&self) -> bool;

    /// Current local time
    fn local_time(&self) -> NaiveDateTime;
}

/// Set of calendar units, used both as tick granularity and to describe
/// which units changed since the previous tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeUnits(u8);

impl TimeUnits {
    pub const NONE: Self = Self(0);
    pub const SECOND: Self = Self(1 << 0);
    pub const MINUTE: Self = Self(1 << 1);
    pub const HOUR: Self = Self(1 << 2);
    pub const DAY: Self = Self(1 << 3);
    pub const MONTH: Self = Self(1 << 4);
    pub const YEAR: Self = Self(1 << 5);

    /// Units whose value differs between two points in time.
    pub fn changed_between(previous: &NaiveDateTime, next: &NaiveDateTime) -> Self {
        let mut units = Self::NONE;
        if previous.second() != next.second() {
            units = units | Self::SECOND;
        }
        if previous.minute() != next.minute() {
            units = units | Self::MINUTE;
        }
        if previous.hour() != next.hour() {
            units = units | Self::HOUR;
        }
        if previous.day() != next.day() {
            units = units | Self::DAY;
        }
        if previous.month() != next.month() {
            units = units | Self::MONTH;
        }
        if previous.year() != next.year() {
            units = units | Self::YEAR;
        }
        units
    }

    /// Whether both sets share at least one unit.
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether every unit of `other` is contained.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl core::ops::BitOr for TimeUnits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Notification channels offered by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Tick,
    Battery,
    Connection,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Tick => "tick",
            Channel::Battery => "battery",
            Channel::Connection => "connection",
        })
    }
}

/// Notification delivered by the host event loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Clock advanced
    Tick {
        time: NaiveDateTime,
        units_changed: TimeUnits,
    },
    /// Battery state changed
    Battery(BatteryChargeState),
    /// Companion app connected or disconnected
    Connection(bool),
}

impl Event {
    /// Channel this event is delivered on.
    pub fn channel(&self) -> Channel {
        match self {
            Event::Tick { .. } => Channel::Tick,
            Event::Battery(_) => Channel::Battery,
            Event::Connection(_) => Channel::Connection,
        }
    }
}

/// Subscriptions currently held by the application
#[derive(Clone, Copy, Debug, Default)]
pub struct Subscriptions {
    /// Requested tick granularity, `None` when not subscribed
    tick: Option<TimeUnits>,
    battery: bool,
    connection: bool,
}

impl Subscriptions {
    /// Subscribe to clock ticks of the given granularity.
    pub fn subscribe_tick(&mut self, units: TimeUnits) -> Result<(), Error> {
        if self.tick.is_some() {
            return Err(Error::AlreadySubscribed(Channel::Tick));
        }
        debug!("Subscribed to tick service");
        self.tick = Some(units);
        Ok(())
    }

    /// Subscribe to battery state changes.
    pub fn subscribe_battery(&mut self) -> Result<(), Error> {
        Self::subscribe(&mut self.battery, Channel::Battery)
    }

    /// Subscribe to companion connection changes.
    pub fn subscribe_connection(&mut self) -> Result<(), Error> {
        Self::subscribe(&mut self.connection, Channel::Connection)
    }

    fn subscribe(flag: &mut bool, channel: Channel) -> Result<(), Error> {
        if *flag {
            return Err(Error::AlreadySubscribed(channel));
        }
        debug!("Subscribed to {} service", channel);
        *flag = true;
        Ok(())
    }

    /// Cancel the subscription to a channel.
    pub fn unsubscribe(&mut self, channel: Channel) -> Result<(), Error> {
        let subscribed = match channel {
            Channel::Tick => self.tick.take().is_some(),
            Channel::Battery => core::mem::replace(&mut self.battery, false),
            Channel::Connection => core::mem::replace(&mut self.connection, false),
        };
        if !subscribed {
            return Err(Error::NotSubscribed(channel));
        }
        debug!("Unsubscribed from {} service", channel);
        Ok(())
    }

    /// Whether an event should reach the application.
    pub fn wants(&self, event: &Event) -> bool {
        match event {
            Event::Tick { units_changed, .. } => self
                .tick
                .is_some_and(|granularity| granularity.intersects(*units_changed)),
            Event::Battery(_) => self.battery,
            Event::Connection(_) => self.connection,
        }
    }

    /// Number of channels currently subscribed.
    pub fn outstanding(&self) -> usize {
        self.tick.is_some() as usize + self.battery as usize + self.connection as usize
    }
}
