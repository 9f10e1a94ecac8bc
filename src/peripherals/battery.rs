//! Battery status check
//!
//! Implementation based upon https://github.com/dbrgn/pinetime-rtic/blob/master/pinetime-rtic/src/battery.rs
//! and https://wiki.pine64.org/wiki/PineTime.

use embassy_nrf::{
    gpio::Input,
    peripherals::{P0_12, P0_19},
    saadc::Saadc,
};
use pinetime_watchface::{
    battery::{millivolts_from_adc, percent_from_millivolts, Error},
    host::BatteryChargeState,
};

/// Battery configuration
struct BatteryConfig<'a> {
    /// ADC instance for battery voltage measurement
    adc: Saadc<'a, 1>,
    /// Charge indication pin:
    /// high = battery, low = charging
    pin_charge_indication: Input<'a, P0_12>,
    /// Power presence pin:
    /// high = no charger, low = charger connected
    pin_power_presence: Input<'a, P0_19>,
}

/// Battery API
pub struct Battery {
    /// Battery configuration
    config: BatteryConfig<'static>,
    /// Last measured state
    state: BatteryChargeState,
}

impl Battery {
    /// Configure battery settings on boot
    pub fn init(
        adc: Saadc<'static, 1>,
        charge_pin: Input<'static, P0_12>,
        power_pin: Input<'static, P0_19>,
    ) -> Self {
        Self {
            config: BatteryConfig {
                adc,
                pin_charge_indication: charge_pin,
                pin_power_presence: power_pin,
            },
            state: BatteryChargeState::default(),
        }
    }

    /// Last measured state.
    ///
    /// This returns the stored value. To fetch current data, call `update()` first.
    pub fn state(&self) -> BatteryChargeState {
        self.state
    }

    /// Update the battery state by reading information from the hardware.
    /// Return whether or not the values changed.
    pub async fn update(&mut self) -> Result<bool, Error> {
        let state = BatteryChargeState {
            charge_percent: percent_from_millivolts(self.voltage().await?),
            is_charging: self.config.pin_charge_indication.is_low(),
            is_plugged: self.config.pin_power_presence.is_low(),
        };

        let changed = state != self.state;
        self.state = state;
        Ok(changed)
    }

    /// Battery voltage in millivolts
    async fn voltage(&mut self) -> Result<u16, Error> {
        let mut buf = [0; 1];
        self.config.adc.sample(&mut buf).await;
        millivolts_from_adc(buf[0])
    }
}
