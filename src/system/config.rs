//! Clock, power and interrupt setup for running next to the SoftDevice

use embassy_nrf::{
    config::{Config, Debug, HfclkSource, LfclkSource},
    interrupt::{self, InterruptExt, Priority},
};

// Priorities 0, 1 and 4 belong to the SoftDevice.

/// Interrupt priority of the embassy time driver and GPIOTE
pub const TIMER_PRIORITY: Priority = Priority::P2;
/// Interrupt priority of the peripherals the tasks drive
pub const PERIPHERAL_PRIORITY: Priority = Priority::P3;

/// System configuration passed to `embassy_nrf::init`
pub fn system_config() -> Config {
    let mut config = Config::default();

    // The SoftDevice needs the LF crystal, the radio the HF one
    config.hfclk_source = HfclkSource::ExternalXtal;
    config.lfclk_source = LfclkSource::ExternalXtal;

    // DC/DC regulator, far less current than the LDO
    config.dcdc.reg1 = true;

    config.gpiote_interrupt_priority = TIMER_PRIORITY;
    config.time_interrupt_priority = TIMER_PRIORITY;

    config.debug = Debug::Allowed;
    config
}

/// Move the interrupts of the battery ADC and the display bus out of the
/// SoftDevice's priorities. Must run before the SoftDevice is enabled.
pub fn set_peripheral_priorities() {
    interrupt::SAADC.set_priority(PERIPHERAL_PRIORITY);
    interrupt::SPIM2_SPIS2_SPI2.set_priority(PERIPHERAL_PRIORITY);
}
