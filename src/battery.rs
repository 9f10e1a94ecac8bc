//! Battery level estimation
//!
//! Conversion based upon https://github.com/dbrgn/pinetime-rtic/blob/master/pinetime-rtic/src/battery.rs
//! and https://wiki.pine64.org/wiki/PineTime.

/// Largest value of a 12 bit SAADC sample
const ADC_MAX: i16 = 4095;

/// Convert a 12 bit SAADC sample of the halved battery voltage into millivolts.
pub fn millivolts_from_adc(raw_measurement: i16) -> Result<u16, Error> {
    match raw_measurement {
        0..=ADC_MAX => {
            // Multiply by 2 * 1000 for mV and divide by (2 ^ 12 / 3.3V reference).
            // Use u32 during calculation to prevent overflow
            Ok((raw_measurement as u32 * 2000 / 1241) as u16)
        }
        _ => Err(Error::InvalidMeasurement),
    }
}

/// Estimate the remaining capacity in percent from the battery voltage.
///
/// Uses fixed data points and linear interpolation in between.
pub fn percent_from_millivolts(voltage: u16) -> u8 {
    (match voltage {
        0..=3449 => 0,
        3450..=3699 => (voltage - 3450) / 5,
        3700..=4199 => 50 + (voltage - 3700) / 10,
        _ => 100,
    }) as u8
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    InvalidMeasurement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adc_range() {
        assert_eq!(millivolts_from_adc(0), Ok(0));
        assert_eq!(millivolts_from_adc(ADC_MAX), Ok(6599));
        assert_eq!(millivolts_from_adc(-1), Err(Error::InvalidMeasurement));
        assert_eq!(millivolts_from_adc(4096), Err(Error::InvalidMeasurement));
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(percent_from_millivolts(0), 0);
        assert_eq!(percent_from_millivolts(3449), 0);
        assert_eq!(percent_from_millivolts(3450), 0);
        assert_eq!(percent_from_millivolts(3700), 50);
        assert_eq!(percent_from_millivolts(4199), 99);
        assert_eq!(percent_from_millivolts(4200), 100);
        assert_eq!(percent_from_millivolts(u16::MAX), 100);
    }

    #[test]
    fn percent_is_monotonic() {
        let mut previous = 0;
        for voltage in 3000..4500 {
            let percent = percent_from_millivolts(voltage);
            assert!(percent >= previous, "{voltage} mV");
            assert!(percent <= 100);
            previous = percent;
        }
    }
}
