//! Time text

use chrono::{NaiveDateTime, Timelike};

use crate::host::Error;

/// Length of `HH:MM:SS`
pub const TIME_LEN: usize = 8;

/// Format `time` as zero-padded `HH:MM:SS` into `buf`.
pub fn format_time<'a>(buf: &'a mut [u8; TIME_LEN], time: &NaiveDateTime) -> Result<&'a str, Error> {
    format_no_std::show(
        buf,
        format_args!("{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second()),
    )
    .map_err(|_| Error::Format)
}

/// Milliseconds from `time` to the start of the next second.
pub fn millis_to_next_second(time: &NaiveDateTime) -> u32 {
    // Leap seconds push the fraction past one second
    let millis = (time.nanosecond() / 1_000_000).min(999);
    1_000 - millis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::test_support::time;

    #[test]
    fn pads_with_zeros() {
        let mut buf = [0; TIME_LEN];
        assert_eq!(format_time(&mut buf, &time(9, 5, 3)), Ok("09:05:03"));
    }

    #[test]
    fn every_second_of_the_day_is_eight_chars() {
        let mut buf = [0; TIME_LEN];
        for hour in 0..24 {
            for min in 0..60 {
                for sec in 0..60 {
                    let text = format_time(&mut buf, &time(hour, min, sec)).unwrap();
                    let bytes = text.as_bytes();
                    assert_eq!(bytes.len(), TIME_LEN);
                    assert_eq!((bytes[2], bytes[5]), (b':', b':'));
                    assert!(bytes
                        .iter()
                        .enumerate()
                        .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit()));
                }
            }
        }
    }

    #[test]
    fn last_second_of_the_day() {
        let mut buf = [0; TIME_LEN];
        assert_eq!(format_time(&mut buf, &time(23, 59, 59)), Ok("23:59:59"));
    }

    #[test]
    fn next_second_boundary() {
        let at = |millis: u32| time(12, 0, 59).with_nanosecond(millis * 1_000_000).unwrap();
        assert_eq!(millis_to_next_second(&time(12, 0, 0)), 1_000);
        assert_eq!(millis_to_next_second(&at(1)), 999);
        assert_eq!(millis_to_next_second(&at(999)), 1);
        assert_eq!(millis_to_next_second(&at(1_500)), 1);
    }
}
