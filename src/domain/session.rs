//! Trading session classification.
//!
//! Sessions are defined in New York local hours using a fixed UTC-5 offset
//! (no daylight-saving adjustment). Entries are only taken during the Asian
//! and London sessions; New York and the off hours around the daily roll
//! are observed but not traded.

use chrono::{NaiveDateTime, Timelike};

const NY_UTC_OFFSET_HOURS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Asian,
    London,
    NewYork,
    Off,
}

impl Session {
    /// Classify a UTC timestamp by its New York hour.
    pub fn classify(time: NaiveDateTime) -> Self {
        let ny_hour = (time.hour() + 24 - NY_UTC_OFFSET_HOURS) % 24;
        match ny_hour {
            19..=23 | 0..=1 => Session::Asian,
            3..=11 => Session::London,
            12..=16 => Session::NewYork,
            _ => Session::Off,
        }
    }

    pub fn tradeable(self) -> bool {
        matches!(self, Session::Asian | Session::London)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at_utc(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 10)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    #[test]
    fn asian_session_wraps_midnight() {
        // 00:00 NY = 05:00 UTC
        assert_eq!(Session::classify(at_utc(0)), Session::Asian); // 19:30 NY
        assert_eq!(Session::classify(at_utc(5)), Session::Asian); // 00:30 NY
        assert_eq!(Session::classify(at_utc(6)), Session::Asian); // 01:30 NY
        assert_eq!(Session::classify(at_utc(7)), Session::Off); // 02:30 NY
    }

    #[test]
    fn london_session() {
        assert_eq!(Session::classify(at_utc(8)), Session::London); // 03:30 NY
        assert_eq!(Session::classify(at_utc(16)), Session::London); // 11:30 NY
    }

    #[test]
    fn new_york_session() {
        assert_eq!(Session::classify(at_utc(17)), Session::NewYork); // 12:30 NY
        assert_eq!(Session::classify(at_utc(21)), Session::NewYork); // 16:30 NY
    }

    #[test]
    fn off_hours_between_new_york_and_asian() {
        assert_eq!(Session::classify(at_utc(22)), Session::Off); // 17:30 NY
        assert_eq!(Session::classify(at_utc(23)), Session::Off); // 18:30 NY
    }

    #[test]
    fn only_asian_and_london_are_tradeable() {
        assert!(Session::Asian.tradeable());
        assert!(Session::London.tradeable());
        assert!(!Session::NewYork.tradeable());
        assert!(!Session::Off.tradeable());
    }
}
