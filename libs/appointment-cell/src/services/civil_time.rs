// libs/appointment-cell/src/services/civil_time.rs
use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::AppointmentError;

/// Zone every booking wall-clock is entered and displayed in.
pub const REFERENCE_TZ: Tz = chrono_tz::America::Sao_Paulo;

const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// A submitted date/time before a zone has been applied to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WallClock {
    Local(NaiveDateTime),
    /// The input carried its own offset, so it already names an instant.
    Offset(DateTime<FixedOffset>),
}

impl WallClock {
    pub fn parse(input: &str) -> Result<Self, AppointmentError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppointmentError::InvalidDateTime("empty date/time".to_string()));
        }

        if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
            return Ok(WallClock::Offset(instant));
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
                return Ok(WallClock::Local(naive));
            }
        }

        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(WallClock::Local)
            .ok_or_else(|| AppointmentError::InvalidDateTime(input.to_string()))
    }

    /// Resolves the wall-clock against America/Sao_Paulo. Ambiguous times take
    /// the earlier instant; times inside a DST gap move forward one hour.
    pub fn in_reference_zone(&self) -> DateTime<Utc> {
        match self {
            WallClock::Offset(instant) => instant.with_timezone(&Utc),
            WallClock::Local(naive) => match REFERENCE_TZ.from_local_datetime(naive) {
                LocalResult::Single(dt) => dt.with_timezone(&Utc),
                LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
                LocalResult::None => REFERENCE_TZ
                    .from_local_datetime(&(*naive + Duration::hours(1)))
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|| naive.and_utc()),
            },
        }
    }

    /// The wall-clock taken as a UTC reading with no zone conversion.
    pub fn as_utc(&self) -> DateTime<Utc> {
        match self {
            WallClock::Offset(instant) => instant.with_timezone(&Utc),
            WallClock::Local(naive) => naive.and_utc(),
        }
    }
}

pub fn civil_to_utc(input: &str) -> Result<DateTime<Utc>, AppointmentError> {
    Ok(WallClock::parse(input)?.in_reference_zone())
}

/// `DD/MM/YYYY HH:mm` in America/Sao_Paulo.
pub fn format_civil(instant: &DateTime<Utc>) -> String {
    instant.with_timezone(&REFERENCE_TZ).format(DISPLAY_FORMAT).to_string()
}
