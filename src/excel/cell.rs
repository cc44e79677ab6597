use std::fmt;

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use iso8601_duration::Duration as IsoDuration;

const SECONDS_PER_DAY: i64 = 86_400;

/// Largest integer an `f64` represents exactly.
pub const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single worksheet value after loading.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Duration(Duration),
    Error(String),
}

impl CellValue {
    /// Convert a calamine cell, treating text equal to any of `missing_markers` as empty.
    pub fn from_data(data: &Data, missing_markers: &[String]) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => {
                if missing_markers.iter().any(|marker| marker == s) {
                    CellValue::Empty
                } else {
                    CellValue::Text(s.clone())
                }
            }
            Data::Float(f) => CellValue::Float(*f),
            Data::Int(i) => CellValue::Int(*i),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::Error(e) => CellValue::Error(format!("{:?}", e)),
            Data::DateTime(dt) => {
                let serial = dt.as_f64();
                let converted = if dt.is_duration() {
                    duration_from_serial(serial).map(CellValue::Duration)
                } else if (0.0..1.0).contains(&serial) {
                    time_from_serial(serial).map(CellValue::Time)
                } else {
                    datetime_from_serial(serial).map(CellValue::DateTime)
                };
                converted.unwrap_or(CellValue::Float(serial))
            }
            Data::DateTimeIso(s) => {
                parse_iso_datetime(s).unwrap_or_else(|| CellValue::Text(s.clone()))
            }
            Data::DurationIso(s) => parse_iso_duration(s)
                .map(CellValue::Duration)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
        }
    }

    /// Blank cells, error cells and NaN numbers carry no value.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Empty | CellValue::Error(_) => true,
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(n) => {
                if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            CellValue::Duration(d) => {
                let total = d.num_seconds();
                let days = total.div_euclid(SECONDS_PER_DAY);
                let rest = total.rem_euclid(SECONDS_PER_DAY);
                write!(
                    f,
                    "{} days {:02}:{:02}:{:02}",
                    days,
                    rest / 3600,
                    (rest % 3600) / 60,
                    rest % 60
                )
            }
            CellValue::Error(e) => f.write_str(e),
        }
    }
}

// Convert an Excel serial date (1900 system) to a timestamp, rounded to the second
pub fn datetime_from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    // Serial 60 is the nonexistent 1900-02-29; earlier serials are one day off
    let epoch = if serial < 60.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    let seconds = (serial * SECONDS_PER_DAY as f64).round() as i64;
    epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::try_seconds(seconds)?)
}

pub fn time_from_serial(serial: f64) -> Option<NaiveTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let seconds = (serial.fract() * SECONDS_PER_DAY as f64).round() as i64 % SECONDS_PER_DAY;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds as u32, 0)
}

pub fn duration_from_serial(serial: f64) -> Option<Duration> {
    if !serial.is_finite() {
        return None;
    }

    Duration::try_seconds((serial * SECONDS_PER_DAY as f64).round() as i64)
}

// OpenDocument stores dates as ISO 8601 text
fn parse_iso_datetime(s: &str) -> Option<CellValue> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(CellValue::DateTime(dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(CellValue::DateTime);
    }
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .ok()
        .map(CellValue::Time)
}

// OpenDocument durations look like "PT36H30M00S"; years and months have no fixed length
fn parse_iso_duration(s: &str) -> Option<Duration> {
    let duration = s.parse::<IsoDuration>().ok()?;
    if duration.year != 0.0 || duration.month != 0.0 {
        return None;
    }

    let seconds = f64::from(duration.day) * SECONDS_PER_DAY as f64
        + f64::from(duration.hour) * 3600.0
        + f64::from(duration.minute) * 60.0
        + f64::from(duration.second);
    Duration::try_seconds(seconds.round() as i64)
}
