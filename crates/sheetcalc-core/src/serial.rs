//! Serial date numbers
//!
//! Dates are stored as a count of days since 1899-12-30, the spreadsheet
//! epoch. The fractional part of a serial is the time of day.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Days from 0001-01-01 (CE day 1) to 1899-12-30
const EPOCH_DAYS_FROM_CE: i32 = 693_594;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Serial number of a calendar date
pub fn serial_from_date(date: NaiveDate) -> f64 {
    (date.num_days_from_ce() - EPOCH_DAYS_FROM_CE) as f64
}

/// Serial number of a date and time; the time becomes the fractional part
pub fn serial_from_datetime(dt: NaiveDateTime) -> f64 {
    serial_from_date(dt.date()) + dt.time().num_seconds_from_midnight() as f64 / SECONDS_PER_DAY
}

/// Calendar date of a serial number, ignoring the time of day
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.floor();
    if days < i32::MIN as f64 || days > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(EPOCH_DAYS_FROM_CE.checked_add(days as i32)?)
}

/// Date and time of a serial number, rounded to the nearest second
pub fn datetime_from_serial(serial: f64) -> Option<NaiveDateTime> {
    let date = date_from_serial(serial)?;
    let seconds = ((serial - serial.floor()) * SECONDS_PER_DAY).round() as u32;
    if seconds >= SECONDS_PER_DAY as u32 {
        let next = date.checked_add_signed(Duration::days(1))?;
        return Some(next.and_time(NaiveTime::MIN));
    }
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)?;
    Some(date.and_time(time))
}
