//! Parser for SCIM `dateTime` values.
//!
//! SCIM timestamps follow xsd:dateTime, which is looser than RFC 3339:
//! the offset may be omitted (a local timestamp), fractional seconds may
//! have any number of digits, and `24:00:00` is a legal spelling of the
//! midnight that ends the given day.

use crate::error::FormatError;

use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]+))?(Z|[+-][0-9]{2}:[0-9]{2})?$",
    )
    .expect("dateTime pattern is valid")
});

const MAX_OFFSET_HOURS: u32 = 14;

/// A parsed `dateTime` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    /// Wall-clock time as written, with `24:00:00` normalised to midnight
    /// of the following day
    pub local: NaiveDateTime,
    /// Offset from UTC, `None` for a local timestamp
    pub offset: Option<FixedOffset>,
}

/// Parse an xsd:dateTime string.
pub fn parse_timestamp(value: &str) -> Result<Timestamp, FormatError> {
    let captures = DATE_TIME
        .captures(value)
        .ok_or_else(|| FormatError::new(value, "expected YYYY-MM-DDThh:mm:ss[.fraction][offset]"))?;
    let number = |index: usize| -> u32 {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or_default()
    };

    let year = captures[1]
        .parse::<i32>()
        .map_err(|e| FormatError::new(value, e.to_string()))?;
    let (month, day) = (number(2), number(3));
    let (hour, minute, second) = (number(4), number(5), number(6));
    let fraction = captures.get(7).map(|m| m.as_str()).unwrap_or("");

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| FormatError::new(value, "date is out of range"))?;
    if minute > 59 {
        return Err(FormatError::new(value, "minutes must be between 00 and 59"));
    }
    if second > 59 {
        return Err(FormatError::new(value, "seconds must be between 00 and 59"));
    }

    let local = match hour {
        0..=23 => {
            let nanos = fraction_to_nanos(fraction);
            let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
                .ok_or_else(|| FormatError::new(value, "time is out of range"))?;
            date.and_time(time)
        }
        24 => {
            if minute != 0 || second != 0 || fraction.bytes().any(|b| b != b'0') {
                return Err(FormatError::new(
                    value,
                    "hour 24 is only allowed as 24:00:00",
                ));
            }
            date.and_time(NaiveTime::MIN)
                .checked_add_signed(Duration::days(1))
                .ok_or_else(|| FormatError::new(value, "date is out of range"))?
        }
        _ => return Err(FormatError::new(value, "hours must be between 00 and 24")),
    };

    let offset = captures
        .get(8)
        .map(|m| parse_offset(value, m.as_str()))
        .transpose()?;

    Ok(Timestamp { local, offset })
}

fn fraction_to_nanos(fraction: &str) -> u32 {
    // Digits beyond nanosecond precision are truncated.
    let mut nanos = 0u32;
    for (i, digit) in fraction.bytes().take(9).enumerate() {
        nanos += u32::from(digit - b'0') * 10u32.pow(8 - i as u32);
    }
    nanos
}

fn parse_offset(value: &str, offset: &str) -> Result<FixedOffset, FormatError> {
    if offset == "Z" {
        return FixedOffset::east_opt(0).ok_or_else(|| FormatError::new(value, "invalid offset"));
    }
    let sign = if offset.starts_with('-') { -1 } else { 1 };
    let hours: u32 = offset[1..3]
        .parse()
        .map_err(|_| FormatError::new(value, "invalid offset hours"))?;
    let minutes: u32 = offset[4..6]
        .parse()
        .map_err(|_| FormatError::new(value, "invalid offset minutes"))?;
    if minutes > 59 || hours > MAX_OFFSET_HOURS || (hours == MAX_OFFSET_HOURS && minutes != 0) {
        return Err(FormatError::new(
            value,
            "offset must be between -14:00 and +14:00",
        ));
    }
    let seconds = sign * (hours * 3600 + minutes * 60) as i32;
    FixedOffset::east_opt(seconds).ok_or_else(|| FormatError::new(value, "invalid offset"))
}
