//! Named date formats used to parse constraint values and to display
//! timestamp statistics.
//!
//! A [`DateFormat`] is one or more named alternatives joined with `||`, for
//! example `strict_date_optional_time||epoch_millis`. Parsing tries every
//! alternative in order and formatting always uses the first one.

use std::fmt;

use fieldstats_common::{Error, Result};
use time::{
    Date as CalendarDate, OffsetDateTime, PrimitiveDateTime,
    format_description::well_known::Rfc3339, macros::format_description,
};

const ALTERNATIVE_SEPARATOR: &str = "||";

/// A single named date layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormatKind {
    StrictDateOptionalTime,
    DateOptionalTime,
    StrictDateTime,
    DateTime,
    StrictDate,
    Date,
    BasicDate,
    EpochMillis,
    EpochSecond,
}

impl DateFormatKind {
    const ALL: [DateFormatKind; 9] = [
        DateFormatKind::StrictDateOptionalTime,
        DateFormatKind::DateOptionalTime,
        DateFormatKind::StrictDateTime,
        DateFormatKind::DateTime,
        DateFormatKind::StrictDate,
        DateFormatKind::Date,
        DateFormatKind::BasicDate,
        DateFormatKind::EpochMillis,
        DateFormatKind::EpochSecond,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DateFormatKind::StrictDateOptionalTime => "strict_date_optional_time",
            DateFormatKind::DateOptionalTime => "date_optional_time",
            DateFormatKind::StrictDateTime => "strict_date_time",
            DateFormatKind::DateTime => "date_time",
            DateFormatKind::StrictDate => "strict_date",
            DateFormatKind::Date => "date",
            DateFormatKind::BasicDate => "basic_date",
            DateFormatKind::EpochMillis => "epoch_millis",
            DateFormatKind::EpochSecond => "epoch_second",
        }
    }

    pub fn from_name(name: &str) -> Option<DateFormatKind> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    fn parse_millis(self, raw: &str) -> Option<i64> {
        match self {
            DateFormatKind::StrictDateOptionalTime | DateFormatKind::DateOptionalTime => {
                parse_iso_date_time(raw).or_else(|| parse_calendar_date(raw))
            }
            DateFormatKind::StrictDateTime | DateFormatKind::DateTime => parse_iso_date_time(raw),
            DateFormatKind::StrictDate | DateFormatKind::Date => parse_calendar_date(raw),
            DateFormatKind::BasicDate => {
                let date = CalendarDate::parse(raw, format_description!("[year][month][day]"))
                    .ok()?;
                utc_millis(date.midnight().assume_utc())
            }
            DateFormatKind::EpochMillis => raw.trim().parse::<i64>().ok(),
            DateFormatKind::EpochSecond => parse_epoch_second(raw.trim()),
        }
    }

    fn format_millis(self, millis: i64) -> Option<String> {
        match self {
            DateFormatKind::EpochMillis => Some(millis.to_string()),
            DateFormatKind::EpochSecond => {
                let seconds = millis.div_euclid(1000);
                let fraction = millis.rem_euclid(1000);
                if fraction == 0 {
                    Some(seconds.to_string())
                } else {
                    Some(format!("{seconds}.{fraction:03}"))
                }
            }
            DateFormatKind::StrictDate | DateFormatKind::Date => {
                to_date_time(millis)?
                    .format(format_description!("[year]-[month]-[day]"))
                    .ok()
            }
            DateFormatKind::BasicDate => to_date_time(millis)?
                .format(format_description!("[year][month][day]"))
                .ok(),
            DateFormatKind::StrictDateOptionalTime
            | DateFormatKind::DateOptionalTime
            | DateFormatKind::StrictDateTime
            | DateFormatKind::DateTime => to_date_time(millis)?
                .format(format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
                ))
                .ok(),
        }
    }
}

/// An ordered list of date layouts, resolved from a `||`-separated pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateFormat {
    alternatives: Vec<DateFormatKind>,
}

impl DateFormat {
    /// The layout date fields use unless configured otherwise.
    pub const DEFAULT_PATTERN: &'static str = "strict_date_optional_time||epoch_millis";

    /// Resolves a pattern such as `date_optional_time` or
    /// `strict_date_optional_time||epoch_millis`.
    ///
    /// Fails with `InvalidDateFormat` when any alternative is unknown.
    pub fn parse(pattern: &str) -> Result<DateFormat> {
        let alternatives = pattern
            .split(ALTERNATIVE_SEPARATOR)
            .map(|name| DateFormatKind::from_name(name.trim()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::invalid_date_format(pattern))?;
        if alternatives.is_empty() {
            return Err(Error::invalid_date_format(pattern));
        }
        Ok(DateFormat { alternatives })
    }

    pub fn single(kind: DateFormatKind) -> DateFormat {
        DateFormat {
            alternatives: vec![kind],
        }
    }

    /// The pattern this format was resolved from, in canonical spelling.
    pub fn pattern(&self) -> String {
        self.alternatives
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(ALTERNATIVE_SEPARATOR)
    }

    pub fn alternatives(&self) -> &[DateFormatKind] {
        &self.alternatives
    }

    /// Parses `raw` into milliseconds since the epoch, trying each alternative.
    pub fn parse_millis(&self, raw: &str) -> Result<i64> {
        self.alternatives
            .iter()
            .find_map(|kind| kind.parse_millis(raw))
            .ok_or_else(|| {
                Error::validation(format!(
                    "failed to parse date value [{raw}] with format [{}]",
                    self.pattern()
                ))
            })
    }

    /// Formats `millis` with the first alternative. Instants outside the
    /// representable calendar range fall back to plain epoch milliseconds.
    pub fn format_millis(&self, millis: i64) -> String {
        self.alternatives
            .first()
            .and_then(|kind| kind.format_millis(millis))
            .unwrap_or_else(|| millis.to_string())
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        DateFormat {
            alternatives: vec![
                DateFormatKind::StrictDateOptionalTime,
                DateFormatKind::EpochMillis,
            ],
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern())
    }
}

fn parse_iso_date_time(raw: &str) -> Option<i64> {
    if let Ok(date_time) = OffsetDateTime::parse(raw, &Rfc3339) {
        return utc_millis(date_time);
    }
    if let Ok(date_time) = PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
    ) {
        return utc_millis(date_time.assume_utc());
    }
    PrimitiveDateTime::parse(raw, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
        .ok()
        .and_then(|date_time| utc_millis(date_time.assume_utc()))
}

fn parse_calendar_date(raw: &str) -> Option<i64> {
    let date = CalendarDate::parse(raw, format_description!("[year]-[month]-[day]")).ok()?;
    utc_millis(date.midnight().assume_utc())
}

fn parse_epoch_second(raw: &str) -> Option<i64> {
    let (seconds, fraction) = match raw.split_once('.') {
        Some((seconds, fraction)) => (seconds, fraction),
        None => (raw, ""),
    };
    let seconds = seconds.parse::<i64>().ok()?;
    let mut millis = 0i64;
    if !fraction.is_empty() {
        if fraction.len() > 3 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        millis = format!("{fraction:0<3}").parse::<i64>().ok()?;
        if seconds < 0 || raw.starts_with('-') {
            millis = -millis;
        }
    }
    seconds.checked_mul(1000)?.checked_add(millis)
}

fn utc_millis(date_time: OffsetDateTime) -> Option<i64> {
    i64::try_from(date_time.unix_timestamp_nanos().div_euclid(1_000_000)).ok()
}

fn to_date_time(millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000).ok()
}
