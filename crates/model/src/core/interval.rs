//! Calendar interval used to step date and timestamp ranges.

use crate::core::error::ValueError;
use chrono::{Months, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;
const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;
const DAYS_PER_MONTH: i64 = 30;

/// An interval kept as separate month, day and microsecond fields, so that
/// `'1 month'` moves a date to the same day of the next month.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Interval {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

enum Unit {
    Months(i64),
    Days(i64),
    Micros(i64),
}

impl Interval {
    pub const fn new(months: i32, days: i32, micros: i64) -> Self {
        Self {
            months,
            days,
            micros,
        }
    }

    pub fn months(months: i32) -> Self {
        Self::new(months, 0, 0)
    }

    pub fn days(days: i32) -> Self {
        Self::new(0, days, 0)
    }

    /// Parses the verbose interval syntax: `'1 year 2 months'`, `'3 days 04:00:00'`,
    /// `'@ 1 hour ago'`. A bare number is taken as seconds.
    pub fn parse(input: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::InvalidInput {
            type_name: "interval".to_string(),
            input: input.to_string(),
        };

        let mut months: i64 = 0;
        let mut days: i64 = 0;
        let mut micros: f64 = 0.0;
        let mut negate = false;
        let mut seen = false;

        let tokens: Vec<&str> = input.split_whitespace().collect();
        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i].to_lowercase();
            i += 1;

            if token == "@" {
                continue;
            }
            if token == "ago" {
                negate = true;
                continue;
            }
            if token.contains(':') {
                micros += parse_clock(&token).ok_or_else(invalid)?;
                seen = true;
                continue;
            }

            let split = token
                .find(|c: char| c.is_ascii_alphabetic())
                .unwrap_or(token.len());
            let (number, attached_unit) = token.split_at(split);
            let quantity: f64 = number.parse().map_err(|_| invalid())?;

            let unit_name = if !attached_unit.is_empty() {
                attached_unit.to_string()
            } else if i < tokens.len() && tokens[i].starts_with(|c: char| c.is_ascii_alphabetic()) {
                let unit = tokens[i].to_lowercase();
                if unit == "ago" {
                    "second".to_string()
                } else {
                    i += 1;
                    unit
                }
            } else {
                "second".to_string()
            };

            match unit_scale(&unit_name).ok_or_else(invalid)? {
                Unit::Months(scale) => {
                    let total = quantity * scale as f64;
                    let whole = total.trunc();
                    months += whole as i64;
                    let spill = (total - whole) * DAYS_PER_MONTH as f64;
                    days += spill.trunc() as i64;
                    micros += spill.fract() * MICROS_PER_DAY as f64;
                }
                Unit::Days(scale) => {
                    let total = quantity * scale as f64;
                    days += total.trunc() as i64;
                    micros += total.fract() * MICROS_PER_DAY as f64;
                }
                Unit::Micros(scale) => micros += quantity * scale as f64,
            }
            seen = true;
        }

        if !seen {
            return Err(invalid());
        }

        let sign = if negate { -1 } else { 1 };
        let out_of_range = || ValueError::OutOfRange("interval".to_string());
        Ok(Self {
            months: i32::try_from(months * sign).map_err(|_| out_of_range())?,
            days: i32::try_from(days * sign).map_err(|_| out_of_range())?,
            micros: (micros.round() as i64) * sign,
        })
    }

    /// Total span with months counted as 30 days, the ordering used by comparisons.
    pub fn span_micros(&self) -> i128 {
        (self.months as i128 * DAYS_PER_MONTH as i128 + self.days as i128) * MICROS_PER_DAY as i128
            + self.micros as i128
    }

    /// Orders two intervals by total span. `'1 month'` and `'30 days'` compare equal
    /// even though their fields differ.
    pub fn cmp_span(&self, other: &Self) -> Ordering {
        self.span_micros().cmp(&other.span_micros())
    }

    /// Adds the interval to a timestamp: months first (clamping to month end), then days, then time.
    pub fn add_to(&self, ts: NaiveDateTime) -> Option<NaiveDateTime> {
        let ts = match self.months.cmp(&0) {
            Ordering::Greater => ts.checked_add_months(Months::new(self.months as u32))?,
            Ordering::Less => ts.checked_sub_months(Months::new(self.months.unsigned_abs()))?,
            Ordering::Equal => ts,
        };
        let ts = ts.checked_add_signed(TimeDelta::try_days(self.days as i64)?)?;
        ts.checked_add_signed(TimeDelta::microseconds(self.micros))
    }
}

fn unit_scale(unit: &str) -> Option<Unit> {
    let unit = match unit {
        "millennium" | "millennia" | "millenniums" | "mil" | "mils" => Unit::Months(12_000),
        "century" | "centuries" | "c" | "cent" => Unit::Months(1_200),
        "decade" | "decades" | "dec" | "decs" => Unit::Months(120),
        "year" | "years" | "yr" | "yrs" | "y" => Unit::Months(12),
        "month" | "months" | "mon" | "mons" => Unit::Months(1),
        "week" | "weeks" | "w" => Unit::Days(7),
        "day" | "days" | "d" => Unit::Days(1),
        "hour" | "hours" | "hr" | "hrs" | "h" => Unit::Micros(MICROS_PER_HOUR),
        "minute" | "minutes" | "min" | "mins" | "m" => Unit::Micros(MICROS_PER_MINUTE),
        "second" | "seconds" | "sec" | "secs" | "s" => Unit::Micros(MICROS_PER_SECOND),
        "millisecond" | "milliseconds" | "ms" | "msec" | "msecs" => Unit::Micros(1_000),
        "microsecond" | "microseconds" | "us" | "usec" | "usecs" => Unit::Micros(1),
        _ => return None,
    };
    Some(unit)
}

fn parse_clock(token: &str) -> Option<f64> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }
    let hours: i64 = parts[0].parse().ok()?;
    let minutes: i64 = parts[1].parse().ok()?;
    let seconds: f64 = match parts.get(2) {
        Some(s) => s.parse().ok()?,
        None => 0.0,
    };
    let total = (hours * MICROS_PER_HOUR + minutes * MICROS_PER_MINUTE) as f64
        + seconds * MICROS_PER_SECOND as f64;
    Some(if negative { -total } else { total })
}

impl FromStr for Interval {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::parse(s)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        let years = self.months / 12;
        let mons = self.months % 12;
        if years != 0 {
            parts.push(format!("{years} year{}", if years.abs() == 1 { "" } else { "s" }));
        }
        if mons != 0 {
            parts.push(format!("{mons} mon{}", if mons.abs() == 1 { "" } else { "s" }));
        }
        if self.days != 0 {
            let days = self.days;
            parts.push(format!("{days} day{}", if days.abs() == 1 { "" } else { "s" }));
        }
        if self.micros != 0 || parts.is_empty() {
            let sign = if self.micros < 0 { "-" } else { "" };
            let abs = self.micros.unsigned_abs();
            let hours = abs / MICROS_PER_HOUR as u64;
            let minutes = (abs % MICROS_PER_HOUR as u64) / MICROS_PER_MINUTE as u64;
            let seconds = (abs % MICROS_PER_MINUTE as u64) / MICROS_PER_SECOND as u64;
            let fraction = abs % MICROS_PER_SECOND as u64;
            let clock = if fraction == 0 {
                format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
            } else {
                let digits = format!("{fraction:06}");
                format!(
                    "{sign}{hours:02}:{minutes:02}:{seconds:02}.{}",
                    digits.trim_end_matches('0')
                )
            };
            parts.push(clock);
        }
        write!(f, "{}", parts.join(" "))
    }
}
