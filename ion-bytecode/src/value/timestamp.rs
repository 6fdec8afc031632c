use std::fmt;

use thiserror::Error;

use super::Decimal;

/// How many calendar fields a timestamp actually declares. A year-only
/// timestamp is not the same value as midnight on January 1st of that year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    Year,
    Month,
    Day,
    Minute,
    Second,
}

/// Raised by timestamp constructors when a field is outside its calendar
/// range; decoders re-wrap this with the offending input position.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct InvalidTimestamp(String);

/// A point (or whole period) on the calendar with a declared precision and
/// an offset that is UTC (`Some(0)` via the UTC flag), explicitly known, or
/// unknown (`None`).
///
/// Fields always hold *local* time; the offset records how that local time
/// relates to UTC. Equality compares precision, every declared field, the
/// fractional second at its declared digit count, and the offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    precision: Precision,
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    fraction: Option<Decimal>,
    offset_minutes: Option<i32>,
}

/// Calendar year bias used by the short binary encoding.
pub const EPOCH_YEAR: i32 = 1970;

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn check(condition: bool, message: impl FnOnce() -> String) -> Result<(), InvalidTimestamp> {
    if condition {
        Ok(())
    } else {
        Err(InvalidTimestamp(message()))
    }
}

impl Timestamp {
    #[allow(clippy::too_many_arguments)]
    fn build(
        precision: Precision,
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        fraction: Option<Decimal>,
        offset_minutes: Option<i32>,
    ) -> Result<Self, InvalidTimestamp> {
        check((1..=9999).contains(&year), || format!("year {year} is out of range"))?;
        if precision >= Precision::Month {
            check((1..=12).contains(&month), || format!("month {month} is out of range"))?;
        }
        if precision >= Precision::Day {
            check((1..=days_in_month(year, month)).contains(&day), || {
                format!("day {day} is out of range for {year}-{month:02}")
            })?;
        }
        if precision >= Precision::Minute {
            check(hour <= 23, || format!("hour {hour} is out of range"))?;
            check(minute <= 59, || format!("minute {minute} is out of range"))?;
            check(
                offset_minutes.map_or(true, |m| (-1440..=1440).contains(&m)),
                || "offset exceeds one day".to_string(),
            )?;
        }
        if precision >= Precision::Second {
            check(second <= 59, || format!("second {second} is out of range"))?;
        }
        if let Some(fraction) = &fraction {
            check(!fraction.is_negative(), || "fractional seconds must not be negative".to_string())?;
            check(fraction.scale() >= 0, || "fractional seconds must have scale >= 0".to_string())?;
            // coefficient < 10^scale keeps the fraction below one second
            let bound = num_bigint::BigInt::from(10u32).pow(fraction.scale() as u32);
            check(fraction.coefficient() < &bound, || {
                format!("fractional seconds {fraction} must be less than one")
            })?;
        }
        Ok(Self {
            precision,
            year,
            month,
            day,
            hour,
            minute,
            second,
            fraction,
            offset_minutes,
        })
    }

    pub fn for_year(year: i32) -> Result<Self, InvalidTimestamp> {
        Self::build(Precision::Year, year, 1, 1, 0, 0, 0, None, None)
    }

    pub fn for_month(year: i32, month: u8) -> Result<Self, InvalidTimestamp> {
        Self::build(Precision::Month, year, month, 1, 0, 0, 0, None, None)
    }

    pub fn for_day(year: i32, month: u8, day: u8) -> Result<Self, InvalidTimestamp> {
        Self::build(Precision::Day, year, month, day, 0, 0, 0, None, None)
    }

    pub fn for_minute(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        offset_minutes: Option<i32>,
    ) -> Result<Self, InvalidTimestamp> {
        Self::build(Precision::Minute, year, month, day, hour, minute, 0, None, offset_minutes)
    }

    pub fn for_second(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        offset_minutes: Option<i32>,
    ) -> Result<Self, InvalidTimestamp> {
        Self::build(
            Precision::Second,
            year,
            month,
            day,
            hour,
            minute,
            second,
            None,
            offset_minutes,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn for_fractional_second(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        fraction: Decimal,
        offset_minutes: Option<i32>,
    ) -> Result<Self, InvalidTimestamp> {
        Self::build(
            Precision::Second,
            year,
            month,
            day,
            hour,
            minute,
            second,
            Some(fraction.with_scale_at_least_zero()),
            offset_minutes,
        )
    }

    /// Builds a timestamp from fields expressed in UTC plus a known offset,
    /// re-expressing the fields in the local time of that offset. This is
    /// how the legacy binary encoding stores instants; the short binary
    /// encoding already stores local fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_utc_fields(
        precision: Precision,
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        fraction: Option<Decimal>,
        offset_minutes: Option<i32>,
    ) -> Result<Self, InvalidTimestamp> {
        let fraction = fraction.map(Decimal::with_scale_at_least_zero);
        let mut value = Self::build(
            precision, year, month, day, hour, minute, second, fraction, offset_minutes,
        )?;
        if precision >= Precision::Minute {
            if let Some(offset) = offset_minutes {
                if offset != 0 {
                    value.shift_minutes(offset)?;
                }
            }
        }
        Ok(value)
    }

    /// Moves the calendar fields by a number of minutes, carrying across
    /// day, month, and year boundaries. The offset field is untouched.
    fn shift_minutes(&mut self, minutes: i32) -> Result<(), InvalidTimestamp> {
        let total = self.hour as i32 * 60 + self.minute as i32 + minutes;
        let mut day_delta = total.div_euclid(1440);
        let remainder = total.rem_euclid(1440);
        self.hour = (remainder / 60) as u8;
        self.minute = (remainder % 60) as u8;

        while day_delta != 0 {
            if day_delta > 0 {
                if self.day < days_in_month(self.year, self.month) {
                    self.day += 1;
                } else {
                    self.day = 1;
                    if self.month == 12 {
                        self.month = 1;
                        self.year += 1;
                    } else {
                        self.month += 1;
                    }
                }
                day_delta -= 1;
            } else {
                if self.day > 1 {
                    self.day -= 1;
                } else {
                    if self.month == 1 {
                        self.month = 12;
                        self.year -= 1;
                    } else {
                        self.month -= 1;
                    }
                    self.day = days_in_month(self.year, self.month);
                }
                day_delta += 1;
            }
        }
        check((1..=9999).contains(&self.year), || {
            format!("year {} is out of range after applying offset", self.year)
        })
    }

    #[inline]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    #[inline]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[inline]
    pub fn month(&self) -> u8 {
        self.month
    }

    #[inline]
    pub fn day(&self) -> u8 {
        self.day
    }

    #[inline]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    #[inline]
    pub fn minute(&self) -> u8 {
        self.minute
    }

    #[inline]
    pub fn second(&self) -> u8 {
        self.second
    }

    #[inline]
    pub fn fraction(&self) -> Option<&Decimal> {
        self.fraction.as_ref()
    }

    /// `Some(0)` means UTC; `None` means the offset is unknown.
    #[inline]
    pub fn offset_minutes(&self) -> Option<i32> {
        self.offset_minutes
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            Precision::Year => return write!(f, "{:04}T", self.year),
            Precision::Month => return write!(f, "{:04}-{:02}T", self.year, self.month),
            Precision::Day => {
                return write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
            }
            _ => {}
        }
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )?;
        if self.precision >= Precision::Second {
            write!(f, ":{:02}", self.second)?;
            if let Some(fraction) = &self.fraction {
                if fraction.scale() > 0 {
                    let digits = fraction.coefficient_u64().unwrap_or(0);
                    let width = fraction.scale() as usize;
                    write!(f, ".{digits:0>width$}")?;
                }
            }
        }
        match self.offset_minutes {
            None => write!(f, "-00:00"),
            Some(0) => write!(f, "Z"),
            Some(offset) => {
                let sign = if offset < 0 { '-' } else { '+' };
                let magnitude = offset.abs();
                write!(f, "{}{:02}:{:02}", sign, magnitude / 60, magnitude % 60)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn precision_changes_identity() {
        let year = Timestamp::for_year(2023).unwrap();
        let month = Timestamp::for_month(2023, 1).unwrap();
        assert_ne!(year, month);
        assert_eq!(year.precision(), Precision::Year);
    }

    #[test]
    fn utc_unknown_and_explicit_offsets_are_distinct() {
        let utc = Timestamp::for_minute(2023, 10, 15, 11, 22, Some(0)).unwrap();
        let unknown = Timestamp::for_minute(2023, 10, 15, 11, 22, None).unwrap();
        let plus = Timestamp::for_minute(2023, 10, 15, 11, 22, Some(75)).unwrap();
        assert_ne!(utc, unknown);
        assert_ne!(utc, plus);
        assert_eq!(utc.to_string(), "2023-10-15T11:22Z");
        assert_eq!(unknown.to_string(), "2023-10-15T11:22-00:00");
        assert_eq!(plus.to_string(), "2023-10-15T11:22+01:15");
    }

    #[test]
    fn calendar_validation_rejects_bad_fields() {
        assert!(Timestamp::for_month(2023, 13).is_err());
        assert!(Timestamp::for_day(2023, 2, 29).is_err());
        assert!(Timestamp::for_day(2024, 2, 29).is_ok()); // leap year
        assert!(Timestamp::for_minute(2023, 1, 1, 24, 0, None).is_err());
        assert!(Timestamp::for_second(2023, 1, 1, 0, 0, 60, None).is_err());
    }

    #[test]
    fn fraction_must_stay_below_one_second() {
        let fraction = Decimal::from_i64(444, 3);
        let value =
            Timestamp::for_fractional_second(2023, 10, 15, 11, 22, 33, fraction, Some(0)).unwrap();
        assert_eq!(value.to_string(), "2023-10-15T11:22:33.444Z");

        let too_big = Decimal::from_i64(1000, 3);
        assert!(
            Timestamp::for_fractional_second(2023, 10, 15, 11, 22, 33, too_big, Some(0)).is_err()
        );
    }

    #[test]
    fn fraction_digit_count_is_significant() {
        let millis = Timestamp::for_fractional_second(
            2023, 1, 1, 0, 0, 0, Decimal::from_i64(444, 3), Some(0),
        )
        .unwrap();
        let micros = Timestamp::for_fractional_second(
            2023, 1, 1, 0, 0, 0, Decimal::from_i64(444000, 6), Some(0),
        )
        .unwrap();
        assert_ne!(millis, micros);
    }

    #[test]
    fn utc_fields_are_reexpressed_in_local_time() {
        // 10:07 UTC at +01:15 is 11:22 local
        let value = Timestamp::from_utc_fields(
            Precision::Minute, 2023, 10, 15, 10, 7, 0, None, Some(75),
        )
        .unwrap();
        assert_eq!((value.hour(), value.minute()), (11, 22));
        assert_eq!(value.offset_minutes(), Some(75));
    }

    #[test]
    fn offset_application_carries_across_boundaries() {
        // 23:50 UTC on Dec 31 at +00:30 lands on Jan 1 of the next year
        let forward = Timestamp::from_utc_fields(
            Precision::Minute, 2023, 12, 31, 23, 50, 0, None, Some(30),
        )
        .unwrap();
        assert_eq!(
            (forward.year(), forward.month(), forward.day(), forward.hour(), forward.minute()),
            (2024, 1, 1, 0, 20)
        );

        // 00:10 UTC on Mar 1 at -00:30 lands on Feb 29 in a leap year
        let backward = Timestamp::from_utc_fields(
            Precision::Minute, 2024, 3, 1, 0, 10, 0, None, Some(-30),
        )
        .unwrap();
        assert_eq!(
            (backward.month(), backward.day(), backward.hour(), backward.minute()),
            (2, 29, 23, 40)
        );
    }

    #[test]
    fn negative_scale_fraction_is_normalized() {
        let value = Timestamp::from_utc_fields(
            Precision::Second, 2023, 1, 1, 0, 0, 7, Some(Decimal::from_i64(0, -2)), Some(0),
        )
        .unwrap();
        assert_eq!(value.fraction().unwrap().scale(), 0);
    }
}
