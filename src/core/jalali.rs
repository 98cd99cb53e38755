use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// First supported Jalali year (0979-01-01 falls on 1600-03-20 Gregorian)
pub const MIN_YEAR: i32 = 979;
/// Last supported Jalali year
pub const MAX_YEAR: i32 = 2500;

/// Days per 33-year leap cycle (33 * 365 + 8 leap days)
const DAYS_PER_CYCLE: i64 = 12053;
/// Days per 4-year sub-cycle whose first year is leap
const DAYS_PER_SUB_CYCLE: i64 = 1461;

/// Errors raised by Jalali date construction and conversion.
///
/// Day-out-of-range is a distinct variant from month/year range errors:
/// month arithmetic absorbs it internally (day clamping) while the others
/// always indicate bad caller input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("day {day} is out of range for {year:04}-{month:02}")]
    DayOutOfRange { year: i32, month: u32, day: u32 },

    #[error("month {0} is out of range (expected 1-12)")]
    MonthOutOfRange(u32),

    #[error("year {0} is outside the supported range {MIN_YEAR}-{MAX_YEAR}")]
    YearOutOfRange(i32),

    #[error("gregorian date {0} precedes the Jalali epoch (1600-03-20)")]
    BeforeEpoch(NaiveDate),

    #[error("invalid Jalali date literal: {0:?} (expected YYYY-MM-DD)")]
    InvalidLiteral(String),
}

/// A date in the Jalali (solar Hijri) calendar.
///
/// Immutable value type. Construction is validated, so every held value is a
/// real calendar date; the Gregorian `chrono::NaiveDate` form remains the
/// only representation that is ever persisted or compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JalaliDate {
    year: i32,
    month: u32,
    day: u32,
}

/// Returns true when `year` is a Jalali leap year (month 12 has 30 days).
///
/// Uses the 33-year cycle of the conversion arithmetic: relative years
/// 0, 4, 8, ..., 28 within each cycle are leap (remainder 32 is not).
pub fn is_leap_year(year: i32) -> bool {
    let r = (year - MIN_YEAR).rem_euclid(33);
    r % 4 == 0 && r != 32
}

/// Number of days in a Jalali month: 31 for months 1-6, 30 for 7-11,
/// 29 or 30 for month 12 depending on leap-ness.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1..=6 => 31,
        7..=11 => 30,
        12 => {
            if is_leap_year(year) {
                30
            } else {
                29
            }
        }
        _ => 0,
    }
}

/// Returns true when (year, month, day) names an existing Jalali day
pub fn is_valid_day(year: i32, month: u32, day: u32) -> bool {
    day >= 1 && day <= days_in_month(year, month)
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1600, 3, 20).expect("valid epoch date")
}

impl JalaliDate {
    /// Create a validated Jalali date
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(DateError::YearOutOfRange(year));
        }

        if !(1..=12).contains(&month) {
            return Err(DateError::MonthOutOfRange(month));
        }

        if !is_valid_day(year, month, day) {
            return Err(DateError::DayOutOfRange { year, month, day });
        }

        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Convert a Gregorian date into its Jalali equivalent.
    ///
    /// Total for every Gregorian date on or after the Jalali epoch
    /// (1600-03-20); earlier dates are the only error case.
    pub fn from_gregorian(date: NaiveDate) -> Result<Self, DateError> {
        let day_number = (date - epoch()).num_days();
        if day_number < 0 {
            return Err(DateError::BeforeEpoch(date));
        }

        let cycles = day_number / DAYS_PER_CYCLE;
        let mut rem = day_number % DAYS_PER_CYCLE;

        let mut year = MIN_YEAR + (33 * cycles) as i32 + (4 * (rem / DAYS_PER_SUB_CYCLE)) as i32;
        rem %= DAYS_PER_SUB_CYCLE;

        // First year of each 4-year sub-cycle is the 366-day one
        if rem >= 366 {
            year += ((rem - 1) / 365) as i32;
            rem = (rem - 1) % 365;
        }

        if year > MAX_YEAR {
            return Err(DateError::YearOutOfRange(year));
        }

        let mut month = 12;
        for m in 1..=12 {
            let len = days_in_month(year, m) as i64;
            if rem < len {
                month = m;
                break;
            }
            rem -= len;
        }

        Ok(Self {
            year,
            month,
            day: rem as u32 + 1,
        })
    }

    /// Convert back to the Gregorian calendar (exact inverse of
    /// [`JalaliDate::from_gregorian`])
    pub fn to_gregorian(&self) -> NaiveDate {
        let n = (self.year - MIN_YEAR) as i64;
        let mut day_number = 365 * n + (n / 33) * 8 + (n % 33 + 3) / 4;

        for m in 1..self.month {
            day_number += days_in_month(self.year, m) as i64;
        }
        day_number += self.day as i64 - 1;

        epoch()
            .checked_add_days(chrono::Days::new(day_number as u64))
            .expect("date within chrono range")
    }

    /// Add `n` calendar months (may be negative), keeping the day of month
    /// where possible.
    ///
    /// When the original day does not exist in the target month (e.g. day 31
    /// landing in a 30-day month) the day is clamped downward to the last
    /// valid day. It never rolls over into the following month, and since
    /// day 1 exists in every month the search always terminates.
    ///
    /// The target month saturates at the supported year range, so stepping
    /// backward past `MIN_YEAR`-01 (or forward past `MAX_YEAR`-12) stops
    /// there instead of producing an unconvertible date.
    pub fn add_months(&self, n: i32) -> Self {
        let total = (self.year as i64 * 12 + self.month as i64 - 1 + n as i64)
            .clamp(MIN_YEAR as i64 * 12, MAX_YEAR as i64 * 12 + 11);
        let year = total.div_euclid(12) as i32;
        let month = total.rem_euclid(12) as u32 + 1;

        let mut day = self.day;
        while day > 1 && !is_valid_day(year, month, day) {
            day -= 1;
        }

        Self { year, month, day }
    }

    /// Day of week with Saturday as 0, the first day of the Jalali week
    pub fn weekday_from_saturday(&self) -> u32 {
        (self.to_gregorian().weekday().num_days_from_monday() + 2) % 7
    }
}

/// Add `n` Jalali months to a Gregorian date, returning a Gregorian date.
///
/// This is the operation the amortization scheduler uses: "one month later"
/// means one Jalali calendar month, not 30 days and not a Gregorian month,
/// so every due date lands on the same Jalali day of month as the first
/// payment, subject to day clamping.
pub fn add_months_gregorian(date: NaiveDate, n: i32) -> Result<NaiveDate, DateError> {
    Ok(JalaliDate::from_gregorian(date)?.add_months(n).to_gregorian())
}

/// Week rows (Saturday first) for one Jalali month, for calendar-picker
/// rendering. `None` cells pad the leading and trailing partial weeks.
pub fn month_grid(year: i32, month: u32) -> Result<Vec<[Option<u32>; 7]>, DateError> {
    let first = JalaliDate::new(year, month, 1)?;
    let offset = first.weekday_from_saturday() as usize;
    let days = days_in_month(year, month);

    let mut rows = Vec::with_capacity(6);
    let mut week = [None; 7];
    let mut slot = offset;

    for day in 1..=days {
        week[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            rows.push(week);
            week = [None; 7];
            slot = 0;
        }
    }

    if week.iter().any(Option::is_some) {
        rows.push(week);
    }

    Ok(rows)
}

impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for JalaliDate {
    type Err = DateError;

    /// Parses the `YYYY-MM-DD` literal the calendar picker emits
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        let (y, m, d) = match (parts.next(), parts.next(), parts.next()) {
            (Some(y), Some(m), Some(d)) => (y, m, d),
            _ => return Err(DateError::InvalidLiteral(s.to_string())),
        };

        let year: i32 = y
            .parse()
            .map_err(|_| DateError::InvalidLiteral(s.to_string()))?;
        let month: u32 = m
            .parse()
            .map_err(|_| DateError::InvalidLiteral(s.to_string()))?;
        let day: u32 = d
            .parse()
            .map_err(|_| DateError::InvalidLiteral(s.to_string()))?;

        Self::new(year, month, day)
    }
}
