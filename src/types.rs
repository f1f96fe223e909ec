use crate::ParseError;
use crate::consts::{
    CENTURY_CYCLE, DAYS_IN_MONTH, FEBRUARY, FEBRUARY_DAYS_LEAP, GREGORIAN_CYCLE, LEAP_YEAR_CYCLE,
    MAX_MONTH, MAX_YEAR, MIN_YEAR, MONTH_ABBREVIATION_LEN, MONTH_ABBREVIATIONS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU16;
use std::num::NonZeroU8;

/// A year value guaranteed to be in the range `MIN_YEAR..=MAX_YEAR` (1..=9999)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Year(NonZeroU16);

impl Year {
    /// Creates a new Year, validating the four-digit range
    ///
    /// # Errors
    /// Returns `ParseError::InvalidYear` if the value is 0 or > `MAX_YEAR`.
    pub fn new(value: u16) -> Result<Self, ParseError> {
        let non_zero = NonZeroU16::new(value).ok_or(ParseError::InvalidYear(value))?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&value) {
            return Err(ParseError::InvalidYear(value));
        }
        Ok(Self(non_zero))
    }

    #[inline]
    pub const fn get(self) -> u16 {
        self.0.get()
    }

    pub const fn is_leap(self) -> bool {
        is_leap_year(self.0.get())
    }
}

impl TryFrom<u16> for Year {
    type Error = ParseError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Year> for u16 {
    fn from(year: Year) -> Self {
        year.0.get()
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0.get())
    }
}

/// A calendar month, stored 1-based (January = 1).
///
/// [`Month::index`] gives the 0-based position used by the month table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(NonZeroU8);

impl Month {
    /// Creates a new Month from its 1-based number
    ///
    /// # Errors
    /// Returns `ParseError::InvalidMonth` if the value is 0 or > `MAX_MONTH`.
    pub fn new(value: u8) -> Result<Self, ParseError> {
        let non_zero = NonZeroU8::new(value).ok_or(ParseError::InvalidMonth(value))?;
        if value > MAX_MONTH {
            return Err(ParseError::InvalidMonth(value));
        }
        Ok(Self(non_zero))
    }

    /// Looks a month up by name. Only the first three characters are
    /// significant and case is ignored, so `"Aug"`, `"AUGUST"` and `"aug"`
    /// all resolve to August.
    ///
    /// # Errors
    /// Returns `ParseError::UnknownMonthName` when no abbreviation matches.
    pub fn from_name(name: &str) -> Result<Self, ParseError> {
        let prefix: String = name
            .to_lowercase()
            .chars()
            .take(MONTH_ABBREVIATION_LEN)
            .collect();

        MONTH_ABBREVIATIONS
            .iter()
            .position(|abbr| *abbr == prefix)
            .and_then(|idx| u8::try_from(idx + 1).ok())
            .map_or_else(
                || Err(ParseError::UnknownMonthName(name.to_owned())),
                Self::new,
            )
    }

    /// 1-based month number
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }

    /// 0-based month index (January = 0)
    #[inline]
    pub const fn index(self) -> u8 {
        self.0.get() - 1
    }

    /// Lowercase three-letter abbreviation
    pub const fn abbreviation(self) -> &'static str {
        MONTH_ABBREVIATIONS[self.index() as usize]
    }
}

impl TryFrom<u8> for Month {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> Self {
        month.0.get()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0.get())
    }
}

/// A day-of-month value guaranteed to be valid for a given year and month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub struct Day(NonZeroU8);

impl Day {
    /// Creates a new Day, validating it against the length of the given month
    ///
    /// # Errors
    /// Returns `ParseError::InvalidDay` if the value is 0 or past the end of the month.
    pub fn new(value: u8, year: Year, month: Month) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidDay {
            day: value,
            month: month.get(),
            year: year.get(),
        };

        let non_zero = NonZeroU8::new(value).ok_or_else(invalid)?;
        if value > days_in_month(year.get(), month.get()) {
            return Err(invalid());
        }

        Ok(Self(non_zero))
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }
}

impl From<Day> for u8 {
    fn from(day: Day) -> Self {
        day.0.get()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0.get())
    }
}

// Helper functions

pub const fn is_leap_year(year: u16) -> bool {
    (year % LEAP_YEAR_CYCLE == 0 && year % CENTURY_CYCLE != 0) || (year % GREGORIAN_CYCLE == 0)
}

pub const fn days_in_month(year: u16, month: u8) -> u8 {
    debug_assert!(month != 0 && month <= MAX_MONTH);

    if month == FEBRUARY && is_leap_year(year) {
        FEBRUARY_DAYS_LEAP
    } else {
        DAYS_IN_MONTH[month as usize]
    }
}
