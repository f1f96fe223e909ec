mod calc;
mod config;
mod consts;
pub mod forms;
mod messages;
mod prelude;
pub mod raster;
mod types;

pub use calc::{AgeBreakdown, CalcError, DateDiffBreakdown, age_on, date_difference};
pub use config::{A4Limits, PageBound, RasterConfig};
pub use consts::*;
pub use raster::{
    Dimensions, ExportedImage, ImageSource, PixelTarget, RasterError, ResizeRequest,
    ResizeSession, ResizeStage, ResizeTicket, Unit, fit_within,
};
pub use types::{Day, Month, Year};

use crate::prelude::*;
use chrono::{Datelike, Days, NaiveDate};
use std::str::FromStr;
use types::days_in_month;

/// A validated Gregorian calendar date.
///
/// Construction never normalizes: a day that does not exist in its month is
/// rejected rather than rolled into the next month. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{day}-{month}-{year}")]
pub struct CalendarDate {
    year: Year,
    month: Month,
    day: Day,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Invalid date format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Invalid year: {} (must be {}-{})", "_0", MIN_YEAR, MAX_YEAR)]
    InvalidYear(u16),
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MAX_MONTH)]
    InvalidMonth(u8),
    #[display(fmt = "Unknown month name: {_0}")]
    UnknownMonthName(String),
    #[display(fmt = "Invalid day {day} for month {year}-{month:02}")]
    InvalidDay { day: u8, month: u8, year: u16 },
    #[display(fmt = "Empty date string")]
    EmptyInput,
}

impl std::error::Error for ParseError {}

impl CalendarDate {
    /// Creates a date from already validated components.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidDay` if `day` is past the end of the month.
    pub fn new(year: Year, month: Month, day: u8) -> Result<Self, ParseError> {
        let day = Day::new(day, year, month)?;
        Ok(Self { year, month, day })
    }

    /// Creates a date from raw numbers, month 1-based.
    ///
    /// # Errors
    /// Returns the `ParseError` of the first component that is out of range.
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Result<Self, ParseError> {
        Self::new(Year::new(year)?, Month::new(month)?, day)
    }

    pub const fn year(&self) -> u16 {
        self.year.get()
    }

    /// 1-based month number
    pub const fn month(&self) -> u8 {
        self.month.get()
    }

    /// 0-based month index (January = 0)
    pub const fn month_index(&self) -> u8 {
        self.month.index()
    }

    pub const fn day(&self) -> u8 {
        self.day.get()
    }

    pub const fn year_typed(&self) -> Year {
        self.year
    }

    pub const fn month_typed(&self) -> Month {
        self.month
    }

    /// The same day as a `chrono` date.
    pub fn to_naive(&self) -> NaiveDate {
        // years 1-9999 are always inside chrono's range
        NaiveDate::from_ymd_opt(
            i32::from(self.year.get()),
            u32::from(self.month.get()),
            u32::from(self.day.get()),
        )
        .unwrap_or(NaiveDate::MIN)
    }

    /// Converts a `chrono` date, keeping the offending value in the error.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidYear` for year 0 or years past 9999, and
    /// `ParseError::InvalidFormat` with the whole date for negative years.
    pub fn from_naive(date: NaiveDate) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidFormat(date.to_string());
        let year = u16::try_from(date.year()).map_err(|_| invalid())?;
        let month = u8::try_from(date.month()).map_err(|_| invalid())?;
        let day = u8::try_from(date.day()).map_err(|_| invalid())?;
        Self::from_ymd(year, month, day)
    }

    /// Length in days of the month immediately before this date's month
    /// (December of the previous year for January dates).
    pub const fn days_in_previous_month(&self) -> u8 {
        let (year, month) = match self.month.get() {
            JANUARY => (self.year.get().saturating_sub(1), DECEMBER),
            m => (self.year.get(), m - 1),
        };
        days_in_month(year, month)
    }

    /// Shifts the date by `days`, rolling across month and year boundaries.
    ///
    /// # Errors
    /// Returns `CalcError::OutOfRange` when the result leaves years 1-9999.
    pub fn plus_days(&self, days: i64) -> Result<Self, CalcError> {
        let out_of_range = || CalcError::OutOfRange { start: *self, days };
        let step = Days::new(days.unsigned_abs());
        let shifted = if days < 0 {
            self.to_naive().checked_sub_days(step)
        } else {
            self.to_naive().checked_add_days(step)
        }
        .ok_or_else(out_of_range)?;
        Self::from_naive(shifted).map_err(|_| out_of_range())
    }
}

/// Parses `DD-MM-YYYY` or `DD-Mon-YYYY`, returning `None` for anything else.
///
/// `/` is accepted wherever `-` is. Rejections are logged at debug level.
pub fn parse_flexible_date(input: &str) -> Option<CalendarDate> {
    match input.parse::<CalendarDate>() {
        Ok(date) => Some(date),
        Err(err) => {
            log::debug!("rejected date input {input:?}: {err}");
            None
        }
    }
}

impl FromStr for CalendarDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(ALT_DATE_SEPARATOR, &DATE_SEPARATOR.to_string());
        if normalized.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let parts: Vec<&str> = normalized.split(DATE_SEPARATOR).map(str::trim).collect();
        let [day, month, year] = parts.as_slice() else {
            return Err(ParseError::InvalidFormat(format!(
                "expected day{DATE_SEPARATOR}month{DATE_SEPARATOR}year, found {} part(s) in {s:?}",
                parts.len()
            )));
        };

        let day_u8 = Self::parse_number::<u8>(day)?;
        let year = Year::new(Self::parse_number::<u16>(year)?)?;
        let month = Self::parse_month(month)?;

        Self::new(year, month, day_u8)
    }
}

impl CalendarDate {
    /// Helper to parse a plain base-10 component with better error messages
    fn parse_number<T: FromStr>(s: &str) -> Result<T, ParseError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidFormat(s.to_owned()));
        }
        s.parse::<T>()
            .map_err(|_| ParseError::InvalidFormat(s.to_owned()))
    }

    /// Numeric months are 1-based; anything else is looked up by name
    fn parse_month(s: &str) -> Result<Month, ParseError> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            Month::new(Self::parse_number::<u8>(s)?)
        } else {
            Month::from_name(s)
        }
    }
}

impl serde::Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
