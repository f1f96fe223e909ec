use serde::{Deserialize, Serialize};

use crate::{CalendarDate, MONTHS_PER_YEAR, prelude::*};

/// Elapsed time from a date of birth to today, exact to the calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[display(fmt = "{years}y {months}m {days}d")]
pub struct AgeBreakdown {
    pub years:  i32,
    pub months: i32,
    pub days:   i32,
}

/// Non-negative distance between two dates.
///
/// `years`/`months`/`days` are the calendar borrow breakdown; `total_months`
/// is derived from it, while `total_days` counts elapsed days independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DateDiffBreakdown {
    pub years:        i32,
    pub months:       i32,
    pub days:         i32,
    pub total_months: i32,
    pub total_days:   i64,
}

/// Error type for calendar arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalcError {
    /// A date of birth later than the reference date.
    #[error("Date of birth {dob} is after {today}")]
    FutureDate { dob: CalendarDate, today: CalendarDate },

    /// Arithmetic left the supported year range.
    #[error("{days} days from {start} is outside years 1-9999")]
    OutOfRange { start: CalendarDate, days: i64 },
}

/// Borrow subtraction of `earlier` from `later`.
///
/// A negative day remainder borrows the length of the month before `later`'s
/// month; a negative month remainder borrows a year.
fn borrow_breakdown(earlier: CalendarDate, later: CalendarDate) -> (i32, i32, i32) {
    let mut years = i32::from(later.year()) - i32::from(earlier.year());
    let mut months = i32::from(later.month()) - i32::from(earlier.month());
    let mut days = i32::from(later.day()) - i32::from(earlier.day());

    if days < 0 {
        days += i32::from(later.days_in_previous_month());
        months -= 1;
    }
    if months < 0 {
        months += MONTHS_PER_YEAR;
        years -= 1;
    }

    (years, months, days)
}

/// Age on `today` of someone born on `dob`.
///
/// # Errors
/// Returns `CalcError::FutureDate` if `dob` is strictly after `today`.
pub fn age_on(dob: CalendarDate, today: CalendarDate) -> Result<AgeBreakdown, CalcError> {
    if dob > today {
        return Err(CalcError::FutureDate { dob, today });
    }

    let (years, months, days) = borrow_breakdown(dob, today);
    Ok(AgeBreakdown {
        years,
        months,
        days,
    })
}

/// Difference between two dates in either order.
///
/// Days are whole civil days (UTC midnight to UTC midnight), so `total_days`
/// is exact and never affected by local clock shifts.
pub fn date_difference(a: CalendarDate, b: CalendarDate) -> DateDiffBreakdown {
    let (start, end) = if a > b { (b, a) } else { (a, b) };

    let (years, months, days) = borrow_breakdown(start, end);
    DateDiffBreakdown {
        years,
        months,
        days,
        total_months: years * MONTHS_PER_YEAR + months,
        total_days: end
            .to_naive()
            .signed_duration_since(start.to_naive())
            .num_days(),
    }
}
