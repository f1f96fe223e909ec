//! User-facing text. Hindi with English field names, as shown on the page.

use crate::{AgeBreakdown, CalcError, CalendarDate, DateDiffBreakdown, RasterError};

pub const INVALID_DOB: &str = "कृपया सही Date Of Birth (जन्म तिथि) भरें (DD-MM-YYYY)।";
pub const FUTURE_DOB: &str = "Date Of Birth (जन्म तिथि) भविष्य की नहीं हो सकती।";
pub const INVALID_DATES: &str = "कृपया सही तिथियाँ भरें।";
pub const INVALID_DATE_AND_DAYS: &str = "कृपया सही तिथि और दिन भरें।";

pub const RASTER_MISSING_FIELDS: &str = "सभी fields सही भरें।";
pub const RASTER_DPI_RANGE: &str = "DPI 72 से 600 के बीच होना चाहिए।";
pub const RASTER_EXCEEDS_A4: &str = "A4 size से बड़ा allowed नहीं है।";
pub const RASTER_EXCEEDS_PIXELS: &str = "px size A4 @600DPI से बड़ा हो रहा है।";
pub const RASTER_LOAD_FAILED: &str = "Image load नहीं हो सकी, कृपया दूसरी file चुनें।";
pub const RASTER_ENCODE_FAILED: &str = "Image export नहीं हो सकी।";
pub const RASTER_READY: &str = "Image ready है।";

pub fn age(age: &AgeBreakdown) -> String {
    format!(
        "आपकी आयु है: {} वर्ष {} महीने {} दिन",
        age.years, age.months, age.days
    )
}

pub fn difference(diff: &DateDiffBreakdown) -> String {
    format!("अंतर: {} वर्ष {} महीने {} दिन", diff.years, diff.months, diff.days)
}

pub fn total_months(diff: &DateDiffBreakdown) -> String {
    format!("कुल महीने: {}", diff.total_months)
}

pub fn total_days(diff: &DateDiffBreakdown) -> String {
    format!("कुल दिन: {}", diff.total_days)
}

pub fn new_date(date: &CalendarDate) -> String {
    format!("New Date (तिथि) : {date}")
}

pub const fn calc_error(err: &CalcError) -> &'static str {
    match err {
        CalcError::FutureDate { .. } => FUTURE_DOB,
        CalcError::OutOfRange { .. } => INVALID_DATE_AND_DAYS,
    }
}

/// Message for a raster failure; `None` for a cancelled run, which shows nothing.
pub const fn raster_error(err: &RasterError) -> Option<&'static str> {
    match err {
        RasterError::MissingFields | RasterError::UnknownUnit(_) => Some(RASTER_MISSING_FIELDS),
        RasterError::DpiOutOfRange { .. } => Some(RASTER_DPI_RANGE),
        RasterError::ExceedsA4 { .. } => Some(RASTER_EXCEEDS_A4),
        RasterError::ExceedsPixelCeiling { .. } => Some(RASTER_EXCEEDS_PIXELS),
        RasterError::Read(_) | RasterError::Decode(_) | RasterError::EmptyImage => {
            Some(RASTER_LOAD_FAILED)
        }
        RasterError::Encode(_) => Some(RASTER_ENCODE_FAILED),
        RasterError::Cancelled => None,
    }
}
