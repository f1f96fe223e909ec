/// Minimum valid year (inclusive)
pub const MIN_YEAR: u16 = 1;
/// Maximum valid year (inclusive)
pub const MAX_YEAR: u16 = 9999;

/// Maximum valid month (December)
pub const MAX_MONTH: u8 = 12;

/// First day of month, used for lower bounds
pub const MIN_DAY: u8 = 1;

/// Month number for January
pub const JANUARY: u8 = 1;
/// Month number for February
pub const FEBRUARY: u8 = 2;
/// Month number for December
pub const DECEMBER: u8 = 12;

/// Months per year, used by borrow arithmetic and month totals
pub const MONTHS_PER_YEAR: i32 = 12;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u8 = 29;

/// Maximum days in each month (index 0 is unused, months are 1-indexed)
/// February shows 28 days (non-leap year default)
pub const DAYS_IN_MONTH: [u8; 13] = [
    0,  // index 0 unused (months are 1-indexed)
    31, // January
    28, // February (non-leap, adjusted by is_leap_year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Lowercase three-letter month abbreviations, January first.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Number of leading characters of a month name used for lookup
pub const MONTH_ABBREVIATION_LEN: usize = 3;

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: u16 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: u16 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: u16 = 400;

/// Date component separator
pub const DATE_SEPARATOR: char = '-';
/// Accepted alias for `DATE_SEPARATOR` on input
pub const ALT_DATE_SEPARATOR: char = '/';

/// Centimetres per inch
pub const CM_PER_INCH: f64 = 2.54;
/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Lowest accepted print resolution
pub const MIN_DPI: u32 = 72;
/// Highest accepted print resolution
pub const MAX_DPI: u32 = 600;

/// Pixel ceiling: A4 at 600 DPI
pub const MAX_PIXEL_WIDTH: u32 = 4960;
/// Pixel ceiling: A4 at 600 DPI
pub const MAX_PIXEL_HEIGHT: u32 = 7016;

/// JPEG export quality (0.92 on a 0-1 scale)
pub const JPEG_QUALITY: u8 = 92;

/// MIME type of exported images
pub const EXPORT_MIME: &str = "image/jpeg";
