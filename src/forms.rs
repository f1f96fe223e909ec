//! Page adapter: raw form strings in, display text out.
//!
//! Each function mirrors one form on the page. Inputs are the field values
//! exactly as typed; outputs are the strings for the result regions. Core
//! errors never leak their English diagnostics here, only localized text.

use crate::raster::{ExportedImage, ImageSource, RasterError, ResizeRequest, ResizeSession, Unit};
use crate::{CalendarDate, ParseError, age_on, date_difference, messages, parse_flexible_date};

/// Today's date on the local clock.
///
/// # Errors
/// Returns a `ParseError` carrying the clock's date if its year is outside
/// 1-9999.
pub fn today() -> Result<CalendarDate, ParseError> {
    CalendarDate::from_naive(chrono::Local::now().date_naive())
}

/// Age form: date of birth against `today`.
pub fn calculate_age(dob: &str, today: CalendarDate) -> String {
    let Some(dob) = parse_flexible_date(dob) else {
        return messages::INVALID_DOB.to_owned();
    };

    match age_on(dob, today) {
        Ok(age) => messages::age(&age),
        Err(err) => messages::calc_error(&err).to_owned(),
    }
}

/// The three result regions of the difference form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DifferenceOutput {
    pub breakdown:    String,
    pub total_months: String,
    pub total_days:   String,
}

/// Difference form. On bad input only `breakdown` carries text and the
/// other two regions are cleared.
pub fn calculate_date_difference(from: &str, to: &str) -> DifferenceOutput {
    let (Some(a), Some(b)) = (parse_flexible_date(from), parse_flexible_date(to)) else {
        return DifferenceOutput {
            breakdown: messages::INVALID_DATES.to_owned(),
            ..DifferenceOutput::default()
        };
    };

    let diff = date_difference(a, b);
    DifferenceOutput {
        breakdown:    messages::difference(&diff),
        total_months: messages::total_months(&diff),
        total_days:   messages::total_days(&diff),
    }
}

/// Date-plus-days form. `days` must be a whole number, optionally signed.
pub fn calculate_date_plus_days(date: &str, days: &str) -> String {
    let start = parse_flexible_date(date);
    let offset = days.trim().parse::<i64>().ok();

    let (Some(start), Some(offset)) = (start, offset) else {
        return messages::INVALID_DATE_AND_DAYS.to_owned();
    };

    match start.plus_days(offset) {
        Ok(result) => messages::new_date(&result),
        Err(err) => {
            log::debug!("date plus days failed: {err}");
            messages::calc_error(&err).to_owned()
        }
    }
}

/// Raw values of the resize form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeForm<'a> {
    pub width:  &'a str,
    pub height: &'a str,
    pub unit:   &'a str,
    pub dpi:    &'a str,
}

impl ResizeForm<'_> {
    /// Builds a request. Unparseable sizes become NaN and a missing dpi
    /// becomes 0, so validation reports them as missing fields.
    ///
    /// # Errors
    /// Returns `RasterError::UnknownUnit` for a unit outside cm/mm/inch/px.
    pub fn to_request(&self) -> Result<ResizeRequest, RasterError> {
        let number = |s: &str| s.trim().parse::<f64>().unwrap_or(f64::NAN);
        let dpi = match self.dpi.trim().parse::<i64>() {
            Ok(dpi) => u32::try_from(dpi).unwrap_or(u32::MAX),
            Err(_) => 0,
        };

        Ok(ResizeRequest {
            width: number(self.width),
            height: number(self.height),
            unit: self.unit.parse::<Unit>()?,
            dpi,
        })
    }
}

/// Status text plus the download, present only on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeOutput {
    pub message:  String,
    pub download: Option<ExportedImage>,
}

/// Resize form. Returns `None` when a newer submission superseded this one,
/// in which case nothing should be displayed.
///
/// Every submission supersedes the runs before it, including one whose unit
/// cannot be parsed.
pub async fn resize_image<S: ImageSource + ?Sized>(
    session: &ResizeSession,
    form: &ResizeForm<'_>,
    file: Option<&S>,
) -> Option<ResizeOutput> {
    let result = match form.to_request() {
        Ok(request) => session.run(&request, file).await,
        Err(err) => Err(session.reject(err)),
    };

    match result {
        Ok(image) => Some(ResizeOutput {
            message:  messages::RASTER_READY.to_owned(),
            download: Some(image),
        }),
        Err(err) => messages::raster_error(&err).map(|message| ResizeOutput {
            message:  message.to_owned(),
            download: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{Dimensions, ResizeStage};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::future::Future;
    use std::io::Cursor;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn date(y: u16, m: u8, d: u8) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_today_is_valid() {
        let today = today().unwrap();
        assert!(today.year() >= 2024);
    }

    #[test]
    fn test_calculate_age() {
        let today = date(2026, 10, 17);
        assert_eq!(
            calculate_age("15-Aug-1991", today),
            "आपकी आयु है: 35 वर्ष 2 महीने 2 दिन"
        );
        assert_eq!(
            calculate_age("17/10/2026", today),
            "आपकी आयु है: 0 वर्ष 0 महीने 0 दिन"
        );
    }

    #[test]
    fn test_calculate_age_invalid_and_future() {
        let today = date(2026, 10, 17);
        assert_eq!(calculate_age("31-04-2024", today), messages::INVALID_DOB);
        assert_eq!(calculate_age("", today), messages::INVALID_DOB);
        assert_eq!(calculate_age("18-10-2026", today), messages::FUTURE_DOB);
    }

    #[test]
    fn test_calculate_date_difference() {
        let out = calculate_date_difference("20-03-2025", "15-Jan-2024");
        assert_eq!(out.breakdown, "अंतर: 1 वर्ष 2 महीने 5 दिन");
        assert_eq!(out.total_months, "कुल महीने: 14");
        assert_eq!(out.total_days, "कुल दिन: 430");
    }

    #[test]
    fn test_calculate_date_difference_clears_on_error() {
        let out = calculate_date_difference("01-01-2024", "30-02-2024");
        assert_eq!(out.breakdown, messages::INVALID_DATES);
        assert!(out.total_months.is_empty());
        assert!(out.total_days.is_empty());
    }

    #[test]
    fn test_calculate_date_plus_days() {
        assert_eq!(
            calculate_date_plus_days("31-01-2024", "1"),
            "New Date (तिथि) : 01-02-2024"
        );
        assert_eq!(
            calculate_date_plus_days("01-mar-2024", "-1"),
            "New Date (तिथि) : 29-02-2024"
        );
        assert_eq!(
            calculate_date_plus_days("01-03-2024", " +30 "),
            "New Date (तिथि) : 31-03-2024"
        );
    }

    #[test]
    fn test_calculate_date_plus_days_rejects_bad_input() {
        assert_eq!(calculate_date_plus_days("31-01-2024", "1.5"), messages::INVALID_DATE_AND_DAYS);
        assert_eq!(calculate_date_plus_days("31-01-2024", ""), messages::INVALID_DATE_AND_DAYS);
        assert_eq!(calculate_date_plus_days("32-01-2024", "1"), messages::INVALID_DATE_AND_DAYS);
        assert_eq!(calculate_date_plus_days("31-12-9999", "1"), messages::INVALID_DATE_AND_DAYS);
    }

    #[test]
    fn test_resize_form_to_request() {
        let form = ResizeForm {
            width:  "21",
            height: "29.7",
            unit:   "cm",
            dpi:    "300",
        };
        let request = form.to_request().unwrap();
        assert_eq!(request.unit, Unit::Cm);
        assert_eq!(request.dpi, 300);
        assert!((request.height - 29.7).abs() < f64::EPSILON);

        let blank = ResizeForm {
            width:  "",
            height: "10",
            unit:   "mm",
            dpi:    "",
        };
        let request = blank.to_request().unwrap();
        assert!(request.width.is_nan());
        assert_eq!(request.dpi, 0);

        let negative_dpi = ResizeForm {
            dpi: "-5",
            ..form
        };
        assert_eq!(negative_dpi.to_request().unwrap().dpi, u32::MAX);
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 20, 30])))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_resize_image_messages() {
        let session = ResizeSession::default();
        let file = png(32, 32);
        let form = ResizeForm {
            width:  "10",
            height: "10",
            unit:   "cm",
            dpi:    "300",
        };

        let missing = resize_image::<Vec<u8>>(&session, &form, None).await.unwrap();
        assert_eq!(missing.message, messages::RASTER_MISSING_FIELDS);
        assert!(missing.download.is_none());

        let low_dpi = ResizeForm { dpi: "50", ..form };
        let out = resize_image(&session, &low_dpi, Some(&file)).await.unwrap();
        assert_eq!(out.message, messages::RASTER_DPI_RANGE);

        let too_big = ResizeForm { width: "22", ..form };
        let out = resize_image(&session, &too_big, Some(&file)).await.unwrap();
        assert_eq!(out.message, messages::RASTER_EXCEEDS_A4);

        let too_many_px = ResizeForm {
            width: "5000",
            unit: "px",
            ..form
        };
        let out = resize_image(&session, &too_many_px, Some(&file)).await.unwrap();
        assert_eq!(out.message, messages::RASTER_EXCEEDS_PIXELS);

        let bad_unit = ResizeForm { unit: "furlong", ..form };
        let out = resize_image(&session, &bad_unit, Some(&file)).await.unwrap();
        assert_eq!(out.message, messages::RASTER_MISSING_FIELDS);

        let corrupt = b"garbage".to_vec();
        let out = resize_image(&session, &form, Some(&corrupt)).await.unwrap();
        assert_eq!(out.message, messages::RASTER_LOAD_FAILED);
        assert!(out.download.is_none());
    }

    #[tokio::test]
    async fn test_resize_image_ready() {
        let session = ResizeSession::default();
        let file = png(32, 32);
        let form = ResizeForm {
            width:  "16",
            height: "16",
            unit:   "px",
            dpi:    "72",
        };

        let out = resize_image(&session, &form, Some(&file)).await.unwrap();
        assert_eq!(out.message, messages::RASTER_READY);
        let download = out.download.unwrap();
        assert_eq!(download.dimensions, Dimensions::new(16, 16));
        assert!(download.data_url().starts_with("data:image/jpeg;base64,"));
    }

    struct GatedSource {
        gate:  Arc<Notify>,
        bytes: Vec<u8>,
    }

    impl ImageSource for GatedSource {
        fn read(&self) -> impl Future<Output = std::io::Result<Vec<u8>>> + Send {
            let gate = Arc::clone(&self.gate);
            let bytes = self.bytes.clone();
            async move {
                gate.notified().await;
                Ok(bytes)
            }
        }
    }

    #[tokio::test]
    async fn test_bad_unit_supersedes_pending_resize() {
        let session = ResizeSession::default();
        let gate = Arc::new(Notify::new());
        let slow = GatedSource {
            gate:  Arc::clone(&gate),
            bytes: png(50, 50),
        };
        let valid = ResizeForm {
            width:  "20",
            height: "20",
            unit:   "px",
            dpi:    "72",
        };
        let bad_unit = ResizeForm {
            unit: "furlong",
            ..valid
        };

        let (older, newer) = tokio::join!(resize_image(&session, &valid, Some(&slow)), async {
            let out = resize_image(&session, &bad_unit, Some(&slow)).await;
            gate.notify_one();
            out
        });

        assert_eq!(older, None);
        assert_eq!(newer.unwrap().message, messages::RASTER_MISSING_FIELDS);
        assert_eq!(session.stage(), ResizeStage::Rejected);
    }
}
