//! Explicit limits for the raster tool.
//!
//! Everything here has a `Default` matching an A4 page, so callers that do
//! not care can pass `RasterConfig::default()`. Hosts may load overrides from
//! JSON; missing keys fall back to the defaults.

use serde::{Deserialize, Serialize};

use crate::{
    JPEG_QUALITY, MAX_DPI, MAX_PIXEL_HEIGHT, MAX_PIXEL_WIDTH, MIN_DPI, raster::Unit,
};

/// Largest accepted physical width and height, in one unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBound {
    pub width:  f64,
    pub height: f64,
}

impl PageBound {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when `width`×`height` fits on the page without rotation.
    pub fn admits(&self, width: f64, height: f64) -> bool {
        width <= self.width && height <= self.height
    }
}

/// A4 page size in every physical unit the tool accepts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct A4Limits {
    pub cm:   PageBound,
    pub mm:   PageBound,
    pub inch: PageBound,
}

impl Default for A4Limits {
    fn default() -> Self {
        Self {
            cm:   PageBound::new(21.0, 29.7),
            mm:   PageBound::new(210.0, 297.0),
            inch: PageBound::new(8.27, 11.69),
        }
    }
}

impl A4Limits {
    /// Page bound for a physical unit; `None` for pixels.
    pub const fn for_unit(&self, unit: Unit) -> Option<PageBound> {
        match unit {
            Unit::Cm => Some(self.cm),
            Unit::Mm => Some(self.mm),
            Unit::Inch => Some(self.inch),
            Unit::Px => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    pub page_limits:      A4Limits,
    pub min_dpi:          u32,
    pub max_dpi:          u32,
    pub max_pixel_width:  u32,
    pub max_pixel_height: u32,
    /// JPEG quality on a 1-100 scale
    pub jpeg_quality:     u8,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            page_limits:      A4Limits::default(),
            min_dpi:          MIN_DPI,
            max_dpi:          MAX_DPI,
            max_pixel_width:  MAX_PIXEL_WIDTH,
            max_pixel_height: MAX_PIXEL_HEIGHT,
            jpeg_quality:     JPEG_QUALITY,
        }
    }
}

impl RasterConfig {
    /// Reads a configuration from JSON, defaulting any missing field.
    ///
    /// # Errors
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn dpi_in_range(&self, dpi: u32) -> bool {
        (self.min_dpi..=self.max_dpi).contains(&dpi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_a4_at_600_dpi() {
        let config = RasterConfig::default();
        assert_eq!(config.max_pixel_width, 4960);
        assert_eq!(config.max_pixel_height, 7016);
        assert_eq!(config.jpeg_quality, 92);
        assert_eq!(config.page_limits.for_unit(Unit::Cm), Some(PageBound::new(21.0, 29.7)));
        assert_eq!(config.page_limits.for_unit(Unit::Mm), Some(PageBound::new(210.0, 297.0)));
        assert_eq!(config.page_limits.for_unit(Unit::Inch), Some(PageBound::new(8.27, 11.69)));
        assert_eq!(config.page_limits.for_unit(Unit::Px), None);
    }

    #[test]
    fn test_dpi_range_inclusive() {
        let config = RasterConfig::default();
        assert!(config.dpi_in_range(72));
        assert!(config.dpi_in_range(600));
        assert!(!config.dpi_in_range(71));
        assert!(!config.dpi_in_range(601));
    }

    #[test]
    fn test_page_bound_admits() {
        let bound = PageBound::new(21.0, 29.7);
        assert!(bound.admits(21.0, 29.7));
        assert!(!bound.admits(22.0, 29.7));
        assert!(!bound.admits(21.0, 30.0));
    }

    #[test]
    fn test_from_json_partial_override() {
        let config = RasterConfig::from_json(r#"{ "max_dpi": 300 }"#).unwrap();
        assert_eq!(config.max_dpi, 300);
        assert_eq!(config.min_dpi, 72);
        assert_eq!(config.page_limits, A4Limits::default());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(RasterConfig::from_json("not json").is_err());
    }
}
