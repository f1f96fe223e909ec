//! Print-size image fitting.
//!
//! A [`ResizeRequest`] describes the printed size the user wants. Validation
//! turns it into a [`PixelTarget`], the selected image is loaded and decoded,
//! scaled down (never up) to fit inside the target, and exported as JPEG.
//!
//! Runs go through a [`ResizeSession`]. Starting a run invalidates every run
//! started before it, so a slow load that finishes late never overwrites the
//! result of a newer request.

use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::{CM_PER_INCH, EXPORT_MIME, MM_PER_INCH, RasterConfig, prelude::*};

/// Unit of the requested width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[display(fmt = "cm")]
    Cm,
    #[display(fmt = "mm")]
    Mm,
    #[display(fmt = "inch")]
    Inch,
    #[display(fmt = "px")]
    Px,
}

impl Unit {
    /// Converts a length in this unit to inches; `None` for pixels.
    pub fn to_inches(self, value: f64) -> Option<f64> {
        match self {
            Self::Cm => Some(value / CM_PER_INCH),
            Self::Mm => Some(value / MM_PER_INCH),
            Self::Inch => Some(value),
            Self::Px => None,
        }
    }
}

impl FromStr for Unit {
    type Err = RasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cm" => Ok(Self::Cm),
            "mm" => Ok(Self::Mm),
            "inch" | "in" => Ok(Self::Inch),
            "px" => Ok(Self::Px),
            _ => Err(RasterError::UnknownUnit(s.to_owned())),
        }
    }
}

/// Error type for the resize pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// No file selected, or a size/dpi field is missing or not positive.
    #[error("A file, a positive width, height and dpi are all required")]
    MissingFields,

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("DPI {dpi} outside {min}-{max}")]
    DpiOutOfRange { dpi: u32, min: u32, max: u32 },

    #[error("{width}x{height} {unit} is larger than an A4 page")]
    ExceedsA4 { unit: Unit, width: f64, height: f64 },

    #[error("{width}x{height} px exceeds the {max_width}x{max_height} px ceiling")]
    ExceedsPixelCeiling {
        width:      f64,
        height:     f64,
        max_width:  u32,
        max_height: u32,
    },

    #[error("Failed to read image source: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has no pixels")]
    EmptyImage,

    #[error("Failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),

    /// A newer run started, or the session was cancelled, before this one finished.
    #[error("Resize superseded by a newer request")]
    Cancelled,
}

impl RasterError {
    /// True for rejections raised before any image work starts.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingFields
                | Self::UnknownUnit(_)
                | Self::DpiOutOfRange { .. }
                | Self::ExceedsA4 { .. }
                | Self::ExceedsPixelCeiling { .. }
        )
    }
}

/// Requested output size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeRequest {
    pub width:  f64,
    pub height: f64,
    pub unit:   Unit,
    pub dpi:    u32,
}

/// Pixel bounds the output must fit inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelTarget {
    pub width:  f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "{width}x{height}")]
pub struct Dimensions {
    pub width:  u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ResizeRequest {
    /// Checks the request against `config` and computes the pixel target.
    ///
    /// Physical units are converted through inches at `dpi` and rounded;
    /// pixel requests are used as given.
    ///
    /// # Errors
    /// Returns the first failing check, in order: `MissingFields`,
    /// `DpiOutOfRange`, `ExceedsA4`, `ExceedsPixelCeiling`.
    pub fn validate(&self, config: &RasterConfig) -> Result<PixelTarget, RasterError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.width) || !positive(self.height) || self.dpi == 0 {
            return Err(RasterError::MissingFields);
        }

        if !config.dpi_in_range(self.dpi) {
            return Err(RasterError::DpiOutOfRange {
                dpi: self.dpi,
                min: config.min_dpi,
                max: config.max_dpi,
            });
        }

        if let Some(bound) = config.page_limits.for_unit(self.unit) {
            if !bound.admits(self.width, self.height) {
                return Err(RasterError::ExceedsA4 {
                    unit:   self.unit,
                    width:  self.width,
                    height: self.height,
                });
            }
        }

        let dpi = f64::from(self.dpi);
        let target = match (
            self.unit.to_inches(self.width),
            self.unit.to_inches(self.height),
        ) {
            (Some(w), Some(h)) => PixelTarget {
                width:  (w * dpi).round(),
                height: (h * dpi).round(),
            },
            _ => PixelTarget {
                width:  self.width,
                height: self.height,
            },
        };

        if target.width > f64::from(config.max_pixel_width)
            || target.height > f64::from(config.max_pixel_height)
        {
            return Err(RasterError::ExceedsPixelCeiling {
                width:      target.width,
                height:     target.height,
                max_width:  config.max_pixel_width,
                max_height: config.max_pixel_height,
            });
        }

        Ok(target)
    }
}

/// Largest size with `source`'s aspect ratio that fits inside `target`.
///
/// The scale factor is capped at 1.0, so images already inside the target
/// keep their size. Each axis is rounded to the nearest pixel but never past
/// the whole-pixel part of the target, so a fractional px target such as
/// 100.6 allows at most 100 pixels. Each axis keeps at least one pixel, which
/// is the one case where a target below 1 px is exceeded.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fit_within(source: Dimensions, target: PixelTarget) -> Dimensions {
    let (ow, oh) = (f64::from(source.width), f64::from(source.height));
    let scale = (target.width / ow).min(target.height / oh).min(1.0);

    let scaled = |v: f64, bound: f64| ((v * scale).round().min(bound.floor()) as u32).max(1);
    Dimensions::new(scaled(ow, target.width), scaled(oh, target.height))
}

/// Where the pipeline is. Failed runs end in `Rejected` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
pub enum ResizeStage {
    #[default]
    Idle,
    Validating,
    Rejected,
    Loading,
    Scaling,
    Ready,
    Failed,
}

/// Encoded result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub dimensions: Dimensions,
    pub jpeg:       Vec<u8>,
}

impl ExportedImage {
    /// `data:` URL suitable as a download link target.
    pub fn data_url(&self) -> String {
        format!("data:{EXPORT_MIME};base64,{}", STANDARD.encode(&self.jpeg))
    }
}

/// The selected file: anything that can hand over its bytes asynchronously.
pub trait ImageSource {
    fn read(&self) -> impl Future<Output = std::io::Result<Vec<u8>>> + Send;
}

impl ImageSource for Vec<u8> {
    fn read(&self) -> impl Future<Output = std::io::Result<Vec<u8>>> + Send {
        let bytes = self.clone();
        async move { Ok(bytes) }
    }
}

impl ImageSource for PathBuf {
    fn read(&self) -> impl Future<Output = std::io::Result<Vec<u8>>> + Send {
        tokio::fs::read(self.clone())
    }
}

/// Newest generation and its stage, always read and written together.
#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    stage:      ResizeStage,
}

type SharedState = Arc<Mutex<SessionState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Coordinates resize runs so only the newest one can publish a result.
#[derive(Debug, Clone, Default)]
pub struct ResizeSession {
    state:  SharedState,
    config: RasterConfig,
}

/// Proof that a run is still the newest one.
#[derive(Debug, Clone)]
pub struct ResizeTicket {
    state:      SharedState,
    generation: u64,
}

impl ResizeTicket {
    pub fn is_current(&self) -> bool {
        lock(&self.state).generation == self.generation
    }

    /// Records `stage` if this ticket is still current. The check and the
    /// write happen under one lock, so a newer run's stage is never
    /// overwritten.
    ///
    /// # Errors
    /// Returns `RasterError::Cancelled` for a superseded ticket.
    pub fn advance(&self, stage: ResizeStage) -> Result<(), RasterError> {
        let mut state = lock(&self.state);
        if state.generation != self.generation {
            log::debug!("resize run {} superseded before {stage}", self.generation);
            return Err(RasterError::Cancelled);
        }
        log::debug!("resize run {} -> {stage}", self.generation);
        state.stage = stage;
        Ok(())
    }
}

impl ResizeSession {
    pub fn new(config: RasterConfig) -> Self {
        Self {
            state: SharedState::default(),
            config,
        }
    }

    pub const fn config(&self) -> &RasterConfig {
        &self.config
    }

    /// Stage of the newest run.
    pub fn stage(&self) -> ResizeStage {
        lock(&self.state).stage
    }

    /// Starts a new run, invalidating every earlier ticket.
    pub fn begin(&self) -> ResizeTicket {
        let mut state = lock(&self.state);
        state.generation += 1;
        ResizeTicket {
            state:      Arc::clone(&self.state),
            generation: state.generation,
        }
    }

    /// Invalidates any run in flight. Late completions are discarded.
    pub fn cancel(&self) {
        let mut state = lock(&self.state);
        state.generation += 1;
        state.stage = ResizeStage::Idle;
    }

    /// Records a submission that failed before a request could be built.
    ///
    /// It counts as the newest run: runs in flight are superseded and the
    /// stage becomes `Rejected`. Returns `err` for the caller to report.
    pub fn reject(&self, err: RasterError) -> RasterError {
        let ticket = self.begin();
        log::info!("resize request rejected: {err}");
        match ticket.advance(ResizeStage::Rejected) {
            Ok(()) => err,
            Err(cancelled) => cancelled,
        }
    }

    /// Validates, loads, scales and exports one image.
    ///
    /// `source` is `None` when no file was selected.
    ///
    /// # Errors
    /// Validation errors are returned before `source` is touched. Read and
    /// decode failures come back as `Read`/`Decode`/`EmptyImage`, and a run
    /// overtaken by a newer one returns `Cancelled` without changing the
    /// session stage.
    pub async fn run<S: ImageSource + ?Sized>(
        &self,
        request: &ResizeRequest,
        source: Option<&S>,
    ) -> Result<ExportedImage, RasterError> {
        let ticket = self.begin();
        ticket.advance(ResizeStage::Validating)?;

        let validated = source
            .ok_or(RasterError::MissingFields)
            .and_then(|source| Ok((source, request.validate(&self.config)?)));
        let (source, target) = match validated {
            Ok(ok) => ok,
            Err(err) => {
                debug_assert!(err.is_validation());
                log::info!("resize request rejected: {err}");
                ticket.advance(ResizeStage::Rejected)?;
                return Err(err);
            }
        };

        let result = self.load_and_export(&ticket, source, target).await;
        match &result {
            Ok(image) => {
                ticket.advance(ResizeStage::Ready)?;
                log::info!("resize ready: {} ({} bytes)", image.dimensions, image.jpeg.len());
            }
            Err(RasterError::Cancelled) => {}
            Err(err) => {
                log::warn!("resize failed: {err}");
                ticket.advance(ResizeStage::Failed)?;
            }
        }
        result
    }

    async fn load_and_export<S: ImageSource + ?Sized>(
        &self,
        ticket: &ResizeTicket,
        source: &S,
        target: PixelTarget,
    ) -> Result<ExportedImage, RasterError> {
        ticket.advance(ResizeStage::Loading)?;
        let bytes = source.read().await?;
        ticket.advance(ResizeStage::Loading)?;

        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(std::io::Error::other)??;
        ticket.advance(ResizeStage::Scaling)?;

        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(RasterError::EmptyImage);
        }

        let dimensions = fit_within(
            Dimensions::new(decoded.width(), decoded.height()),
            target,
        );
        log::debug!(
            "scaling {}x{} into {}x{} -> {dimensions}",
            decoded.width(),
            decoded.height(),
            target.width,
            target.height
        );

        let quality = self.config.jpeg_quality;
        let jpeg = tokio::task::spawn_blocking(move || render_jpeg(&decoded, dimensions, quality))
            .await
            .map_err(std::io::Error::other)?
            .map_err(RasterError::Encode)?;

        Ok(ExportedImage { dimensions, jpeg })
    }
}

/// Draws `image` at `dimensions` and encodes it as JPEG.
fn render_jpeg(
    image: &DynamicImage,
    dimensions: Dimensions,
    quality: u8,
) -> Result<Vec<u8>, image::ImageError> {
    let rgb = if image.width() == dimensions.width && image.height() == dimensions.height {
        image.to_rgb8()
    } else {
        image
            .resize_exact(dimensions.width, dimensions.height, FilterType::Triangle)
            .to_rgb8()
    };

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality).encode_image(&rgb)?;
    Ok(jpeg)
}
