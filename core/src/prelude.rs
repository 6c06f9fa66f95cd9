use crate::model::{FlightLog, TrackingData};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Camera field of view used to project detections onto the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraParams {
    pub horizontal_fov_deg: f64,
    pub vertical_fov_deg: f64,
}

impl CameraParams {
    pub fn new(horizontal_fov_deg: f64, vertical_fov_deg: f64) -> GeoResult<Self> {
        let params = Self {
            horizontal_fov_deg,
            vertical_fov_deg,
        };
        params.validate()?;
        Ok(params)
    }

    /// Both fields of view must lie strictly inside (0, 180) degrees.
    pub fn validate(&self) -> GeoResult<()> {
        for (axis, fov) in [
            ("horizontal", self.horizontal_fov_deg),
            ("vertical", self.vertical_fov_deg),
        ] {
            if !(fov > 0.0 && fov < 180.0) {
                return Err(GeoError::InvalidCameraParams(format!(
                    "{} field of view {} is outside (0, 180) degrees",
                    axis, fov
                )));
            }
        }
        Ok(())
    }
}

/// Shared configuration for a correlation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelatorConfig {
    pub camera: CameraParams,
    /// Emit the four-corner ground polygon for every projected object.
    #[serde(default = "default_footprints")]
    pub footprints: bool,
}

fn default_footprints() -> bool {
    true
}

impl CorrelatorConfig {
    pub fn new(camera: CameraParams) -> Self {
        Self {
            camera,
            footprints: default_footprints(),
        }
    }
}

/// Common error type for parsing, interpolation, projection and correlation.
#[derive(thiserror::Error, Debug)]
pub enum GeoError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("schema violation: {0}")]
    Schema(String),
    #[error("no records in {0}")]
    EmptyInput(String),
    #[error("out of order: {0}")]
    OutOfOrder(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(
        "flight log has {segments} recording segments but {trackings} tracking files were supplied"
    )]
    SegmentCountMismatch { segments: usize, trackings: usize },
    #[error("invalid camera parameters: {0}")]
    InvalidCameraParams(String),
}

impl GeoError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        GeoError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type GeoResult<T> = Result<T, GeoError>;

/// Observability collaborator handed to every component instead of a global logger.
pub trait Observer: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);

    /// Called once per processed frame with the number of projected objects.
    fn record_frame(&self, _objects: usize) {}
}

/// Vendor-specific ingestion of flight logs and tracker output.
///
/// Implementations are chosen once when the pipeline is composed; see
/// [`crate::processing::provider::ProviderKind`].
pub trait FlightDataProvider: Send + Sync {
    fn parse_flight_log(&self, path: &Path, observer: &dyn Observer) -> GeoResult<FlightLog>;

    fn parse_tracking_data(&self, path: &Path, observer: &dyn Observer)
        -> GeoResult<TrackingData>;

    /// Absolute elapsed time (ms since flight start) at which a frame was captured.
    ///
    /// Saturates at `u64::MAX`; such a time lies past every log entry and is clamped later.
    fn map_frame_to_time(&self, frame_index: u64, fps: f64, segment_start_ms: u64) -> u64 {
        segment_start_ms.saturating_add(frame_offset_ms(frame_index, fps))
    }
}

/// Offset of a frame from the start of its video: `floor(frame_index / fps * 1000)`.
pub fn frame_offset_ms(frame_index: u64, fps: f64) -> u64 {
    (frame_index as f64 / fps * 1000.0).floor() as u64
}
