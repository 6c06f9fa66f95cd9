use crate::model::flight::{FlightMetadata, FlightSummary, PoseEntry, VideoSegment};
use crate::model::tracking::{BoundingBox, DetectorInfo, VideoMetadata};
use crate::prelude::CameraParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Drone pose at an arbitrary instant, produced by interpolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DronePose {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    pub heading_deg: f64,
    pub absolute_utc: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl From<&PoseEntry> for DronePose {
    fn from(entry: &PoseEntry) -> Self {
        Self {
            latitude: entry.latitude,
            longitude: entry.longitude,
            altitude_m: entry.altitude_m,
            heading_deg: entry.heading_deg,
            absolute_utc: entry.absolute_utc,
            elapsed_ms: entry.elapsed_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
}

/// Ground size of a detection along the drone's lateral and forward axes, in metres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundExtent {
    pub width_m: f64,
    pub height_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedObject {
    pub track_id: i64,
    pub class_id: i64,
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub ground_position: GeoPosition,
    pub extent: GroundExtent,
    /// Top-left, top-right, bottom-right, bottom-left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<[GeoPosition; 4]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedFrame {
    pub frame_index: u64,
    pub elapsed_ms: u64,
    pub absolute_utc: DateTime<Utc>,
    pub drone_pose: DronePose,
    pub objects: Vec<ProjectedObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedSegment {
    pub start_elapsed_ms: u64,
    pub end_elapsed_ms: u64,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub video: VideoMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detector: Option<DetectorInfo>,
    pub frames: Vec<ProcessedFrame>,
}

impl ProcessedSegment {
    pub(crate) fn new(
        segment: &VideoSegment,
        video: VideoMetadata,
        detector: Option<DetectorInfo>,
        frames: Vec<ProcessedFrame>,
    ) -> Self {
        Self {
            start_elapsed_ms: segment.start_elapsed_ms,
            end_elapsed_ms: segment.end_elapsed_ms,
            start_utc: segment.start_utc,
            end_utc: segment.end_utc,
            video,
            detector,
            frames,
        }
    }
}

/// Complete, all-or-nothing output of one correlation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub metadata: FlightMetadata,
    pub flight: FlightSummary,
    pub camera: CameraParams,
    pub segments: Vec<ProcessedSegment>,
}

impl ProcessingResult {
    pub fn frame_count(&self) -> usize {
        self.segments.iter().map(|s| s.frames.len()).sum()
    }

    pub fn object_count(&self) -> usize {
        self.segments
            .iter()
            .flat_map(|s| s.frames.iter())
            .map(|f| f.objects.len())
            .sum()
    }
}
