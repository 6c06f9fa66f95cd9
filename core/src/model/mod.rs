pub mod flight;
pub mod result;
pub mod tracking;

pub use flight::{FlightLog, FlightMetadata, FlightSummary, PoseEntry, VideoSegment};
pub use result::{
    DronePose, GeoPosition, GroundExtent, ProcessedFrame, ProcessedSegment, ProcessingResult,
    ProjectedObject,
};
pub use tracking::{
    BoundingBox, DetectionRecord, DetectorInfo, TrackingData, TrackingFrame, VideoMetadata,
};
