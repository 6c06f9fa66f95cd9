use crate::model::{
    BoundingBox, DetectionRecord, DetectorInfo, TrackingData, TrackingFrame, VideoMetadata,
};
use crate::prelude::{GeoError, GeoResult, Observer};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawTrackingFile {
    model: Option<RawModelInfo>,
    tracker: Option<RawTrackerInfo>,
    video: RawVideo,
    tracking_results: Vec<RawFrame>,
}

#[derive(Debug, Deserialize)]
struct RawModelInfo {
    name: Option<String>,
    confidence_threshold: Option<f64>,
    nms: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawTrackerInfo {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawVideo {
    name: String,
    width: u32,
    height: u32,
    fps: f64,
    total_frames: u64,
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    i: u64,
    res: Vec<RawDetection>,
}

/// Detection as written by the tracker; `bbox` is in pixel corner form `[x1, y1, x2, y2]`.
#[derive(Debug, Deserialize)]
struct RawDetection {
    tid: i64,
    cid: i64,
    conf: f64,
    bbox: [f64; 4],
}

/// Parser for per-video tracker output (JSON).
pub struct TrackingParser;

impl TrackingParser {
    pub fn parse_file<P: AsRef<Path>>(path: P, observer: &dyn Observer) -> GeoResult<TrackingData> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| GeoError::io(path, source))?;
        Self::parse_str(&content, &path.display().to_string(), observer)
    }

    pub fn parse_str(content: &str, source: &str, observer: &dyn Observer) -> GeoResult<TrackingData> {
        let raw: RawTrackingFile = serde_json::from_str(content)
            .map_err(|e| GeoError::Schema(format!("{}: {}", source, e)))?;

        let video = Self::video_metadata(raw.video, source)?;
        let image_width = f64::from(video.width);
        let image_height = f64::from(video.height);

        let mut frames: Vec<TrackingFrame> = Vec::with_capacity(raw.tracking_results.len());
        for raw_frame in raw.tracking_results {
            if let Some(previous) = frames.last() {
                if raw_frame.i <= previous.frame_index {
                    return Err(GeoError::OutOfOrder(format!(
                        "{}: frame {} follows frame {}",
                        source, raw_frame.i, previous.frame_index
                    )));
                }
            }

            let detections = raw_frame
                .res
                .into_iter()
                .map(|det| Self::detection(det, image_width, image_height, raw_frame.i, source))
                .collect::<GeoResult<Vec<_>>>()?;

            frames.push(TrackingFrame {
                frame_index: raw_frame.i,
                detections,
            });
        }

        if let Some(last) = frames.last() {
            if last.frame_index >= video.total_frames {
                observer.warn(&format!(
                    "{}: frame {} is beyond the declared {} frames",
                    source, last.frame_index, video.total_frames
                ));
            }
        }

        let detector = match (raw.model, raw.tracker) {
            (None, None) => None,
            (model, tracker) => {
                let mut info = DetectorInfo::default();
                if let Some(model) = model {
                    info.model_name = model.name;
                    info.confidence_threshold = model.confidence_threshold;
                    info.nms = model.nms;
                }
                info.tracker_name = tracker.and_then(|t| t.name);
                Some(info)
            }
        };

        observer.debug(&format!(
            "Parsed {} tracking frames for video {}",
            frames.len(),
            video.name
        ));

        Ok(TrackingData {
            video,
            detector,
            frames,
        })
    }

    fn video_metadata(raw: RawVideo, source: &str) -> GeoResult<VideoMetadata> {
        if raw.width == 0 || raw.height == 0 {
            return Err(GeoError::Schema(format!(
                "{}: video dimensions {}x{} must be positive",
                source, raw.width, raw.height
            )));
        }
        if !(raw.fps.is_finite() && raw.fps > 0.0) {
            return Err(GeoError::Schema(format!(
                "{}: fps {} must be positive",
                source, raw.fps
            )));
        }
        Ok(VideoMetadata::new(
            raw.name,
            raw.width,
            raw.height,
            raw.fps,
            raw.total_frames,
        ))
    }

    fn detection(
        raw: RawDetection,
        image_width: f64,
        image_height: f64,
        frame_index: u64,
        source: &str,
    ) -> GeoResult<DetectionRecord> {
        if !(0.0..=1.0).contains(&raw.conf) {
            return Err(GeoError::Schema(format!(
                "{}: frame {} track {} has confidence {} outside [0, 1]",
                source, frame_index, raw.tid, raw.conf
            )));
        }
        if raw.bbox.iter().any(|v| !v.is_finite()) {
            return Err(GeoError::Schema(format!(
                "{}: frame {} track {} has a non-finite bbox",
                source, frame_index, raw.tid
            )));
        }

        Ok(DetectionRecord {
            track_id: raw.tid,
            class_id: raw.cid,
            confidence: raw.conf,
            bbox: BoundingBox::from_pixel_corners(raw.bbox, image_width, image_height),
        })
    }
}
