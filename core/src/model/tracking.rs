use serde::{Deserialize, Serialize};

/// Center-form bounding box, normalized to the image size (0..1 on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Converts a pixel corner box `[x1, y1, x2, y2]` into normalized center form.
    pub fn from_pixel_corners(corners: [f64; 4], image_width: f64, image_height: f64) -> Self {
        let [x1, y1, x2, y2] = corners;
        Self {
            x: (x1 + x2) / 2.0 / image_width,
            y: (y1 + y2) / 2.0 / image_height,
            width: (x2 - x1).abs() / image_width,
            height: (y2 - y1).abs() / image_height,
        }
    }

    /// Corners as `(x, y)` in top-left, top-right, bottom-right, bottom-left order.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        [
            (self.x - half_w, self.y - half_h),
            (self.x + half_w, self.y - half_h),
            (self.x + half_w, self.y + half_h),
            (self.x - half_w, self.y + half_h),
        ]
    }
}

/// Single tracked detection inside one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub track_id: i64,
    pub class_id: i64,
    pub confidence: f64,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingFrame {
    pub frame_index: u64,
    pub detections: Vec<DetectionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: u64,
    pub duration_ms: u64,
}

impl VideoMetadata {
    pub fn new(name: String, width: u32, height: u32, fps: f64, total_frames: u64) -> Self {
        let duration_ms = (total_frames as f64 / fps * 1000.0).floor() as u64;
        Self {
            name,
            width,
            height,
            fps,
            total_frames,
            duration_ms,
        }
    }
}

/// Detector and tracker provenance, when the tracking file declares it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nms: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker_name: Option<String>,
}

/// Parsed output of the external tracker for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingData {
    pub video: VideoMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detector: Option<DetectorInfo>,
    pub frames: Vec<TrackingFrame>,
}
