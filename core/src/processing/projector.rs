use crate::math::geodesy::destination_point;
use crate::model::{BoundingBox, DronePose, GeoPosition, GroundExtent};
use crate::prelude::{CameraParams, GeoResult};

/// Ground-plane projection of one detection.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundProjection {
    pub center: GeoPosition,
    /// Top-left, top-right, bottom-right, bottom-left.
    pub footprint: [GeoPosition; 4],
    pub extent: GroundExtent,
}

/// Offset on the ground from the point directly below the drone, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GroundOffset {
    /// Positive to the right of the drone's heading.
    lateral: f64,
    /// Positive along the drone's heading.
    forward: f64,
}

/// Projects normalized image boxes through an ideal nadir pinhole camera onto a flat
/// ground plane at elevation 0.
#[derive(Debug, Clone)]
pub struct GeoProjector {
    h_fov_rad: f64,
    v_fov_rad: f64,
}

impl GeoProjector {
    pub fn new(camera: CameraParams) -> GeoResult<Self> {
        camera.validate()?;
        Ok(Self {
            h_fov_rad: camera.horizontal_fov_deg.to_radians(),
            v_fov_rad: camera.vertical_fov_deg.to_radians(),
        })
    }

    pub fn project(&self, bbox: &BoundingBox, pose: &DronePose) -> GroundProjection {
        let altitude = pose.altitude_m;
        let center = self.locate(self.ground_offset(bbox.x, bbox.y, altitude), pose);

        let footprint = bbox
            .corners()
            .map(|(x, y)| self.locate(self.ground_offset(x, y, altitude), pose));

        let half_w = bbox.width / 2.0;
        let half_h = bbox.height / 2.0;
        let left = self.ground_offset(bbox.x - half_w, bbox.y, altitude);
        let right = self.ground_offset(bbox.x + half_w, bbox.y, altitude);
        let top = self.ground_offset(bbox.x, bbox.y - half_h, altitude);
        let bottom = self.ground_offset(bbox.x, bbox.y + half_h, altitude);
        let extent = GroundExtent {
            width_m: (right.lateral - left.lateral).abs(),
            height_m: (top.forward - bottom.forward).abs(),
        };

        GroundProjection {
            center,
            footprint,
            extent,
        }
    }

    /// Each image point is re-projected through its own view angle, so edges keep their
    /// perspective stretch instead of scaling linearly from the center.
    fn ground_offset(&self, x: f64, y: f64, altitude: f64) -> GroundOffset {
        if altitude.is_nan() || altitude <= 0.0 {
            return GroundOffset {
                lateral: 0.0,
                forward: 0.0,
            };
        }
        let angle_x = (x.clamp(0.0, 1.0) - 0.5) * self.h_fov_rad;
        let angle_y = (y.clamp(0.0, 1.0) - 0.5) * self.v_fov_rad;
        GroundOffset {
            lateral: altitude * angle_x.tan(),
            // image rows grow downward; the top edge faces along the heading
            forward: -altitude * angle_y.tan(),
        }
    }

    fn locate(&self, offset: GroundOffset, pose: &DronePose) -> GeoPosition {
        let distance = offset.lateral.hypot(offset.forward);
        let bearing = pose.heading_deg.to_radians() + offset.lateral.atan2(offset.forward);
        let (latitude, longitude) =
            destination_point(pose.latitude, pose.longitude, bearing, distance);
        GeoPosition {
            latitude,
            longitude,
            altitude_m: 0.0,
        }
    }
}

/// Validates `camera` and projects a single box.
pub fn project(
    bbox: &BoundingBox,
    pose: &DronePose,
    camera: &CameraParams,
) -> GeoResult<GroundProjection> {
    Ok(GeoProjector::new(*camera)?.project(bbox, pose))
}
