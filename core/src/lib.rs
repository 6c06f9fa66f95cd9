//! Pose interpolation and ground projection core for drone detection georeferencing.
//!
//! The modules follow the batch pipeline: parse the flight log and the tracker output,
//! pair recording segments with their videos, interpolate the drone pose at each frame and
//! project every detection onto the ground plane.

pub mod math;
pub mod model;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{
    CameraParams, CorrelatorConfig, FlightDataProvider, GeoError, GeoResult, Observer,
};
