pub mod correlator;
pub mod flight_log;
pub mod interpolator;
pub mod projector;
pub mod provider;
pub mod tracking;

pub use correlator::Correlator;
pub use flight_log::{extract_segments, FlightLogParser, FEET_TO_METERS};
pub use interpolator::{interpolate, PoseTrack};
pub use projector::{project, GeoProjector, GroundProjection};
pub use provider::{AirdataProvider, Provider, ProviderKind};
pub use tracking::TrackingParser;
