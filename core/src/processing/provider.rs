use crate::model::{FlightLog, TrackingData};
use crate::prelude::{FlightDataProvider, GeoResult, Observer};
use crate::processing::flight_log::FlightLogParser;
use crate::processing::tracking::TrackingParser;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Airdata CSV flight logs paired with ByteTrack-style tracking JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct AirdataProvider;

impl FlightDataProvider for AirdataProvider {
    fn parse_flight_log(&self, path: &Path, observer: &dyn Observer) -> GeoResult<FlightLog> {
        FlightLogParser::parse_file(path, observer)
    }

    fn parse_tracking_data(
        &self,
        path: &Path,
        observer: &dyn Observer,
    ) -> GeoResult<TrackingData> {
        TrackingParser::parse_file(path, observer)
    }
}

/// Log formats understood by the pipeline, selected in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Airdata,
}

impl ProviderKind {
    pub fn provider(self) -> Provider {
        match self {
            ProviderKind::Airdata => Provider::Airdata(AirdataProvider),
        }
    }
}

/// Provider resolved from a [`ProviderKind`].
#[derive(Debug, Clone, Copy)]
pub enum Provider {
    Airdata(AirdataProvider),
}

impl FlightDataProvider for Provider {
    fn parse_flight_log(&self, path: &Path, observer: &dyn Observer) -> GeoResult<FlightLog> {
        match self {
            Provider::Airdata(inner) => inner.parse_flight_log(path, observer),
        }
    }

    fn parse_tracking_data(
        &self,
        path: &Path,
        observer: &dyn Observer,
    ) -> GeoResult<TrackingData> {
        match self {
            Provider::Airdata(inner) => inner.parse_tracking_data(path, observer),
        }
    }

    fn map_frame_to_time(&self, frame_index: u64, fps: f64, segment_start_ms: u64) -> u64 {
        match self {
            Provider::Airdata(inner) => inner.map_frame_to_time(frame_index, fps, segment_start_ms),
        }
    }
}
