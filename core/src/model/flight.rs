use crate::math::search::{bracket, Bracket};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One telemetry row after unit and time-base normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseEntry {
    /// Milliseconds since the first row of the log.
    pub elapsed_ms: u64,
    pub absolute_utc: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    /// Compass heading, 0 = north, clockwise.
    pub heading_deg: f64,
    pub recording: bool,
}

/// Contiguous run of log entries captured while the camera was recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSegment {
    pub start_elapsed_ms: u64,
    pub end_elapsed_ms: u64,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub start_index: usize,
    pub end_index: usize,
    pub entries: Vec<PoseEntry>,
}

impl VideoSegment {
    /// Builds the segment covering `entries[start_index..=end_index]`.
    pub(crate) fn from_span(entries: &[PoseEntry], start_index: usize, end_index: usize) -> Self {
        let span = entries[start_index..=end_index].to_vec();
        let first = &entries[start_index];
        let last = &entries[end_index];
        Self {
            start_elapsed_ms: first.elapsed_ms,
            end_elapsed_ms: last.elapsed_ms,
            start_utc: first.absolute_utc,
            end_utc: last.absolute_utc,
            start_index,
            end_index,
            entries: span,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_elapsed_ms - self.start_elapsed_ms
    }

    pub fn contains(&self, elapsed_ms: u64) -> bool {
        (self.start_elapsed_ms..=self.end_elapsed_ms).contains(&elapsed_ms)
    }
}

/// Whole-log time bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub total_duration_ms: u64,
}

/// Parsed flight log: every pose entry plus the recording segments derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLog {
    pub entries: Vec<PoseEntry>,
    pub segments: Vec<VideoSegment>,
    pub summary: FlightSummary,
}

impl FlightLog {
    /// Finds the recording segment whose time window contains `elapsed_ms`.
    pub fn segment_at(&self, elapsed_ms: u64) -> Option<(usize, &VideoSegment)> {
        let candidate = match bracket(&self.segments, elapsed_ms, |s| s.start_elapsed_ms) {
            Bracket::Exact(index) | Bracket::Between(index, _) => index,
            Bracket::Above => self.segments.len() - 1,
            Bracket::Empty | Bracket::Below => return None,
        };
        let segment = &self.segments[candidate];
        segment.contains(elapsed_ms).then_some((candidate, segment))
    }
}

/// Caller-supplied description of the flight, carried through to the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightMetadata {
    pub name: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
