use crate::math::angles::normalize_heading;
use crate::model::{FlightLog, FlightSummary, PoseEntry, VideoSegment};
use crate::prelude::{GeoError, GeoResult, Observer};
use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const FEET_TO_METERS: f64 = 0.3048;

/// Columns consumed from an Airdata-style flight CSV; any other columns are ignored.
#[derive(Debug, Deserialize)]
struct RawFlightRecord {
    #[serde(rename = "time(millisecond)", alias = "time(milliseond)")]
    time_ms: i64,
    #[serde(rename = "datetime(utc)")]
    datetime_utc: String,
    latitude: f64,
    longitude: f64,
    #[serde(rename = "ascent(feet)")]
    ascent_feet: f64,
    #[serde(rename = "compass_heading(degrees)")]
    compass_heading_deg: f64,
    #[serde(rename = "isVideo")]
    is_video: String,
}

/// Parser for telemetry CSV logs.
pub struct FlightLogParser;

impl FlightLogParser {
    pub fn parse_file<P: AsRef<Path>>(path: P, observer: &dyn Observer) -> GeoResult<FlightLog> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| GeoError::io(path, source))?;
        Self::parse_reader(file, &path.display().to_string(), observer)
    }

    /// Parses rows in file order. `source` only labels error messages.
    pub fn parse_reader<R: Read>(
        reader: R,
        source: &str,
        observer: &dyn Observer,
    ) -> GeoResult<FlightLog> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let mut entries: Vec<PoseEntry> = Vec::new();
        let mut baseline: Option<i64> = None;
        let mut previous_raw: Option<i64> = None;

        for (row, result) in reader.deserialize::<RawFlightRecord>().enumerate() {
            let line = row + 2; // header plus 1-based numbering
            let raw = result
                .map_err(|e| GeoError::Schema(format!("{} line {}: {}", source, line, e)))?;

            if let Some(previous) = previous_raw {
                if raw.time_ms < previous {
                    return Err(GeoError::OutOfOrder(format!(
                        "{} line {}: time {} ms precedes previous row at {} ms",
                        source, line, raw.time_ms, previous
                    )));
                }
            }
            previous_raw = Some(raw.time_ms);
            let base = *baseline.get_or_insert(raw.time_ms);

            entries.push(Self::convert(raw, base, source, line)?);
        }

        let (first, last) = match (entries.first(), entries.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(GeoError::EmptyInput(source.to_string())),
        };
        let summary = FlightSummary {
            start_utc: first.absolute_utc,
            end_utc: last.absolute_utc,
            total_duration_ms: last.elapsed_ms,
        };

        let segments = extract_segments(&entries);
        observer.debug(&format!(
            "Parsed {} log entries with {} recording segments from {}",
            entries.len(),
            segments.len(),
            source
        ));

        Ok(FlightLog {
            entries,
            segments,
            summary,
        })
    }

    fn convert(raw: RawFlightRecord, base: i64, source: &str, line: usize) -> GeoResult<PoseEntry> {
        let schema = |message: String| GeoError::Schema(format!("{} line {}: {}", source, line, message));

        let absolute_utc = parse_utc(&raw.datetime_utc)
            .ok_or_else(|| schema(format!("invalid datetime '{}'", raw.datetime_utc)))?;
        let recording = parse_recording_flag(&raw.is_video)
            .ok_or_else(|| schema(format!("invalid recording flag '{}'", raw.is_video)))?;

        if !(-90.0..=90.0).contains(&raw.latitude) {
            return Err(schema(format!("latitude {} out of range", raw.latitude)));
        }
        if !(-180.0..=180.0).contains(&raw.longitude) {
            return Err(schema(format!("longitude {} out of range", raw.longitude)));
        }
        if !raw.ascent_feet.is_finite() || !raw.compass_heading_deg.is_finite() {
            return Err(schema("altitude and heading must be finite".to_string()));
        }

        Ok(PoseEntry {
            elapsed_ms: (raw.time_ms - base) as u64,
            absolute_utc,
            latitude: raw.latitude,
            longitude: raw.longitude,
            altitude_m: raw.ascent_feet * FEET_TO_METERS,
            heading_deg: normalize_heading(raw.compass_heading_deg),
            recording,
        })
    }
}

/// Splits the log into runs of consecutive recording entries.
///
/// A run still open at the end of the log is closed on the final entry.
pub fn extract_segments(entries: &[PoseEntry]) -> Vec<VideoSegment> {
    let mut segments = Vec::new();
    let mut open: Option<usize> = None;

    for (index, entry) in entries.iter().enumerate() {
        match (entry.recording, open) {
            (true, None) => open = Some(index),
            (false, Some(start)) => {
                segments.push(VideoSegment::from_span(entries, start, index - 1));
                open = None;
            }
            _ => {}
        }
    }

    if let Some(start) = open {
        segments.push(VideoSegment::from_span(entries, start, entries.len() - 1));
    }
    segments
}

/// Accepts RFC 3339 or `YYYY-MM-DD HH:MM:SS[.fff]` read as UTC.
fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn parse_recording_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::LogManager;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "time(millisecond),datetime(utc),latitude,longitude,ascent(feet),compass_heading(degrees),isVideo";

    fn parse(rows: &[&str]) -> GeoResult<FlightLog> {
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        FlightLogParser::parse_reader(content.as_bytes(), "test.csv", &LogManager::new())
    }

    #[test]
    fn parse_normalizes_time_base_and_units() {
        let log = parse(&[
            "1000,2024-01-01T12:00:00Z,37.5,127.5,100,90,0",
            "2000,2024-01-01 12:00:01,37.6,127.6,110,92,1",
            "3000,2024-01-01 12:00:02.500,37.7,127.7,120,94,1",
        ])
        .unwrap();

        assert_eq!(log.entries.len(), 3);
        let first = &log.entries[0];
        assert_eq!(first.elapsed_ms, 0);
        assert_relative_eq!(first.altitude_m, 30.48, epsilon = 1e-12);
        assert_eq!(first.heading_deg, 90.0);
        assert!(!first.recording);
        assert_eq!(
            log.entries[1].absolute_utc,
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 1).unwrap()
        );
        assert_eq!(log.entries[2].elapsed_ms, 2000);
        assert_eq!(log.summary.total_duration_ms, 2000);
    }

    #[test]
    fn segments_follow_recording_transitions() {
        let log = parse(&[
            "1000,2024-01-01T12:00:00Z,37.5,127.5,100,90,0",
            "2000,2024-01-01T12:00:01Z,37.6,127.6,110,92,1",
            "3000,2024-01-01T12:00:02Z,37.7,127.7,120,94,1",
            "4000,2024-01-01T12:00:03Z,37.8,127.8,130,96,0",
            "5000,2024-01-01T12:00:04Z,37.9,127.9,140,98,1",
            "6000,2024-01-01T12:00:05Z,38.0,128.0,150,100,1",
        ])
        .unwrap();

        assert_eq!(log.segments.len(), 2);
        let first = &log.segments[0];
        assert_eq!((first.start_index, first.end_index), (1, 2));
        assert_eq!((first.start_elapsed_ms, first.end_elapsed_ms), (1000, 2000));
        assert_eq!(first.entries.len(), 2);
        assert!(first.entries.iter().all(|e| e.recording));

        let open_at_end = &log.segments[1];
        assert_eq!((open_at_end.start_index, open_at_end.end_index), (4, 5));
        assert_eq!(open_at_end.end_elapsed_ms, 5000);
        assert!(first.end_elapsed_ms < open_at_end.start_elapsed_ms);
    }

    #[test]
    fn segment_count_matches_true_runs() {
        let flags = [1, 0, 1, 1, 0, 0, 1, 1, 1, 0, 1];
        let rows: Vec<String> = flags
            .iter()
            .enumerate()
            .map(|(i, flag)| {
                format!(
                    "{},2024-01-01T12:00:{:02}Z,37.5,127.5,100,0,{}",
                    i * 1000,
                    i,
                    flag
                )
            })
            .collect();
        let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let log = parse(&row_refs).unwrap();

        let lengths: Vec<usize> = log.segments.iter().map(|s| s.entries.len()).collect();
        assert_eq!(lengths, vec![1, 2, 3, 1]);
        for pair in log.segments.windows(2) {
            assert!(pair[0].end_index < pair[1].start_index);
        }
    }

    #[test]
    fn headings_are_folded_into_one_turn() {
        let log = parse(&[
            "1000,2024-01-01T12:00:00Z,37.5,127.5,100,360,0",
            "2000,2024-01-01T12:00:01Z,37.5,127.5,100,-5,0",
            "3000,2024-01-01T12:00:02Z,37.5,127.5,100,725.5,0",
            "4000,2024-01-01T12:00:03Z,37.5,127.5,100,359.5,0",
        ])
        .unwrap();
        let headings: Vec<f64> = log.entries.iter().map(|e| e.heading_deg).collect();
        assert_eq!(headings, vec![0.0, 355.0, 5.5, 359.5]);
    }

    #[test]
    fn time_regression_is_rejected() {
        let err = parse(&[
            "1000,2024-01-01T12:00:00Z,37.5,127.5,100,90,0",
            "900,2024-01-01T12:00:01Z,37.6,127.6,110,92,1",
        ])
        .unwrap_err();
        assert!(matches!(err, GeoError::OutOfOrder(_)));
    }

    #[test]
    fn missing_or_malformed_fields_are_schema_errors() {
        let err = parse(&["1000,2024-01-01T12:00:00Z,37.5,127.5,abc,90,0"]).unwrap_err();
        assert!(matches!(err, GeoError::Schema(_)));

        let err = parse(&["1000,not-a-date,37.5,127.5,100,90,0"]).unwrap_err();
        assert!(matches!(err, GeoError::Schema(_)));

        let err = parse(&["1000,2024-01-01T12:00:00Z,37.5,127.5,100,90,maybe"]).unwrap_err();
        assert!(matches!(err, GeoError::Schema(_)));

        let content = "time(millisecond),latitude\n1000,37.5\n";
        let err = FlightLogParser::parse_reader(content.as_bytes(), "short.csv", &LogManager::new())
            .unwrap_err();
        assert!(matches!(err, GeoError::Schema(_)));
    }

    #[test]
    fn empty_log_is_rejected() {
        let err = parse(&[]).unwrap_err();
        assert!(matches!(err, GeoError::EmptyInput(_)));
    }

    #[test]
    fn parse_file_reads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "500,2024-01-01T12:00:00Z,37.5,127.5,100,90,true").unwrap();
        file.flush().unwrap();

        let log = FlightLogParser::parse_file(file.path(), &LogManager::new()).unwrap();
        assert_eq!(log.segments.len(), 1);
        assert_eq!(log.segments[0].start_index, 0);

        let missing = FlightLogParser::parse_file("/nonexistent/flight.csv", &LogManager::new());
        assert!(matches!(missing, Err(GeoError::Io { .. })));
    }
}
