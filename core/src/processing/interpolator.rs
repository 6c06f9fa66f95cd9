use crate::math::angles::interpolate_heading;
use crate::math::search::{bracket, Bracket};
use crate::model::{DronePose, PoseEntry};
use crate::prelude::{GeoError, GeoResult, Observer};
use chrono::Duration;

/// Pose entries validated once as non-empty and sorted by elapsed time.
#[derive(Debug, Clone, Copy)]
pub struct PoseTrack<'a> {
    entries: &'a [PoseEntry],
}

impl<'a> PoseTrack<'a> {
    pub fn new(entries: &'a [PoseEntry]) -> GeoResult<Self> {
        if entries.is_empty() {
            return Err(GeoError::InvalidInput("pose sequence is empty".into()));
        }
        if let Some(index) = entries
            .windows(2)
            .position(|pair| pair[1].elapsed_ms < pair[0].elapsed_ms)
        {
            return Err(GeoError::InvalidInput(format!(
                "pose sequence is not sorted at index {}",
                index + 1
            )));
        }
        Ok(Self { entries })
    }

    /// Drone pose at `target_ms`.
    ///
    /// Targets at or beyond either end of the track are clamped to that end entry and reported
    /// to `observer`.
    pub fn interpolate(&self, target_ms: u64, observer: &dyn Observer) -> DronePose {
        let first = &self.entries[0];
        let last = &self.entries[self.entries.len() - 1];

        if target_ms <= first.elapsed_ms {
            observer.warn(&format!(
                "Target time {}ms is at or before first log entry ({}ms), using its pose",
                target_ms, first.elapsed_ms
            ));
            return DronePose::from(first);
        }
        if target_ms >= last.elapsed_ms {
            observer.warn(&format!(
                "Target time {}ms is at or after last log entry ({}ms), using its pose",
                target_ms, last.elapsed_ms
            ));
            return DronePose::from(last);
        }

        match bracket(self.entries, target_ms, |entry| entry.elapsed_ms) {
            Bracket::Exact(index) => DronePose::from(&self.entries[index]),
            Bracket::Between(before, after) => {
                blend(&self.entries[before], &self.entries[after], target_ms)
            }
            // interior targets always land inside the track
            Bracket::Empty | Bracket::Below => DronePose::from(first),
            Bracket::Above => DronePose::from(last),
        }
    }
}

/// Validates `entries` and interpolates the pose at `target_ms`.
pub fn interpolate(
    target_ms: u64,
    entries: &[PoseEntry],
    observer: &dyn Observer,
) -> GeoResult<DronePose> {
    Ok(PoseTrack::new(entries)?.interpolate(target_ms, observer))
}

fn blend(before: &PoseEntry, after: &PoseEntry, target_ms: u64) -> DronePose {
    let span = after.elapsed_ms.saturating_sub(before.elapsed_ms);
    if span == 0 {
        return DronePose::from(before);
    }
    let weight = (target_ms - before.elapsed_ms) as f64 / span as f64;

    let utc_span_ms = (after.absolute_utc - before.absolute_utc).num_milliseconds();
    let absolute_utc =
        before.absolute_utc + Duration::milliseconds((utc_span_ms as f64 * weight).round() as i64);

    DronePose {
        latitude: lerp(before.latitude, after.latitude, weight),
        longitude: lerp(before.longitude, after.longitude, weight),
        altitude_m: lerp(before.altitude_m, after.altitude_m, weight),
        heading_deg: interpolate_heading(before.heading_deg, after.heading_deg, weight),
        absolute_utc,
        elapsed_ms: target_ms,
    }
}

fn lerp(start: f64, end: f64, weight: f64) -> f64 {
    start + (end - start) * weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::flight::fixtures::entry;
    use crate::telemetry::{LogManager, MetricsRecorder};
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn pose(elapsed_ms: u64, lat: f64, lon: f64, alt: f64, heading: f64, secs: u32) -> PoseEntry {
        PoseEntry {
            elapsed_ms,
            absolute_utc: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, secs).unwrap(),
            latitude: lat,
            longitude: lon,
            altitude_m: alt,
            heading_deg: heading,
            recording: true,
        }
    }

    #[test]
    fn interpolates_midpoint_linearly() {
        let entries = [
            pose(0, 37.5, 127.5, 100.0, 90.0, 0),
            pose(2000, 37.6, 127.6, 120.0, 100.0, 2),
        ];
        let result = interpolate(1000, &entries, &LogManager::new()).unwrap();

        assert_relative_eq!(result.latitude, 37.55, epsilon = 1e-12);
        assert_relative_eq!(result.longitude, 127.55, epsilon = 1e-12);
        assert_relative_eq!(result.altitude_m, 110.0, epsilon = 1e-12);
        assert_relative_eq!(result.heading_deg, 95.0, epsilon = 1e-12);
        assert_eq!(
            result.absolute_utc,
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 1).unwrap()
        );
        assert_eq!(result.elapsed_ms, 1000);
    }

    #[test]
    fn reproduces_weighted_formula_inside_bracket() {
        let entries: Vec<PoseEntry> = (0..10).map(|i| entry(i * 100, i as f64 * 3.0, true)).collect();
        let track = PoseTrack::new(&entries).unwrap();
        let observer = LogManager::new();

        for target in [5u64, 149, 333, 871] {
            let before = &entries[(target / 100) as usize];
            let after = &entries[(target / 100) as usize + 1];
            let weight = (target - before.elapsed_ms) as f64 / 100.0;
            let result = track.interpolate(target, &observer);
            assert_eq!(
                result.latitude,
                before.latitude + (after.latitude - before.latitude) * weight
            );
            assert_eq!(
                result.altitude_m,
                before.altitude_m + (after.altitude_m - before.altitude_m) * weight
            );
        }
    }

    #[test]
    fn exact_match_returns_entry_verbatim() {
        let entries: Vec<PoseEntry> = (0..5).map(|i| entry(i * 250, 45.0, true)).collect();
        let result = interpolate(500, &entries, &LogManager::new()).unwrap();
        assert_eq!(result, DronePose::from(&entries[2]));
    }

    #[test]
    fn heading_takes_shortest_arc() {
        let entries = [
            pose(0, 37.5, 127.5, 100.0, 350.0, 0),
            pose(1000, 37.5, 127.5, 100.0, 10.0, 1),
        ];
        let result = interpolate(500, &entries, &LogManager::new()).unwrap();
        assert_eq!(result.heading_deg, 0.0);
    }

    #[test]
    fn out_of_range_targets_clamp_with_warning() {
        let entries: Vec<PoseEntry> = (1..4).map(|i| entry(i * 1000, 10.0, true)).collect();
        let recorder = MetricsRecorder::new();
        let track = PoseTrack::new(&entries).unwrap();

        assert_eq!(track.interpolate(0, &recorder), DronePose::from(&entries[0]));
        assert_eq!(track.interpolate(9000, &recorder), DronePose::from(&entries[2]));
        assert_eq!(recorder.snapshot().warnings, 2);

        assert_eq!(track.interpolate(3000, &recorder), DronePose::from(&entries[2]));
        assert_eq!(track.interpolate(1000, &recorder), DronePose::from(&entries[0]));
        assert_eq!(recorder.snapshot().warnings, 4);

        track.interpolate(2000, &recorder);
        assert_eq!(recorder.snapshot().warnings, 4);
    }

    #[test]
    fn repeated_first_timestamp_clamps_to_first_row() {
        let mut duplicate = entry(0, 0.0, true);
        duplicate.latitude = 99.0;
        let entries = vec![entry(0, 0.0, true), duplicate, entry(1000, 0.0, true)];
        let recorder = MetricsRecorder::new();

        let result = interpolate(0, &entries, &recorder).unwrap();
        assert_eq!(result, DronePose::from(&entries[0]));
        assert_eq!(recorder.snapshot().warnings, 1);
    }

    #[test]
    fn duplicate_timestamps_resolve_deterministically() {
        let mut entries: Vec<PoseEntry> = vec![entry(0, 0.0, true), entry(1000, 0.0, true)];
        let mut duplicate = entry(1000, 0.0, true);
        duplicate.latitude = 99.0;
        entries.push(duplicate);
        entries.push(entry(2000, 0.0, true));

        let track = PoseTrack::new(&entries).unwrap();
        let observer = LogManager::new();
        assert_eq!(track.interpolate(1000, &observer).latitude, 99.0);
        let after_dup = track.interpolate(1500, &observer);
        assert_relative_eq!(
            after_dup.latitude,
            (99.0 + entries[3].latitude) / 2.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn empty_or_unsorted_sequences_are_invalid() {
        let observer = LogManager::new();
        assert!(matches!(
            interpolate(0, &[], &observer),
            Err(GeoError::InvalidInput(_))
        ));

        let unsorted = [entry(1000, 0.0, true), entry(500, 0.0, true)];
        assert!(matches!(
            interpolate(700, &unsorted, &observer),
            Err(GeoError::InvalidInput(_))
        ));
    }
}
