use crate::model::{
    DetectionRecord, DronePose, FlightLog, FlightMetadata, ProcessedFrame, ProcessedSegment,
    ProcessingResult, ProjectedObject, TrackingData, TrackingFrame, VideoSegment,
};
use crate::prelude::{CorrelatorConfig, FlightDataProvider, GeoError, GeoResult, Observer};
use crate::processing::interpolator::PoseTrack;
use crate::processing::projector::GeoProjector;
use rayon::prelude::*;
use std::path::Path;

/// Pairs recording segments with tracking files and georeferences every detection.
pub struct Correlator<'a, P: FlightDataProvider> {
    provider: P,
    config: CorrelatorConfig,
    projector: GeoProjector,
    observer: &'a dyn Observer,
}

impl<'a, P: FlightDataProvider> Correlator<'a, P> {
    pub fn new(provider: P, config: CorrelatorConfig, observer: &'a dyn Observer) -> GeoResult<Self> {
        let projector = GeoProjector::new(config.camera)?;
        Ok(Self {
            provider,
            config,
            projector,
            observer,
        })
    }

    /// Processes a whole flight. Segment `i` of the log is paired with `tracking_paths[i]`.
    ///
    /// The result is all-or-nothing: any failure aborts the run.
    pub fn correlate<Q>(
        &self,
        metadata: FlightMetadata,
        log_path: &Path,
        tracking_paths: &[Q],
    ) -> GeoResult<ProcessingResult>
    where
        Q: AsRef<Path> + Sync,
    {
        self.observer.info(&format!("Processing flight {}", metadata.name));
        let flight = self.provider.parse_flight_log(log_path, self.observer)?;

        if flight.segments.len() != tracking_paths.len() {
            return Err(GeoError::SegmentCountMismatch {
                segments: flight.segments.len(),
                trackings: tracking_paths.len(),
            });
        }
        let track = PoseTrack::new(&flight.entries)?;

        let segments = tracking_paths
            .par_iter()
            .enumerate()
            .map(|(index, path)| {
                let tracking = self
                    .provider
                    .parse_tracking_data(path.as_ref(), self.observer)?;
                self.correlate_segment(&flight, &track, index, &tracking)
            })
            .collect::<GeoResult<Vec<_>>>()?;

        let result = ProcessingResult {
            metadata,
            flight: flight.summary.clone(),
            camera: self.config.camera,
            segments,
        };
        self.observer.info(&format!(
            "Processed {} segments, {} frames, {} objects",
            result.segments.len(),
            result.frame_count(),
            result.object_count()
        ));
        Ok(result)
    }

    /// Georeferences one segment on its own, for callers that want partial results.
    pub fn process_segment(
        &self,
        flight: &FlightLog,
        segment_index: usize,
        tracking: &TrackingData,
    ) -> GeoResult<ProcessedSegment> {
        let track = PoseTrack::new(&flight.entries)?;
        self.correlate_segment(flight, &track, segment_index, tracking)
    }

    fn correlate_segment(
        &self,
        flight: &FlightLog,
        track: &PoseTrack<'_>,
        segment_index: usize,
        tracking: &TrackingData,
    ) -> GeoResult<ProcessedSegment> {
        let segment = flight.segments.get(segment_index).ok_or_else(|| {
            GeoError::InvalidInput(format!(
                "segment {} requested but the log has {}",
                segment_index,
                flight.segments.len()
            ))
        })?;

        let frames: Vec<ProcessedFrame> = tracking
            .frames
            .par_iter()
            .map(|frame| self.process_frame(flight, track, segment_index, segment, tracking, frame))
            .collect();

        self.observer.debug(&format!(
            "Segment {} ({}ms - {}ms) matched {} frames from {}",
            segment_index,
            segment.start_elapsed_ms,
            segment.end_elapsed_ms,
            frames.len(),
            tracking.video.name
        ));

        Ok(ProcessedSegment::new(
            segment,
            tracking.video.clone(),
            tracking.detector.clone(),
            frames,
        ))
    }

    fn process_frame(
        &self,
        flight: &FlightLog,
        track: &PoseTrack<'_>,
        segment_index: usize,
        segment: &VideoSegment,
        tracking: &TrackingData,
        frame: &TrackingFrame,
    ) -> ProcessedFrame {
        let elapsed_ms = self.provider.map_frame_to_time(
            frame.frame_index,
            tracking.video.fps,
            segment.start_elapsed_ms,
        );

        if !segment.contains(elapsed_ms) {
            let location = match flight.segment_at(elapsed_ms) {
                Some((other, _)) => format!("inside segment {}", other),
                None => "outside every recording segment".to_string(),
            };
            self.observer.warn(&format!(
                "Frame {} of {} maps to {}ms, beyond segment {} ({}ms - {}ms) and {}",
                frame.frame_index,
                tracking.video.name,
                elapsed_ms,
                segment_index,
                segment.start_elapsed_ms,
                segment.end_elapsed_ms,
                location
            ));
        }

        let pose = track.interpolate(elapsed_ms, self.observer);
        let objects: Vec<ProjectedObject> = frame
            .detections
            .iter()
            .map(|detection| self.project_detection(detection, &pose))
            .collect();
        self.observer.record_frame(objects.len());

        ProcessedFrame {
            frame_index: frame.frame_index,
            elapsed_ms,
            absolute_utc: pose.absolute_utc,
            drone_pose: pose,
            objects,
        }
    }

    fn project_detection(&self, detection: &DetectionRecord, pose: &DronePose) -> ProjectedObject {
        let projection = self.projector.project(&detection.bbox, pose);
        ProjectedObject {
            track_id: detection.track_id,
            class_id: detection.class_id,
            confidence: detection.confidence,
            bbox: detection.bbox,
            ground_position: projection.center,
            extent: projection.extent,
            footprint: self.config.footprints.then_some(projection.footprint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::flight::fixtures::entry;
    use crate::model::{BoundingBox, FlightSummary, PoseEntry, VideoMetadata};
    use crate::prelude::CameraParams;
    use crate::processing::flight_log::extract_segments;
    use crate::processing::provider::AirdataProvider;
    use crate::telemetry::MetricsRecorder;
    use chrono::NaiveDate;

    fn flight(flags: &[bool]) -> FlightLog {
        let entries: Vec<PoseEntry> = flags
            .iter()
            .enumerate()
            .map(|(i, &recording)| entry(i as u64 * 1000, 0.0, recording))
            .collect();
        let segments = extract_segments(&entries);
        FlightLog {
            summary: FlightSummary {
                start_utc: entries[0].absolute_utc,
                end_utc: entries[entries.len() - 1].absolute_utc,
                total_duration_ms: entries[entries.len() - 1].elapsed_ms,
            },
            entries,
            segments,
        }
    }

    fn tracking(frame_indices: &[u64], fps: f64) -> TrackingData {
        TrackingData {
            video: VideoMetadata::new("clip".into(), 1920, 1080, fps, 100),
            detector: None,
            frames: frame_indices
                .iter()
                .map(|&i| TrackingFrame {
                    frame_index: i,
                    detections: vec![DetectionRecord {
                        track_id: i as i64 + 10,
                        class_id: 3,
                        confidence: 0.8,
                        bbox: BoundingBox {
                            x: 0.5,
                            y: 0.5,
                            width: 0.05,
                            height: 0.05,
                        },
                    }],
                })
                .collect(),
        }
    }

    fn config(footprints: bool) -> CorrelatorConfig {
        CorrelatorConfig {
            camera: CameraParams::new(84.0, 62.0).unwrap(),
            footprints,
        }
    }

    #[test]
    fn frames_map_to_absolute_elapsed_time() {
        let recorder = MetricsRecorder::new();
        let correlator = Correlator::new(AirdataProvider, config(true), &recorder).unwrap();
        let log = flight(&[false, true, true, true, false]);

        let segment = correlator
            .process_segment(&log, 0, &tracking(&[0, 15, 30], 10.0))
            .unwrap();

        let times: Vec<u64> = segment.frames.iter().map(|f| f.elapsed_ms).collect();
        assert_eq!(times, vec![1000, 2500, 4000]);
        assert_eq!(segment.start_elapsed_ms, 1000);
        assert_eq!(segment.end_elapsed_ms, 3000);
        assert_eq!(segment.frames[1].drone_pose.elapsed_ms, 2500);

        // frame 30 lands at 4000ms: past the segment end and on the last log entry
        assert_eq!(recorder.snapshot().warnings, 2);
        assert_eq!(recorder.snapshot().frames, 3);
    }

    #[test]
    fn detections_keep_identity_and_land_under_drone() {
        let recorder = MetricsRecorder::new();
        let correlator = Correlator::new(AirdataProvider, config(false), &recorder).unwrap();
        let log = flight(&[true, true, true]);

        let segment = correlator
            .process_segment(&log, 0, &tracking(&[0, 10], 10.0))
            .unwrap();
        let frame = &segment.frames[1];
        let object = &frame.objects[0];

        assert_eq!(object.track_id, 20);
        assert_eq!(object.class_id, 3);
        assert_eq!(object.confidence, 0.8);
        assert_eq!(object.ground_position.latitude, frame.drone_pose.latitude);
        assert_eq!(object.ground_position.longitude, frame.drone_pose.longitude);
        assert!(object.footprint.is_none());
        assert_eq!(frame.absolute_utc, frame.drone_pose.absolute_utc);
    }

    #[test]
    fn unknown_segment_index_is_invalid() {
        let recorder = MetricsRecorder::new();
        let correlator = Correlator::new(AirdataProvider, config(true), &recorder).unwrap();
        let log = flight(&[true, false]);
        let err = correlator
            .process_segment(&log, 1, &tracking(&[0], 30.0))
            .unwrap_err();
        assert!(matches!(err, GeoError::InvalidInput(_)));
    }

    #[test]
    fn invalid_camera_rejects_construction() {
        let recorder = MetricsRecorder::new();
        let bad = CorrelatorConfig {
            camera: CameraParams {
                horizontal_fov_deg: 0.0,
                vertical_fov_deg: 62.0,
            },
            footprints: true,
        };
        assert!(matches!(
            Correlator::new(AirdataProvider, bad, &recorder),
            Err(GeoError::InvalidCameraParams(_))
        ));
    }

    #[test]
    fn missing_log_fails_with_io_error() {
        let metadata = FlightMetadata {
            name: "survey".into(),
            date: NaiveDate::from_ymd_opt(2024, 11, 19).unwrap(),
            description: None,
        };
        let recorder = MetricsRecorder::new();
        let correlator = Correlator::new(AirdataProvider, config(true), &recorder).unwrap();
        let err = correlator
            .correlate(metadata, Path::new("/nonexistent/log.csv"), &["a.json"])
            .unwrap_err();
        assert!(matches!(err, GeoError::Io { .. }));
    }
}
