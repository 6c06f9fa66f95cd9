use anyhow::Context;
use chrono::{DateTime, Duration, TimeZone, Utc};
use georefcore::model::FlightMetadata;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for generating a synthetic flight and its tracker output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub segments: usize,
    pub entries_per_segment: usize,
    pub gap_entries: usize,
    pub sample_interval_ms: u64,
    pub fps: f64,
    pub objects: usize,
    pub image_width: u32,
    pub image_height: u32,
    pub origin_latitude: f64,
    pub origin_longitude: f64,
    pub altitude_ft: f64,
    pub heading_deg: f64,
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            segments: 2,
            entries_per_segment: 30,
            gap_entries: 5,
            sample_interval_ms: 100,
            fps: 30.0,
            objects: 3,
            image_width: 2688,
            image_height: 1512,
            origin_latitude: 37.5665,
            origin_longitude: 126.978,
            altitude_ft: 330.0,
            heading_deg: 340.0,
            seed: 0,
        }
    }
}

impl ScenarioConfig {
    fn normalized_segments(&self) -> usize {
        self.segments.max(1)
    }

    fn normalized_entries(&self) -> usize {
        self.entries_per_segment.max(2)
    }

    fn segment_duration_ms(&self) -> u64 {
        (self.normalized_entries() as u64 - 1) * self.sample_interval_ms.max(1)
    }

    /// Frames that fit inside one segment's recording window.
    pub fn frames_per_segment(&self) -> u64 {
        (self.segment_duration_ms() as f64 / 1000.0 * self.fps).floor() as u64 + 1
    }
}

/// Files written for a generated scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub log: PathBuf,
    pub trackings: Vec<PathBuf>,
    pub metadata: FlightMetadata,
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 19, 5, 27, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn build_log_rows(config: &ScenarioConfig, rng: &mut StdRng) -> Vec<[String; 7]> {
    let interval = config.sample_interval_ms.max(1);
    let entries = config.normalized_entries();
    let period = entries + config.gap_entries;
    let total = config.gap_entries + config.normalized_segments() * period;
    let start = base_time();

    (0..total)
        .map(|index| {
            let elapsed = index as u64 * interval;
            let recording = index >= config.gap_entries
                && (index - config.gap_entries) % period < entries;
            let timestamp = start + Duration::milliseconds(elapsed as i64);
            let drift = index as f64 * 2e-6;
            let heading = (config.heading_deg + index as f64 * 1.5) % 360.0;

            [
                (1_000 + elapsed).to_string(),
                timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
                format!("{:.7}", config.origin_latitude + drift + rng.gen_range(-5e-7..5e-7)),
                format!("{:.7}", config.origin_longitude + drift + rng.gen_range(-5e-7..5e-7)),
                format!("{:.1}", config.altitude_ft + rng.gen_range(-2.0..2.0)),
                format!("{:.1}", heading),
                if recording { "1" } else { "0" }.to_string(),
            ]
        })
        .collect()
}

fn build_tracking(config: &ScenarioConfig, segment: usize, rng: &mut StdRng) -> serde_json::Value {
    let width = f64::from(config.image_width);
    let height = f64::from(config.image_height);
    let frames = config.frames_per_segment();

    let starts: Vec<(f64, f64)> = (0..config.objects)
        .map(|_| {
            (
                rng.gen_range(0.2..0.8) * width,
                rng.gen_range(0.2..0.8) * height,
            )
        })
        .collect();

    let results: Vec<serde_json::Value> = (0..frames)
        .map(|frame| {
            let res: Vec<serde_json::Value> = starts
                .iter()
                .enumerate()
                .map(|(object, &(x, y))| {
                    let cx = x + frame as f64 * 1.5;
                    let cy = y - frame as f64 * 0.8;
                    let half = 40.0 + object as f64 * 10.0;
                    json!({
                        "tid": object + 1,
                        "cid": object % 2,
                        "conf": rng.gen_range(0.5..0.99),
                        "bbox": [
                            (cx - half).max(0.0),
                            (cy - half).max(0.0),
                            (cx + half).min(width),
                            (cy + half).min(height),
                        ],
                    })
                })
                .collect();
            json!({ "i": frame, "res": res })
        })
        .collect();

    json!({
        "model": { "name": "synthetic", "confidence_threshold": 0.25, "nms": true },
        "tracker": { "name": "bytetrack" },
        "video": {
            "name": format!("SYNTH_{:04}", segment + 1),
            "width": config.image_width,
            "height": config.image_height,
            "fps": config.fps,
            "total_frames": frames,
        },
        "tracking_results": results,
    })
}

/// Writes a flight log CSV and one tracking JSON per recording segment into `dir`.
pub fn write_scenario(config: &ScenarioConfig, dir: &Path) -> anyhow::Result<Scenario> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let log = dir.join("flight.csv");
    let mut writer = csv::Writer::from_path(&log)
        .with_context(|| format!("creating synthetic log {}", log.display()))?;
    writer.write_record([
        "time(millisecond)",
        "datetime(utc)",
        "latitude",
        "longitude",
        "ascent(feet)",
        "compass_heading(degrees)",
        "isVideo",
    ])?;
    for row in build_log_rows(config, &mut rng) {
        writer.write_record(&row)?;
    }
    writer.flush().context("flushing synthetic log")?;

    let mut trackings = Vec::with_capacity(config.normalized_segments());
    for segment in 0..config.normalized_segments() {
        let document = build_tracking(config, segment, &mut rng);
        let path = dir.join(format!("tracking_{:02}.json", segment + 1));
        let body = serde_json::to_string_pretty(&document).context("encoding synthetic tracking")?;
        fs::write(&path, body)
            .with_context(|| format!("writing synthetic tracking {}", path.display()))?;
        trackings.push(path);
    }

    Ok(Scenario {
        log,
        trackings,
        metadata: FlightMetadata {
            name: format!("synthetic-{}", config.seed),
            date: base_time().date_naive(),
            description: Some("generated scenario".into()),
        },
    })
}
