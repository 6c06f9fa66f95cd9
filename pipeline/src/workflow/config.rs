use anyhow::{bail, Context};
use chrono::NaiveDate;
use georefcore::model::FlightMetadata;
use georefcore::processing::ProviderKind;
use georefcore::{CameraParams, CorrelatorConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_HORIZONTAL_FOV_DEG: f64 = 84.0;
pub const DEFAULT_VERTICAL_FOV_DEG: f64 = 62.0;

/// Everything needed to georeference one flight.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub flight: FlightMetadata,
    pub log: PathBuf,
    /// Tracking files in recording order; entry `i` belongs to segment `i` of the log.
    pub trackings: Vec<PathBuf>,
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_camera")]
    pub camera: CameraParams,
    #[serde(default = "default_footprints")]
    pub footprints: bool,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_camera() -> CameraParams {
    CameraParams {
        horizontal_fov_deg: DEFAULT_HORIZONTAL_FOV_DEG,
        vertical_fov_deg: DEFAULT_VERTICAL_FOV_DEG,
    }
}

fn default_footprints() -> bool {
    true
}

fn default_output() -> PathBuf {
    PathBuf::from("result.json")
}

/// Values supplied on the command line; anything set here wins over the YAML file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub name: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub log: Option<PathBuf>,
    pub trackings: Vec<PathBuf>,
    pub horizontal_fov_deg: Option<f64>,
    pub vertical_fov_deg: Option<f64>,
    pub no_footprints: bool,
    pub output: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Builds a config purely from command-line values.
    pub fn from_args(overrides: &Overrides) -> anyhow::Result<Self> {
        let (Some(name), Some(date), Some(log)) = (
            overrides.name.clone(),
            overrides.date.as_deref(),
            overrides.log.clone(),
        ) else {
            bail!("--name, --date and --log are required without --workflow");
        };
        if overrides.trackings.is_empty() {
            bail!("at least one --trackings path is required without --workflow");
        }

        let config = Self {
            flight: FlightMetadata {
                name,
                date: parse_date(date)?,
                description: None,
            },
            log,
            trackings: Vec::new(),
            provider: ProviderKind::default(),
            camera: default_camera(),
            footprints: default_footprints(),
            output: default_output(),
        };
        config.apply(overrides)
    }

    pub fn apply(mut self, overrides: &Overrides) -> anyhow::Result<Self> {
        if let Some(name) = &overrides.name {
            self.flight.name = name.clone();
        }
        if let Some(date) = &overrides.date {
            self.flight.date = parse_date(date)?;
        }
        if let Some(description) = &overrides.description {
            self.flight.description = Some(description.clone());
        }
        if let Some(log) = &overrides.log {
            self.log = log.clone();
        }
        if !overrides.trackings.is_empty() {
            self.trackings = overrides.trackings.clone();
        }
        if let Some(fov) = overrides.horizontal_fov_deg {
            self.camera.horizontal_fov_deg = fov;
        }
        if let Some(fov) = overrides.vertical_fov_deg {
            self.camera.vertical_fov_deg = fov;
        }
        if overrides.no_footprints {
            self.footprints = false;
        }
        if let Some(output) = &overrides.output {
            self.output = output.clone();
        }
        Ok(self)
    }

    pub fn to_correlator_config(&self) -> CorrelatorConfig {
        CorrelatorConfig {
            camera: self.camera,
            footprints: self.footprints,
        }
    }
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("flight date '{}' must be YYYY-MM-DD", raw))
}
