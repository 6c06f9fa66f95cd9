use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use georefcore::model::ProcessingResult;
use georefcore::processing::Correlator;
use georefcore::telemetry::{Metrics, MetricsRecorder};
use std::fs;
use std::path::Path;

pub struct WorkflowResult {
    pub result: ProcessingResult,
    pub metrics: Metrics,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let recorder = MetricsRecorder::new();
        let correlator = Correlator::new(
            self.config.provider.provider(),
            self.config.to_correlator_config(),
            &recorder,
        )
        .context("initializing correlator")?;

        let result = correlator
            .correlate(
                self.config.flight.clone(),
                &self.config.log,
                &self.config.trackings,
            )
            .with_context(|| format!("correlating flight {}", self.config.flight.name))?;

        Ok(WorkflowResult {
            result,
            metrics: recorder.snapshot(),
        })
    }

    /// Writes the result as pretty-printed JSON to the configured output path.
    pub fn write_result(&self, result: &ProcessingResult) -> anyhow::Result<()> {
        write_json(&self.config.output, result)
    }
}

fn write_json(path: &Path, result: &ProcessingResult) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }
    let body = serde_json::to_string_pretty(result).context("encoding processing result")?;
    fs::write(path, body).with_context(|| format!("writing result {}", path.display()))
}
