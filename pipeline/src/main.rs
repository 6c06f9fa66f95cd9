use anyhow::Context;
use clap::Parser;
use generator::scenario::{write_scenario, ScenarioConfig};
use std::path::PathBuf;
use tempfile::TempDir;
use workflow::config::{Overrides, WorkflowConfig};
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Georeferences tracked objects from drone video against the flight log")]
struct Args {
    /// Load a workflow config from YAML; flags below override its values
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Flight name recorded in the result
    #[arg(long)]
    name: Option<String>,
    /// Flight date as YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Airdata flight log CSV
    #[arg(long)]
    log: Option<PathBuf>,
    /// Tracking JSON files, one per recording segment, in recording order
    #[arg(long, value_delimiter = ',')]
    trackings: Vec<PathBuf>,
    /// Horizontal field of view in degrees
    #[arg(long)]
    hfov: Option<f64>,
    /// Vertical field of view in degrees
    #[arg(long)]
    vfov: Option<f64>,
    /// Skip per-object corner footprints in the output
    #[arg(long, default_value_t = false)]
    no_footprints: bool,
    /// Where to write the result JSON
    #[arg(long)]
    output: Option<PathBuf>,
    /// Generate a synthetic flight and process it
    #[arg(long, default_value_t = false)]
    demo: bool,
    /// Seed for the synthetic flight
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            name: self.name.clone(),
            date: self.date.clone(),
            description: self.description.clone(),
            log: self.log.clone(),
            trackings: self.trackings.clone(),
            horizontal_fov_deg: self.hfov,
            vertical_fov_deg: self.vfov,
            no_footprints: self.no_footprints,
            output: self.output.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let overrides = args.overrides();

    // the demo directory must outlive the run
    let (workflow_config, _demo_dir) = if args.demo {
        let dir = TempDir::new().context("creating demo directory")?;
        let scenario = write_scenario(
            &ScenarioConfig {
                seed: args.seed,
                ..Default::default()
            },
            dir.path(),
        )?;
        log::info!("Generated demo flight in {}", dir.path().display());

        let demo = Overrides {
            name: Some(scenario.metadata.name.clone()),
            date: Some(scenario.metadata.date.format("%Y-%m-%d").to_string()),
            description: scenario.metadata.description.clone(),
            log: Some(scenario.log),
            trackings: scenario.trackings,
            ..Default::default()
        };
        let config = WorkflowConfig::from_args(&demo)?.apply(&overrides)?;
        (config, Some(dir))
    } else if let Some(path) = &args.workflow {
        (WorkflowConfig::load(path)?.apply(&overrides)?, None)
    } else {
        (WorkflowConfig::from_args(&overrides)?, None)
    };

    let runner = Runner::new(workflow_config);
    let outcome = runner.execute()?;
    runner.write_result(&outcome.result)?;

    println!(
        "{} -> segments {}, frames {}, objects {}, warnings {}, written to {}",
        outcome.result.metadata.name,
        outcome.result.segments.len(),
        outcome.metrics.frames,
        outcome.metrics.objects,
        outcome.metrics.warnings,
        runner.config().output.display()
    );

    Ok(())
}
