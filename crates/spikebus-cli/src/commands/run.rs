//! Scenario runner
//!
//! Loads a TOML scenario, drives it through a fresh testbench and prints a
//! summary. With `--output` the full per-edge trace is written as JSON.
//!
//! Example:
//!   spikebus run scenarios/charge_idle.toml --output trace.json

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use spikebus_core::{NeuronCore, NeuronParams, Scenario, Testbench, Trace, TraceSummary};

use crate::{config::CliConfig, error::{CliError, CliResult}};

/// Drive the neuron with a stimulus scenario
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Scenario file (.toml)
    pub scenario: PathBuf,

    /// Neuron parameter file (.toml), overrides the config
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    /// Output trace file (.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not log individual spikes
    #[arg(short, long)]
    pub quiet: bool,
}

/// JSON document written by `run --output`
#[derive(Debug, Serialize)]
pub struct TraceExport<'a> {
    pub scenario: &'a str,
    pub params: &'a NeuronParams,
    pub summary: TraceSummary,
    pub trace: &'a Trace,
}

impl RunCommand {
    pub async fn execute(self, config: &CliConfig) -> CliResult<()> {
        let scenario = load_scenario(&self.scenario)?;
        let params = config.neuron_params(self.params.as_deref())?;

        info!(
            "Running scenario '{}' ({} segments, {} cycles)",
            scenario.name,
            scenario.segments.len(),
            scenario.total_cycles()
        );
        debug!("Neuron params: {:?}", params);

        let mut tb = Testbench::new(NeuronCore::new(params.clone())?);
        let trace = scenario.drive(&mut tb)?;

        if config.output.log_spikes && !self.quiet {
            for (n, sample) in trace.samples.iter().filter(|s| s.spike).enumerate() {
                info!("Cycle {:4}: SPIKE #{} | ui_in={:#04x}", sample.cycle, n + 1, sample.ui_in);
            }
        }

        let summary = trace.summary();
        println!("scenario:      {}", scenario.name);
        println!("cycles:        {}", summary.cycles);
        println!("spikes:        {}", summary.spike_count);
        match summary.min_spike_gap {
            Some(gap) => println!("min spike gap: {}", gap),
            None => println!("min spike gap: -"),
        }
        println!("peak v_mem:    {}", summary.peak_v_mem);
        println!("final v_mem:   {}", summary.final_v_mem);

        if let Some(path) = &self.output {
            let export = TraceExport {
                scenario: &scenario.name,
                params: &params,
                summary,
                trace: &trace,
            };
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, config.to_json(&export)?)?;
            info!("Trace written to {}", path.display());
        }

        Ok(())
    }
}

/// Load and validate a scenario file
pub fn load_scenario(path: &std::path::Path) -> CliResult<Scenario> {
    let text = std::fs::read_to_string(path)?;
    let scenario: Scenario = toml::from_str(&text)
        .map_err(|e| CliError::config(format!("Invalid scenario {}: {}", path.display(), e)))?;
    scenario.validate()?;
    Ok(scenario)
}
