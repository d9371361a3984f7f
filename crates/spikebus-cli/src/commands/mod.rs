//! CLI command implementations for spikebus

use clap::{Parser, Subcommand};

use crate::{config::CliConfig, error::CliResult};

pub mod params;
pub mod run;
pub mod verify;

/// spikebus - cycle-accurate LIF neuron model and contract runner
#[derive(Parser, Debug)]
#[command(
    name = "spikebus",
    version,
    about = "Cycle-accurate LIF neuron model and contract runner",
    long_about = "spikebus simulates a bus-attached leaky integrate-and-fire neuron \
                  edge by edge. Drive it with stimulus scenarios, export traces, and \
                  check a parameter set against the firing, decay, refractory and \
                  reset contracts."
)]
pub struct SpikebusCli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive the neuron with a stimulus scenario
    Run(run::RunCommand),

    /// Check a parameter set against the verification contracts
    #[command(alias = "check")]
    Verify(verify::VerifyCommand),

    /// Show or initialize neuron parameters
    Params(params::ParamsCommand),
}

impl SpikebusCli {
    /// Execute the CLI command
    pub async fn execute(self) -> CliResult<()> {
        let config = CliConfig::load(self.config.as_deref())?;

        match self.command {
            Commands::Run(cmd) => cmd.execute(&config).await,
            Commands::Verify(cmd) => cmd.execute(&config).await,
            Commands::Params(cmd) => cmd.execute(&config, self.config).await,
        }
    }
}
