//! Parameter inspection and config initialization

use clap::{Args, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::{config::CliConfig, error::{CliError, CliResult}};

/// Show or initialize neuron parameters
#[derive(Args, Debug)]
pub struct ParamsCommand {
    #[command(subcommand)]
    pub sub: ParamsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ParamsSubcommand {
    /// Print the effective neuron parameters as TOML
    Show {
        /// Neuron parameter file (.toml), overrides the config
        #[arg(short, long)]
        params: Option<PathBuf>,
    },
    /// Write a default configuration file
    Init {
        /// Destination (defaults to --config, then the user config directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl ParamsCommand {
    pub async fn execute(self, config: &CliConfig, config_path: Option<PathBuf>) -> CliResult<()> {
        match self.sub {
            ParamsSubcommand::Show { params } => {
                let params = config.neuron_params(params.as_deref())?;
                print!("{}", toml::to_string_pretty(&params)?);
                Ok(())
            }
            ParamsSubcommand::Init { output, force } => {
                let path = match output.or(config_path) {
                    Some(path) => path,
                    None => CliConfig::default_config_path()?,
                };
                if path.exists() && !force {
                    return Err(CliError::invalid_args(format!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    )));
                }
                CliConfig::default().save_to_file(&path)?;
                info!("Wrote default configuration to {}", path.display());
                Ok(())
            }
        }
    }
}
