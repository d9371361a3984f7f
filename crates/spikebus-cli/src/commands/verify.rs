//! Contract suite runner
//!
//! Each selected contract runs against its own freshly reset core on a
//! blocking task; outcomes are collected, printed in suite order and
//! optionally written as JSON. Any failure makes the command exit non-zero.

use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tokio::task::JoinSet;
use tracing::info;

use spikebus_core::{Contract, SuiteReport};

use crate::{config::CliConfig, error::{CliError, CliResult}};

/// Check a parameter set against the verification contracts
#[derive(Args, Debug)]
pub struct VerifyCommand {
    /// Neuron parameter file (.toml), overrides the config
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    /// Only run these contracts (repeatable)
    #[arg(long = "contract", value_enum)]
    pub contracts: Vec<ContractArg>,

    /// Write the suite report as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContractArg {
    PeriodicFiring,
    MembraneDecay,
    RefractoryPeriod,
    ResetBehavior,
}

impl From<ContractArg> for Contract {
    fn from(arg: ContractArg) -> Self {
        match arg {
            ContractArg::PeriodicFiring => Contract::PeriodicFiring,
            ContractArg::MembraneDecay => Contract::MembraneDecay,
            ContractArg::RefractoryPeriod => Contract::RefractoryPeriod,
            ContractArg::ResetBehavior => Contract::ResetBehavior,
        }
    }
}

impl VerifyCommand {
    fn selected(&self) -> Vec<Contract> {
        if self.contracts.is_empty() {
            Contract::ALL.to_vec()
        } else {
            let mut selected: Vec<Contract> = Vec::new();
            for c in self.contracts.iter().copied().map(Contract::from) {
                if !selected.contains(&c) {
                    selected.push(c);
                }
            }
            selected
        }
    }

    pub async fn execute(self, config: &CliConfig) -> CliResult<()> {
        let params = config.neuron_params(self.params.as_deref())?;
        params.validate()?;

        let contracts = self.selected();
        info!("Verifying {} contracts", contracts.len());

        let mut tasks = JoinSet::new();
        for contract in contracts {
            let params = params.clone();
            tasks.spawn_blocking(move || contract.evaluate(&params));
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|e| CliError::Generic(anyhow::anyhow!(e)))??;
            outcomes.push(outcome);
        }
        let report = SuiteReport::from_outcomes(outcomes);

        for outcome in &report.outcomes {
            let status = if outcome.passed { "PASSED" } else { "FAILED" };
            println!("{:<18} {}  {}", outcome.contract.name(), status, outcome.message);
        }

        if let Some(path) = &self.json {
            std::fs::write(path, config.to_json(&report)?)?;
            info!("Report written to {}", path.display());
        }

        let total = report.outcomes.len();
        let failed = report.failures().len();
        if failed > 0 {
            return Err(CliError::ContractsFailed { failed, total });
        }
        println!("{}/{} contracts passed", total, total);
        Ok(())
    }
}
