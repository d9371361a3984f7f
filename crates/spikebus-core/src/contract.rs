//! Verification contracts for the neuron block
//!
//! Each check resets the device through the standard reset sequence,
//! drives a fixed stimulus and inspects the decoded outputs. The checks are
//! generic over [`Dut`] so the same contract can be applied to the
//! behavioural core or to any other model of the block.

use std::fmt;

use thiserror::Error;

use crate::{
    error::Result,
    harness::{Dut, Testbench},
    neuron::NeuronCore,
    params::NeuronParams,
    trace::Trace,
};

/// Stimulus for the firing check
pub const FIRING_INPUT: u8 = 0x30;
/// Window in which at least one spike must occur
pub const FIRING_CYCLES: usize = 150;

/// Stimulus used to charge the membrane before the decay check
pub const DECAY_CHARGE_INPUT: u8 = 0x40;
/// Charging edges before the input is removed
pub const DECAY_CHARGE_CYCLES: usize = 25;
/// Idle edges after the input is removed
pub const DECAY_IDLE_CYCLES: usize = 60;
/// Membrane value the idle neuron must fall below
pub const DECAY_BOUND: u16 = 20;

/// Saturating stimulus for the refractory check
pub const REFRACTORY_INPUT: u8 = 0xFF;
/// Window of the refractory check
pub const REFRACTORY_WINDOW: usize = 30;
/// Smallest allowed gap between spike cycles
pub const MIN_SPIKE_GAP: u64 = 4;

/// Stimulus applied before reset is asserted
pub const RESET_CHARGE_INPUT: u8 = 0x50;
/// Charging edges before reset is asserted
pub const RESET_CHARGE_CYCLES: usize = 20;
/// Edges with reset held before the outputs are checked
pub const RESET_SETTLE_EDGES: usize = 2;

/// A contract broken by the device
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// No spike under sustained suprathreshold input
    #[error("Neuron never fired in {cycles} cycles at ui_in={ui_in:#04x}")]
    NeverFired {
        /// Window length
        cycles: usize,
        /// Stimulus word
        ui_in: u8,
    },

    /// Membrane still charged after the input was removed
    #[error("Membrane did not decay: final v_mem={final_v_mem} (expected < {bound})")]
    NoDecay {
        /// Membrane value at the end of the idle window
        final_v_mem: u16,
        /// Required bound
        bound: u16,
    },

    /// Two spikes inside the refractory lockout
    #[error("Spike too soon: gap={gap} at cycles {first} and {second} (expected >= {min_gap})")]
    RefractoryGap {
        /// Observed gap
        gap: u64,
        /// Cycle of the earlier spike
        first: u64,
        /// Cycle of the later spike
        second: u64,
        /// Required gap
        min_gap: u64,
    },

    /// State not cleared while reset is held
    #[error("Reset did not clear state: spike={spike} v_mem={v_mem}")]
    ResetNotCleared {
        /// Observed spike flag
        spike: bool,
        /// Observed membrane value
        v_mem: u16,
    },
}

/// The verification contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Contract {
    /// Sustained input eventually fires
    PeriodicFiring,
    /// Membrane leaks back toward zero
    MembraneDecay,
    /// Spikes are separated by the lockout
    RefractoryPeriod,
    /// Reset clears spike and membrane
    ResetBehavior,
}

impl Contract {
    /// All contracts in suite order
    pub const ALL: [Contract; 4] = [
        Contract::PeriodicFiring,
        Contract::MembraneDecay,
        Contract::RefractoryPeriod,
        Contract::ResetBehavior,
    ];

    /// Short identifier
    pub fn name(&self) -> &'static str {
        match self {
            Contract::PeriodicFiring => "periodic_firing",
            Contract::MembraneDecay => "membrane_decay",
            Contract::RefractoryPeriod => "refractory_period",
            Contract::ResetBehavior => "reset_behavior",
        }
    }

    /// Run this contract against a device
    pub fn check<D: Dut>(&self, dut: D) -> std::result::Result<ContractReport, ContractViolation> {
        match self {
            Contract::PeriodicFiring => check_periodic_firing(dut),
            Contract::MembraneDecay => check_membrane_decay(dut),
            Contract::RefractoryPeriod => check_refractory_period(dut),
            Contract::ResetBehavior => check_reset_behavior(dut),
        }
    }

    /// Run this contract against a fresh core built from `params`
    pub fn evaluate(&self, params: &NeuronParams) -> Result<ContractOutcome> {
        let core = NeuronCore::new(params.clone())?;
        let outcome = ContractOutcome::from_result(*self, self.check(core));
        if outcome.passed {
            log::info!("{} PASSED: {}", self.name(), outcome.message);
        } else {
            log::warn!("{} FAILED: {}", self.name(), outcome.message);
        }
        Ok(outcome)
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Evidence from a passed contract
#[derive(Debug, Clone, PartialEq)]
pub struct ContractReport {
    /// Contract that passed
    pub contract: Contract,
    /// Edges observed after the reset sequence
    pub trace: Trace,
}

impl ContractReport {
    fn new(contract: Contract, trace: Trace) -> Self {
        Self { contract, trace }
    }
}

impl fmt::Display for ContractReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spikes = self.trace.spike_cycles();
        write!(
            f,
            "{} spikes | cycles: {:?} | final v_mem={}",
            spikes.len(),
            spikes,
            self.trace.final_v_mem().unwrap_or(0)
        )
    }
}

/// Pass/fail record of one contract
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContractOutcome {
    /// Contract evaluated
    pub contract: Contract,
    /// Whether it held
    pub passed: bool,
    /// Report or violation text
    pub message: String,
    /// Spike cycles observed (empty on failure)
    pub spike_cycles: Vec<u64>,
}

impl ContractOutcome {
    /// Collapse a check result into an outcome record
    pub fn from_result(
        contract: Contract,
        result: std::result::Result<ContractReport, ContractViolation>,
    ) -> Self {
        match result {
            Ok(report) => Self {
                contract,
                passed: true,
                message: report.to_string(),
                spike_cycles: report.trace.spike_cycles(),
            },
            Err(violation) => Self {
                contract,
                passed: false,
                message: violation.to_string(),
                spike_cycles: Vec::new(),
            },
        }
    }
}

/// Outcomes of the whole suite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuiteReport {
    /// One outcome per contract, in suite order
    pub outcomes: Vec<ContractOutcome>,
}

impl SuiteReport {
    /// Build a report, ordering outcomes as in [`Contract::ALL`]
    pub fn from_outcomes(mut outcomes: Vec<ContractOutcome>) -> Self {
        outcomes.sort_by_key(|o| Contract::ALL.iter().position(|c| *c == o.contract));
        Self { outcomes }
    }

    /// Check if every contract held
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    /// Contracts that failed
    pub fn failures(&self) -> Vec<&ContractOutcome> {
        self.outcomes.iter().filter(|o| !o.passed).collect()
    }
}

/// Run every contract sequentially against fresh cores
pub fn run_suite(params: &NeuronParams) -> Result<SuiteReport> {
    params.validate()?;
    let outcomes = Contract::ALL
        .iter()
        .map(|contract| contract.evaluate(params))
        .collect::<Result<Vec<_>>>()?;
    Ok(SuiteReport::from_outcomes(outcomes))
}

fn record<D: Dut>(tb: &mut Testbench<D>, name: &str, cycles: usize) -> Trace {
    let mut trace = Trace::new(name);
    trace.extend(tb.run(cycles));
    trace
}

/// Sustained `0x30` for 150 cycles must fire at least once
pub fn check_periodic_firing<D: Dut>(
    dut: D,
) -> std::result::Result<ContractReport, ContractViolation> {
    let mut tb = Testbench::new(dut);
    tb.reset_sequence();
    tb.set_input(FIRING_INPUT);

    let trace = record(&mut tb, Contract::PeriodicFiring.name(), FIRING_CYCLES);
    for (n, sample) in trace.samples.iter().filter(|s| s.spike).enumerate() {
        log::debug!(
            "cycle {:4}: spike #{} | v_mem={:#06x}",
            sample.cycle,
            n + 1,
            sample.v_mem
        );
    }

    if trace.spike_count() == 0 {
        return Err(ContractViolation::NeverFired {
            cycles: FIRING_CYCLES,
            ui_in: FIRING_INPUT,
        });
    }
    Ok(ContractReport::new(Contract::PeriodicFiring, trace))
}

/// Charge at `0x40` for 25 cycles, then idle for 60: membrane must end below 20
pub fn check_membrane_decay<D: Dut>(
    dut: D,
) -> std::result::Result<ContractReport, ContractViolation> {
    let mut tb = Testbench::new(dut);
    tb.reset_sequence();
    tb.set_input(DECAY_CHARGE_INPUT);
    let mut trace = record(&mut tb, Contract::MembraneDecay.name(), DECAY_CHARGE_CYCLES);

    tb.set_input(0);
    for _ in 0..DECAY_IDLE_CYCLES {
        let sample = tb.rising_edge();
        log::trace!("decay cycle {:3}: v_mem={}", sample.cycle, sample.v_mem);
        trace.push(sample);
    }

    let final_v_mem = trace.final_v_mem().unwrap_or(0);
    if final_v_mem >= DECAY_BOUND {
        return Err(ContractViolation::NoDecay {
            final_v_mem,
            bound: DECAY_BOUND,
        });
    }
    Ok(ContractReport::new(Contract::MembraneDecay, trace))
}

/// Saturated input for 30 cycles: consecutive spikes at least 4 cycles apart
pub fn check_refractory_period<D: Dut>(
    dut: D,
) -> std::result::Result<ContractReport, ContractViolation> {
    let mut tb = Testbench::new(dut);
    tb.reset_sequence();
    tb.set_input(REFRACTORY_INPUT);

    let trace = record(&mut tb, Contract::RefractoryPeriod.name(), REFRACTORY_WINDOW);
    let spikes = trace.spike_cycles();
    if let Some(w) = spikes.windows(2).find(|w| w[1] - w[0] < MIN_SPIKE_GAP) {
        return Err(ContractViolation::RefractoryGap {
            gap: w[1] - w[0],
            first: w[0],
            second: w[1],
            min_gap: MIN_SPIKE_GAP,
        });
    }
    Ok(ContractReport::new(Contract::RefractoryPeriod, trace))
}

/// Charge at `0x50`, then hold reset for two edges: spike and membrane read zero
pub fn check_reset_behavior<D: Dut>(
    dut: D,
) -> std::result::Result<ContractReport, ContractViolation> {
    let mut tb = Testbench::new(dut);
    tb.reset_sequence();
    tb.set_input(RESET_CHARGE_INPUT);
    let mut trace = record(&mut tb, Contract::ResetBehavior.name(), RESET_CHARGE_CYCLES);

    tb.set_reset(true);
    trace.extend(tb.run(RESET_SETTLE_EDGES));

    match trace.samples.last() {
        Some(last) if !last.spike && last.v_mem == 0 => {
            Ok(ContractReport::new(Contract::ResetBehavior, trace))
        }
        Some(last) => Err(ContractViolation::ResetNotCleared {
            spike: last.spike,
            v_mem: last.v_mem,
        }),
        None => Err(ContractViolation::ResetNotCleared {
            spike: false,
            v_mem: 0,
        }),
    }
}
