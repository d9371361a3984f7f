//! Cycle-accurate model of a bus-attached leaky integrate-and-fire neuron
//!
//! The block exposes one 8-bit stimulus word, an active-low reset and an
//! enable line, and drives two 8-bit output words carrying the spike flag
//! and the 15-bit membrane potential. This crate provides:
//!
//! - [`neuron`]: the synchronous state machine, one [`neuron::step`] per edge
//! - [`bus`]: packing of the output words
//! - [`params`]: the validated constant set (threshold, leak, charge map)
//! - [`harness`], [`stimulus`], [`trace`]: a clocked testbench, scenario
//!   schedules and recorded runs
//! - [`contract`]: the firing, decay, refractory and reset checks

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod bus;
pub mod params;
pub mod neuron;
pub mod harness;
pub mod stimulus;
pub mod trace;
pub mod contract;

// Re-export essential types
pub use error::{CoreError, Result};
pub use bus::{BusInputs, BusOutputs, MAX_V_MEM};
pub use params::{ChargeMap, DecayLaw, NeuronParams, MIN_REFRACTORY_CYCLES};
pub use neuron::{step, NeuronCore, NeuronState, Phase};
pub use harness::{Dut, Sample, Testbench};
pub use stimulus::{Scenario, Segment};
pub use trace::{Trace, TraceSummary};
pub use contract::{run_suite, Contract, ContractOutcome, ContractReport, ContractViolation, SuiteReport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        let params = NeuronParams::default();
        assert!(params.threshold <= MAX_V_MEM);

        let mut tb = Testbench::new(NeuronCore::new(params).unwrap());
        tb.reset_sequence();
        tb.set_input(0xFF);
        let trace: Vec<Sample> = tb.run(10);
        assert!(trace.iter().any(|s| s.spike));
        assert!(trace.iter().all(|s| s.v_mem <= MAX_V_MEM));
    }
}
