//! Leaky integrate-and-fire neuron core
//!
//! The core is a single synchronous state machine: one 15-bit membrane
//! register, one refractory counter and the registered spike flag. Every
//! rising edge evaluates [`step`] exactly once; the bus outputs are packed
//! from the post-edge state.

use crate::{
    bus::{BusInputs, BusOutputs, MAX_V_MEM},
    error::*,
    harness::Dut,
    params::NeuronParams,
};

/// Control state of the core
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Held or just released from reset
    #[default]
    Reset,
    /// Accepting charge
    Integrating,
    /// Post-spike lockout, charge ignored
    Refractory,
}

/// Register file of the core
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeuronState {
    /// Membrane potential, always `<= MAX_V_MEM`
    pub v_mem: u16,
    /// Remaining lockout cycles
    pub refractory: u8,
    /// Registered spike flag
    pub spike: bool,
    /// Control state
    pub phase: Phase,
}

impl NeuronState {
    /// Cleared register file
    pub const RESET: Self = Self {
        v_mem: 0,
        refractory: 0,
        spike: false,
        phase: Phase::Reset,
    };

    /// Bus words driven by this state
    pub fn outputs(&self) -> BusOutputs {
        BusOutputs::encode(self.spike, self.v_mem)
    }

    /// Check if the core is locked out
    pub fn is_refractory(&self) -> bool {
        self.refractory > 0
    }
}

/// Evaluate one rising edge.
///
/// Reset dominates everything, including enable. With enable low the
/// membrane and refractory counter hold their value and the spike flag
/// drops, so one firing shows on exactly one edge. During the refractory
/// lockout the membrane keeps leaking but input is ignored and no spike
/// can occur.
pub fn step(params: &NeuronParams, state: &NeuronState, inputs: BusInputs) -> NeuronState {
    if inputs.in_reset() {
        return NeuronState::RESET;
    }
    if !inputs.ena {
        return NeuronState {
            spike: false,
            ..*state
        };
    }

    if state.is_refractory() {
        let refractory = state.refractory - 1;
        return NeuronState {
            v_mem: params.decay.apply(state.v_mem),
            refractory,
            spike: false,
            phase: if refractory == 0 {
                Phase::Integrating
            } else {
                Phase::Refractory
            },
        };
    }

    let charge = params.charge.charge(inputs.ui_in);
    let v_mem = params
        .decay
        .apply(state.v_mem)
        .saturating_add(charge)
        .min(MAX_V_MEM);

    if v_mem >= params.threshold {
        NeuronState {
            v_mem: params.reset_potential,
            refractory: params.refractory_cycles,
            spike: true,
            phase: Phase::Refractory,
        }
    } else {
        NeuronState {
            v_mem,
            refractory: 0,
            spike: false,
            phase: Phase::Integrating,
        }
    }
}

/// Neuron core with its parameters and register file
#[derive(Debug, Clone)]
pub struct NeuronCore {
    params: NeuronParams,
    state: NeuronState,
    edges: u64,
    spikes: u64,
}

impl NeuronCore {
    /// Create a new core in the reset state
    pub fn new(params: NeuronParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            state: NeuronState::RESET,
            edges: 0,
            spikes: 0,
        })
    }

    /// Current register file
    pub fn state(&self) -> &NeuronState {
        &self.state
    }

    /// Parameters the core was built with
    pub fn params(&self) -> &NeuronParams {
        &self.params
    }

    /// Get current membrane potential
    pub fn membrane_potential(&self) -> u16 {
        self.state.v_mem
    }

    /// Rising edges seen since construction
    pub fn edges(&self) -> u64 {
        self.edges
    }

    /// Spikes emitted since construction
    pub fn spike_count(&self) -> u64 {
        self.spikes
    }
}

impl Dut for NeuronCore {
    fn clock_edge(&mut self, inputs: BusInputs) -> BusOutputs {
        let next = step(&self.params, &self.state, inputs);
        self.edges += 1;

        if next.spike {
            self.spikes += 1;
            log::debug!(
                "edge {}: spike #{} (ui_in={:#04x})",
                self.edges,
                self.spikes,
                inputs.ui_in
            );
        }
        log::trace!(
            "edge {}: {:?} -> {:?} v_mem={}",
            self.edges,
            self.state.phase,
            next.phase,
            next.v_mem
        );

        self.state = next;
        self.state.outputs()
    }

    fn outputs(&self) -> BusOutputs {
        self.state.outputs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ChargeMap, DecayLaw};

    fn run(params: &NeuronParams, ui_in: u8, cycles: usize) -> Vec<NeuronState> {
        let mut state = NeuronState::RESET;
        (0..cycles)
            .map(|_| {
                state = step(params, &state, BusInputs::running(ui_in));
                state
            })
            .collect()
    }

    #[test]
    fn test_reset_clears_state() {
        let params = NeuronParams::default();
        let busy = NeuronState {
            v_mem: 900,
            refractory: 3,
            spike: true,
            phase: Phase::Refractory,
        };
        let next = step(&params, &busy, BusInputs { rst_n: false, ena: true, ui_in: 0xFF });
        assert_eq!(next, NeuronState::RESET);
        assert_eq!(next.outputs(), BusOutputs::default());
    }

    #[test]
    fn test_disabled_holds_state() {
        let params = NeuronParams::default();
        let state = NeuronState {
            v_mem: 500,
            refractory: 0,
            spike: false,
            phase: Phase::Integrating,
        };
        let held = step(&params, &state, BusInputs { rst_n: true, ena: false, ui_in: 0xFF });
        assert_eq!(held, state);
    }

    #[test]
    fn test_disabled_drops_spike_flag() {
        let params = NeuronParams::default();
        let fired = NeuronState {
            v_mem: 0,
            refractory: 4,
            spike: true,
            phase: Phase::Refractory,
        };
        let held = step(&params, &fired, BusInputs { rst_n: true, ena: false, ui_in: 0xFF });
        assert!(!held.spike);
        assert_eq!(held.refractory, 4);
        assert_eq!(held.phase, Phase::Refractory);
        assert!(!held.outputs().spike());
    }

    #[test]
    fn test_unvalidated_charge_maps_do_not_panic() {
        let state = NeuronState {
            phase: Phase::Integrating,
            ..NeuronState::RESET
        };
        let short = NeuronParams {
            charge: ChargeMap::Table { entries: vec![0, 10, 20] },
            ..NeuronParams::default()
        };
        let next = step(&short, &state, BusInputs::running(0xFF));
        assert_eq!(next.v_mem, 20);

        let wide = NeuronParams {
            charge: ChargeMap::Shift { shift: 20 },
            ..NeuronParams::default()
        };
        let next = step(&wide, &state, BusInputs::running(0xFF));
        assert!(next.spike);
        assert!(next.v_mem <= MAX_V_MEM);
    }

    #[test]
    fn test_integration_with_leak() {
        let params = NeuronParams::default();
        // charge 0x30 << 1 = 96, leak 32
        let states = run(&params, 0x30, 3);
        assert_eq!(states[0].v_mem, 96);
        assert_eq!(states[1].v_mem, 160);
        assert_eq!(states[2].v_mem, 224);
        assert!(states.iter().all(|s| s.phase == Phase::Integrating && !s.spike));
    }

    #[test]
    fn test_zero_input_never_rises() {
        let params = NeuronParams::default();
        let states = run(&params, 0, 50);
        assert!(states.iter().all(|s| s.v_mem == 0 && !s.spike));
    }

    #[test]
    fn test_spike_and_refractory() {
        let params = NeuronParams::default();
        let states = run(&params, 0xFF, 12);

        // 510, 988, then 1466 crosses the threshold
        assert_eq!(states[0].v_mem, 510);
        assert_eq!(states[1].v_mem, 988);
        assert!(states[2].spike);
        assert_eq!(states[2].v_mem, params.reset_potential);
        assert_eq!(states[2].refractory, params.refractory_cycles);
        assert_eq!(states[2].phase, Phase::Refractory);

        // lockout: input ignored, spike low
        for s in &states[3..7] {
            assert!(!s.spike);
            assert_eq!(s.v_mem, 0);
        }
        assert_eq!(states[6].phase, Phase::Integrating);
        assert_eq!(states[7].v_mem, 510);
    }

    #[test]
    fn test_refractory_keeps_leaking() {
        let params = NeuronParams::default().with_reset_potential(100);
        let state = NeuronState {
            v_mem: 100,
            refractory: 2,
            spike: true,
            phase: Phase::Refractory,
        };
        let next = step(&params, &state, BusInputs::running(0xFF));
        assert_eq!(next.v_mem, 68);
        assert_eq!(next.refractory, 1);
        assert!(!next.spike);
    }

    #[test]
    fn test_saturates_instead_of_wrapping() {
        let params = NeuronParams::default()
            .with_threshold(MAX_V_MEM)
            .with_charge(ChargeMap::Linear { gain: 1000 })
            .with_decay(DecayLaw::Linear { leak: 1 });
        let state = NeuronState {
            v_mem: MAX_V_MEM - 10,
            refractory: 0,
            spike: false,
            phase: Phase::Integrating,
        };
        // 32756 + 1000 clamps to 0x7FFF, which is the threshold
        let next = step(&params, &state, BusInputs::running(1));
        assert!(next.spike);
        assert_eq!(next.v_mem, params.reset_potential);
    }

    #[test]
    fn test_core_counts_edges_and_spikes() {
        let mut core = NeuronCore::new(NeuronParams::default()).unwrap();
        assert_eq!(core.outputs(), BusOutputs::default());

        let mut spikes = 0;
        for _ in 0..30 {
            if core.clock_edge(BusInputs::running(0xFF)).spike() {
                spikes += 1;
            }
        }
        assert_eq!(core.edges(), 30);
        assert_eq!(core.spike_count(), spikes);
        assert!(spikes > 0);
    }

    #[test]
    fn test_core_rejects_invalid_params() {
        let params = NeuronParams::default().with_refractory_cycles(1);
        assert!(NeuronCore::new(params).is_err());
    }
}
