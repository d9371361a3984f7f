//! Parameter set for the neuron core
//!
//! The bus contract fixes the observable behaviour (firing under sustained
//! drive, bounded decay, refractory lockout, reset) but not the constants
//! behind it. They live here as a validated record so alternative
//! hardware mappings can be evaluated against the same contract.

use crate::{error::*, MAX_V_MEM};

/// Minimum refractory lockout in cycles
pub const MIN_REFRACTORY_CYCLES: u8 = 4;

/// Largest shift accepted by [`ChargeMap::Shift`]; keeps `255 << shift` inside 16 bits
pub const MAX_CHARGE_SHIFT: u8 = 7;

/// Number of entries in a [`ChargeMap::Table`], one per input word
pub const CHARGE_TABLE_LEN: usize = 256;

/// Per-cycle leak applied to the membrane potential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "law", rename_all = "snake_case"))]
pub enum DecayLaw {
    /// Subtract a fixed amount each cycle, saturating at zero
    Linear {
        /// Charge lost per cycle
        leak: u16,
    },
    /// Lose `v >> shift` each cycle (at least 1 while `v > 0`)
    Shift {
        /// Right-shift applied to the potential
        shift: u8,
    },
}

impl DecayLaw {
    /// Apply one cycle of leak
    pub fn apply(&self, v_mem: u16) -> u16 {
        match *self {
            DecayLaw::Linear { leak } => v_mem.saturating_sub(leak),
            DecayLaw::Shift { shift } => {
                if v_mem == 0 {
                    0
                } else {
                    // the floor of 1 keeps small potentials from sticking above zero
                    v_mem - (v_mem >> shift).max(1)
                }
            }
        }
    }

    /// Validate the decay law
    pub fn validate(&self) -> Result<()> {
        match *self {
            DecayLaw::Linear { leak } if leak == 0 => Err(CoreError::invalid_parameter(
                "decay.leak",
                leak.to_string(),
                "> 0",
            )),
            DecayLaw::Shift { shift } if !(1..=14).contains(&shift) => {
                Err(CoreError::invalid_parameter(
                    "decay.shift",
                    shift.to_string(),
                    "1..=14",
                ))
            }
            _ => Ok(()),
        }
    }
}

impl Default for DecayLaw {
    fn default() -> Self {
        DecayLaw::Linear { leak: 32 }
    }
}

/// Mapping from the 8-bit input word to the charge integrated per cycle.
///
/// Every variant satisfies `f(0) == 0` and is non-decreasing in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "map", rename_all = "snake_case"))]
pub enum ChargeMap {
    /// `f(x) = x << shift`
    Shift {
        /// Left shift applied to the input word
        shift: u8,
    },
    /// `f(x) = x * gain`, saturating
    Linear {
        /// Multiplier applied to the input word
        gain: u16,
    },
    /// Explicit lookup, one entry per input word
    Table {
        /// Charge for each input value `0..=255`
        entries: Vec<u16>,
    },
}

impl ChargeMap {
    /// Charge contributed by one cycle of `ui_in`
    pub fn charge(&self, ui_in: u8) -> u16 {
        match self {
            ChargeMap::Shift { shift } => {
                let charge = u32::from(ui_in) << u32::from(*shift).min(16);
                charge.min(u32::from(u16::MAX)) as u16
            }
            ChargeMap::Linear { gain } => {
                let charge = u32::from(ui_in) * u32::from(*gain);
                charge.min(u32::from(u16::MAX)) as u16
            }
            // short tables extend their last entry
            ChargeMap::Table { entries } => entries
                .get(usize::from(ui_in))
                .or_else(|| entries.last())
                .copied()
                .unwrap_or(0),
        }
    }

    /// Validate the mapping
    pub fn validate(&self) -> Result<()> {
        match self {
            ChargeMap::Shift { shift } if *shift > MAX_CHARGE_SHIFT => {
                Err(CoreError::invalid_parameter(
                    "charge.shift",
                    shift.to_string(),
                    format!("<= {}", MAX_CHARGE_SHIFT),
                ))
            }
            ChargeMap::Table { entries } => {
                if entries.len() != CHARGE_TABLE_LEN {
                    return Err(CoreError::invalid_parameter(
                        "charge.entries",
                        format!("{} entries", entries.len()),
                        format!("exactly {} entries", CHARGE_TABLE_LEN),
                    ));
                }
                if entries[0] != 0 {
                    return Err(CoreError::invalid_parameter(
                        "charge.entries[0]",
                        entries[0].to_string(),
                        "0",
                    ));
                }
                if let Some(pos) = entries.windows(2).position(|w| w[1] < w[0]) {
                    return Err(CoreError::invalid_parameter(
                        format!("charge.entries[{}]", pos + 1),
                        entries[pos + 1].to_string(),
                        format!(">= {} (non-decreasing)", entries[pos]),
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl Default for ChargeMap {
    fn default() -> Self {
        ChargeMap::Shift { shift: 1 }
    }
}

/// Constants of the neuron core
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NeuronParams {
    /// Firing threshold
    pub threshold: u16,
    /// Potential loaded after a spike
    pub reset_potential: u16,
    /// Cycles of lockout after a spike
    pub refractory_cycles: u8,
    /// Leak law
    pub decay: DecayLaw,
    /// Input word to charge mapping
    pub charge: ChargeMap,
}

impl Default for NeuronParams {
    fn default() -> Self {
        Self {
            threshold: 1024,
            reset_potential: 0,
            refractory_cycles: MIN_REFRACTORY_CYCLES,
            decay: DecayLaw::default(),
            charge: ChargeMap::default(),
        }
    }
}

impl NeuronParams {
    /// Create new parameters with validation
    pub fn new(
        threshold: u16,
        reset_potential: u16,
        refractory_cycles: u8,
        decay: DecayLaw,
        charge: ChargeMap,
    ) -> Result<Self> {
        let params = Self {
            threshold,
            reset_potential,
            refractory_cycles,
            decay,
            charge,
        };
        params.validate()?;
        Ok(params)
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if self.threshold == 0 || self.threshold > MAX_V_MEM {
            return Err(CoreError::invalid_parameter(
                "threshold",
                self.threshold.to_string(),
                format!("1..={}", MAX_V_MEM),
            ));
        }
        if self.reset_potential >= self.threshold {
            return Err(CoreError::invalid_parameter(
                "reset_potential",
                format!("{} (with threshold={})", self.reset_potential, self.threshold),
                "< threshold",
            ));
        }
        if self.refractory_cycles < MIN_REFRACTORY_CYCLES {
            return Err(CoreError::invalid_parameter(
                "refractory_cycles",
                self.refractory_cycles.to_string(),
                format!(">= {}", MIN_REFRACTORY_CYCLES),
            ));
        }
        self.decay.validate()?;
        self.charge.validate()
    }

    /// Set the firing threshold
    pub fn with_threshold(mut self, threshold: u16) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the post-spike potential
    pub fn with_reset_potential(mut self, reset_potential: u16) -> Self {
        self.reset_potential = reset_potential;
        self
    }

    /// Set the refractory lockout
    pub fn with_refractory_cycles(mut self, cycles: u8) -> Self {
        self.refractory_cycles = cycles;
        self
    }

    /// Set the decay law
    pub fn with_decay(mut self, decay: DecayLaw) -> Self {
        self.decay = decay;
        self
    }

    /// Set the charge mapping
    pub fn with_charge(mut self, charge: ChargeMap) -> Self {
        self.charge = charge;
        self
    }

    /// Idle cycles needed for `from` to leak below `bound`
    pub fn cycles_to_decay(&self, from: u16, bound: u16) -> usize {
        let mut v_mem = from;
        let mut cycles = 0;
        while v_mem >= bound && v_mem > 0 {
            v_mem = self.decay.apply(v_mem);
            cycles += 1;
        }
        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        let params = NeuronParams::default();
        assert!(params.validate().is_ok());
        assert!(params.reset_potential < params.threshold);
        assert!(params.refractory_cycles >= MIN_REFRACTORY_CYCLES);
    }

    #[test]
    fn test_params_validation() {
        // Zero threshold
        let result = NeuronParams::new(0, 0, 4, DecayLaw::default(), ChargeMap::default());
        assert!(result.is_err());

        // Threshold above 15 bits
        let result = NeuronParams::new(0x8000, 0, 4, DecayLaw::default(), ChargeMap::default());
        assert!(result.is_err());

        // Baseline at threshold
        let result = NeuronParams::new(100, 100, 4, DecayLaw::default(), ChargeMap::default());
        assert!(result.is_err());

        // Refractory too short
        let result = NeuronParams::new(100, 0, 3, DecayLaw::default(), ChargeMap::default());
        assert!(matches!(
            result,
            Err(CoreError::InvalidParameter { ref parameter, .. }) if parameter == "refractory_cycles"
        ));

        // Zero leak
        let result = NeuronParams::new(100, 0, 4, DecayLaw::Linear { leak: 0 }, ChargeMap::default());
        assert!(result.is_err());

        let result = NeuronParams::new(100, 0, 4, DecayLaw::Shift { shift: 15 }, ChargeMap::default());
        assert!(result.is_err());

        let result = NeuronParams::new(100, 0, 4, DecayLaw::default(), ChargeMap::Shift { shift: 8 });
        assert!(result.is_err());

        // Valid
        let result = NeuronParams::new(2000, 10, 6, DecayLaw::Shift { shift: 3 }, ChargeMap::Linear { gain: 3 });
        assert!(result.is_ok());
    }

    #[test]
    fn test_linear_decay() {
        let law = DecayLaw::Linear { leak: 32 };
        assert_eq!(law.apply(100), 68);
        assert_eq!(law.apply(20), 0);
        assert_eq!(law.apply(0), 0);
    }

    #[test]
    fn test_shift_decay_reaches_zero() {
        let law = DecayLaw::Shift { shift: 2 };
        assert_eq!(law.apply(1000), 750);
        assert_eq!(law.apply(3), 2);
        assert_eq!(law.apply(1), 0);
        assert_eq!(law.apply(0), 0);

        let mut v = MAX_V_MEM;
        for _ in 0..200 {
            let next = law.apply(v);
            assert!(next <= v);
            v = next;
        }
        assert_eq!(v, 0);
    }

    #[test]
    fn test_charge_maps() {
        let shift = ChargeMap::Shift { shift: 1 };
        assert_eq!(shift.charge(0), 0);
        assert_eq!(shift.charge(0x30), 96);
        assert_eq!(shift.charge(0xFF), 510);

        let linear = ChargeMap::Linear { gain: 300 };
        assert_eq!(linear.charge(0), 0);
        assert_eq!(linear.charge(10), 3000);
        assert_eq!(linear.charge(0xFF), u16::MAX);

        let entries: Vec<u16> = (0..=255u16).map(|x| x * 2).collect();
        let table = ChargeMap::Table { entries };
        assert!(table.validate().is_ok());
        assert_eq!(table.charge(7), 14);
    }

    #[test]
    fn test_charge_saturates_on_invalid_maps() {
        // rejected by validate, but evaluation must still be total
        let shift = ChargeMap::Shift { shift: 16 };
        assert!(shift.validate().is_err());
        assert_eq!(shift.charge(0), 0);
        assert_eq!(shift.charge(1), u16::MAX);
        assert_eq!(ChargeMap::Shift { shift: 255 }.charge(0xFF), u16::MAX);

        let short = ChargeMap::Table { entries: vec![0, 3, 9] };
        assert_eq!(short.charge(1), 3);
        assert_eq!(short.charge(200), 9);
        assert_eq!(ChargeMap::Table { entries: vec![] }.charge(5), 0);
    }

    #[test]
    fn test_charge_table_validation() {
        let short = ChargeMap::Table { entries: vec![0; 10] };
        assert!(short.validate().is_err());

        let mut entries = vec![5u16; CHARGE_TABLE_LEN];
        let offset = ChargeMap::Table { entries: entries.clone() };
        assert!(offset.validate().is_err());

        entries[0] = 0;
        entries[100] = 1;
        let err = ChargeMap::Table { entries }.validate().unwrap_err();
        assert!(format!("{}", err).contains("charge.entries[100]"));
    }

    #[test]
    fn test_default_decay_bound() {
        // any sub-threshold potential must fall below 20 within 35 idle cycles
        let params = NeuronParams::default();
        assert!(params.cycles_to_decay(params.threshold - 1, 20) <= 35);
        assert_eq!(params.cycles_to_decay(10, 20), 0);
    }

    #[test]
    fn test_builder_setters() {
        let params = NeuronParams::default()
            .with_threshold(500)
            .with_reset_potential(5)
            .with_refractory_cycles(8)
            .with_decay(DecayLaw::Shift { shift: 4 })
            .with_charge(ChargeMap::Linear { gain: 2 });
        assert!(params.validate().is_ok());
        assert_eq!(params.threshold, 500);
        assert_eq!(params.refractory_cycles, 8);
    }
}
