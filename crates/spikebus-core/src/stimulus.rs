//! Stimulus scenarios
//!
//! A scenario is an ordered list of segments, each driving the bus for a
//! fixed number of edges. Scenarios are plain data so they can be loaded
//! from TOML:
//!
//! ```toml
//! name = "charge-then-idle"
//!
//! [[segments]]
//! kind = "hold"
//! value = 64
//! cycles = 25
//!
//! [[segments]]
//! kind = "hold"
//! value = 0
//! cycles = 60
//! ```

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    error::*,
    harness::{Dut, Testbench},
    trace::Trace,
};

/// One stretch of bus activity
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Segment {
    /// Constant stimulus word
    Hold {
        /// Input word
        value: u8,
        /// Edges to drive
        cycles: usize,
    },
    /// Stimulus stepping linearly from `from` to `to`
    Ramp {
        /// First input word
        from: u8,
        /// Last input word
        to: u8,
        /// Edges to drive
        cycles: usize,
    },
    /// Uniformly random stimulus in `0..=max`, reproducible from `seed`
    Noise {
        /// Largest input word
        max: u8,
        /// Edges to drive
        cycles: usize,
        /// RNG seed
        #[cfg_attr(feature = "serde", serde(default))]
        seed: u64,
    },
    /// Reset asserted, released afterwards
    Reset {
        /// Edges held in reset
        cycles: usize,
    },
    /// Enable deasserted, raised afterwards
    Disable {
        /// Edges with enable low
        cycles: usize,
    },
}

impl Segment {
    /// Edges this segment drives
    pub fn cycles(&self) -> usize {
        match *self {
            Segment::Hold { cycles, .. }
            | Segment::Ramp { cycles, .. }
            | Segment::Noise { cycles, .. }
            | Segment::Reset { cycles }
            | Segment::Disable { cycles } => cycles,
        }
    }

    fn drive<D: Dut>(&self, tb: &mut Testbench<D>, trace: &mut Trace) {
        match *self {
            Segment::Hold { value, cycles } => {
                tb.set_input(value);
                trace.extend(tb.run(cycles));
            }
            Segment::Ramp { from, to, cycles } => {
                for i in 0..cycles {
                    tb.set_input(ramp_value(from, to, i, cycles));
                    trace.push(tb.rising_edge());
                }
            }
            Segment::Noise { max, cycles, seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                for _ in 0..cycles {
                    tb.set_input(rng.gen_range(0..=max));
                    trace.push(tb.rising_edge());
                }
            }
            Segment::Reset { cycles } => {
                tb.set_reset(true);
                trace.extend(tb.run(cycles));
                tb.set_reset(false);
            }
            Segment::Disable { cycles } => {
                tb.set_enable(false);
                trace.extend(tb.run(cycles));
                tb.set_enable(true);
            }
        }
    }
}

/// Input word on edge `i` of a `cycles`-long ramp from `from` to `to`
fn ramp_value(from: u8, to: u8, i: usize, cycles: usize) -> u8 {
    let span = i128::from(to) - i128::from(from);
    let steps = (cycles as i128 - 1).max(1);
    let offset = span * (i as i128).min(steps) / steps;
    (i128::from(from) + offset) as u8
}

#[cfg(feature = "serde")]
fn default_reset_first() -> bool {
    true
}

/// Named stimulus schedule
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scenario {
    /// Scenario name
    pub name: String,
    /// Run the reset sequence before the first segment
    #[cfg_attr(feature = "serde", serde(default = "default_reset_first"))]
    pub reset_first: bool,
    /// Segments in drive order
    pub segments: Vec<Segment>,
}

impl Scenario {
    /// Create an empty scenario that starts with the reset sequence
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reset_first: true,
            segments: Vec::new(),
        }
    }

    /// Append a segment
    pub fn then(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Append a constant-stimulus segment
    pub fn hold(self, value: u8, cycles: usize) -> Self {
        self.then(Segment::Hold { value, cycles })
    }

    /// Append a reset segment
    pub fn reset(self, cycles: usize) -> Self {
        self.then(Segment::Reset { cycles })
    }

    /// Total edges driven, excluding the reset sequence
    pub fn total_cycles(&self) -> usize {
        self.segments.iter().map(Segment::cycles).sum()
    }

    /// Validate the scenario
    pub fn validate(&self) -> Result<()> {
        if self.segments.is_empty() {
            return Err(CoreError::invalid_scenario(&self.name, "no segments"));
        }
        if let Some(pos) = self.segments.iter().position(|s| s.cycles() == 0) {
            return Err(CoreError::invalid_scenario(
                &self.name,
                format!("segment {} has zero cycles", pos + 1),
            ));
        }
        Ok(())
    }

    /// Drive every segment through the testbench and record each edge
    pub fn drive<D: Dut>(&self, tb: &mut Testbench<D>) -> Result<Trace> {
        self.validate()?;
        log::debug!(
            "driving scenario '{}': {} segments, {} cycles",
            self.name,
            self.segments.len(),
            self.total_cycles()
        );

        if self.reset_first {
            tb.reset_sequence();
        } else {
            tb.set_reset(false);
            tb.set_enable(true);
        }

        let mut trace = Trace::new(self.name.clone());
        for segment in &self.segments {
            segment.drive(tb, &mut trace);
        }
        Ok(trace)
    }
}
