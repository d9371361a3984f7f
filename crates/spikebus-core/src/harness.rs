//! Clocked testbench for bus-attached devices
//!
//! The testbench owns the control pins, advances the clock one rising edge
//! at a time and samples both output words immediately after each edge.

use crate::bus::{BusInputs, BusOutputs};

/// Edges held in reset by [`Testbench::reset_sequence`]
pub const RESET_HOLD_CYCLES: usize = 5;

/// A synchronous device driven through the register bus
pub trait Dut {
    /// Apply one rising edge with the given pins and return the new outputs
    fn clock_edge(&mut self, inputs: BusInputs) -> BusOutputs;

    /// Outputs currently driven, without clocking
    fn outputs(&self) -> BusOutputs;
}

/// Outputs observed after one rising edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// Edge index, counted from the end of the last reset sequence
    pub cycle: u64,
    /// Stimulus word driven on this edge
    pub ui_in: u8,
    /// Reset pin on this edge
    pub rst_n: bool,
    /// Enable pin on this edge
    pub ena: bool,
    /// Decoded spike flag
    pub spike: bool,
    /// Decoded membrane potential
    pub v_mem: u16,
    /// Raw first output word
    pub uo_out: u8,
    /// Raw second output word
    pub uio_out: u8,
}

impl Sample {
    fn new(cycle: u64, inputs: BusInputs, outputs: BusOutputs) -> Self {
        let (spike, v_mem) = outputs.decode();
        Self {
            cycle,
            ui_in: inputs.ui_in,
            rst_n: inputs.rst_n,
            ena: inputs.ena,
            spike,
            v_mem,
            uo_out: outputs.uo_out,
            uio_out: outputs.uio_out,
        }
    }
}

/// Drives a [`Dut`] from a free-running clock
#[derive(Debug)]
pub struct Testbench<D: Dut> {
    dut: D,
    pins: BusInputs,
    cycle: u64,
}

impl<D: Dut> Testbench<D> {
    /// Wrap a device. Pins start with reset asserted and enable low.
    pub fn new(dut: D) -> Self {
        Self {
            dut,
            pins: BusInputs::RESET,
            cycle: 0,
        }
    }

    /// Hold reset for [`RESET_HOLD_CYCLES`] edges with enable low and a zero
    /// stimulus, then release reset, raise enable and clock one more edge.
    pub fn reset_sequence(&mut self) -> Sample {
        self.pins = BusInputs::RESET;
        for _ in 0..RESET_HOLD_CYCLES {
            self.dut.clock_edge(self.pins);
        }
        self.pins.rst_n = true;
        self.pins.ena = true;
        let outputs = self.dut.clock_edge(self.pins);
        self.cycle = 0;
        log::debug!("reset sequence complete");
        Sample::new(0, self.pins, outputs)
    }

    /// Drive the stimulus word for subsequent edges
    pub fn set_input(&mut self, ui_in: u8) {
        self.pins.ui_in = ui_in;
    }

    /// Assert (`true`) or release the active-low reset
    pub fn set_reset(&mut self, asserted: bool) {
        self.pins.rst_n = !asserted;
    }

    /// Drive the enable line
    pub fn set_enable(&mut self, enabled: bool) {
        self.pins.ena = enabled;
    }

    /// Current pin levels
    pub fn pins(&self) -> BusInputs {
        self.pins
    }

    /// Edges clocked since the last reset sequence
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Advance one rising edge and sample the outputs
    pub fn rising_edge(&mut self) -> Sample {
        let outputs = self.dut.clock_edge(self.pins);
        let sample = Sample::new(self.cycle, self.pins, outputs);
        self.cycle += 1;
        sample
    }

    /// Clock `cycles` edges with the current pins
    pub fn run(&mut self, cycles: usize) -> Vec<Sample> {
        (0..cycles).map(|_| self.rising_edge()).collect()
    }

    /// Device under test
    pub fn dut(&self) -> &D {
        &self.dut
    }

    /// Consume the testbench and return the device
    pub fn into_dut(self) -> D {
        self.dut
    }
}
