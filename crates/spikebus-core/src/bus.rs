//! Parallel register bus of the neuron block
//!
//! One 8-bit input word plus two control lines go in, two 8-bit output
//! words come out:
//!
//! ```text
//! uo_out  = [ spike | v_mem[6:0]  ]
//! uio_out = [        v_mem[14:7]  ]
//! ```

/// Largest representable membrane potential (15 bits)
pub const MAX_V_MEM: u16 = 0x7FFF;

const SPIKE_BIT: u8 = 0x80;
const V_LO_MASK: u8 = 0x7F;
const V_LO_BITS: u32 = 7;

/// Inputs sampled on each rising edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusInputs {
    /// Active-low synchronous reset
    pub rst_n: bool,
    /// Clock enable
    pub ena: bool,
    /// Stimulus word
    pub ui_in: u8,
}

impl BusInputs {
    /// Reset asserted, enable low, no stimulus
    pub const RESET: Self = Self {
        rst_n: false,
        ena: false,
        ui_in: 0,
    };

    /// Normal operation with the given stimulus word
    pub fn running(ui_in: u8) -> Self {
        Self {
            rst_n: true,
            ena: true,
            ui_in,
        }
    }

    /// Whether reset is asserted this edge
    pub fn in_reset(&self) -> bool {
        !self.rst_n
    }
}

impl Default for BusInputs {
    fn default() -> Self {
        Self::RESET
    }
}

/// Output words driven after each rising edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusOutputs {
    /// Spike flag in bit 7, membrane bits 6..0 below it
    pub uo_out: u8,
    /// Membrane bits 14..7
    pub uio_out: u8,
}

impl BusOutputs {
    /// Pack a spike flag and membrane value. Bits above 14 are dropped.
    pub fn encode(spike: bool, v_mem: u16) -> Self {
        let v_mem = v_mem & MAX_V_MEM;
        let spike_bit = if spike { SPIKE_BIT } else { 0 };
        Self {
            uo_out: spike_bit | (v_mem as u8 & V_LO_MASK),
            uio_out: (v_mem >> V_LO_BITS) as u8,
        }
    }

    /// Unpack into `(spike, v_mem)`
    pub fn decode(&self) -> (bool, u16) {
        (self.spike(), self.v_mem())
    }

    /// Spike flag
    pub fn spike(&self) -> bool {
        self.uo_out & SPIKE_BIT != 0
    }

    /// 15-bit membrane value, `(uio_out << 7) | (uo_out & 0x7F)`
    pub fn v_mem(&self) -> u16 {
        (u16::from(self.uio_out) << V_LO_BITS) | u16::from(self.uo_out & V_LO_MASK)
    }
}
