//! Recorded testbench runs

use crate::harness::Sample;

/// Samples collected while driving a scenario
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trace {
    /// Scenario name
    pub name: String,
    /// One sample per rising edge, in order
    pub samples: Vec<Sample>,
}

/// Aggregate statistics of a [`Trace`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceSummary {
    /// Edges recorded
    pub cycles: usize,
    /// Spikes observed
    pub spike_count: usize,
    /// Smallest gap between consecutive spikes
    pub min_spike_gap: Option<u64>,
    /// Largest membrane value observed
    pub peak_v_mem: u16,
    /// Membrane value on the last edge
    pub final_v_mem: u16,
}

impl Trace {
    /// Create an empty trace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: Vec::new(),
        }
    }

    /// Append a sample
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Number of recorded edges
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Cycles on which the spike flag was high
    pub fn spike_cycles(&self) -> Vec<u64> {
        self.samples
            .iter()
            .filter(|s| s.spike)
            .map(|s| s.cycle)
            .collect()
    }

    /// Total spike count
    pub fn spike_count(&self) -> usize {
        self.samples.iter().filter(|s| s.spike).count()
    }

    /// Gaps between consecutive spike cycles
    pub fn spike_gaps(&self) -> Vec<u64> {
        self.spike_cycles()
            .windows(2)
            .map(|w| w[1] - w[0])
            .collect()
    }

    /// Smallest gap between consecutive spikes, if at least two occurred
    pub fn min_spike_gap(&self) -> Option<u64> {
        self.spike_gaps().into_iter().min()
    }

    /// Membrane value on the last edge
    pub fn final_v_mem(&self) -> Option<u16> {
        self.samples.last().map(|s| s.v_mem)
    }

    /// Largest membrane value observed
    pub fn peak_v_mem(&self) -> u16 {
        self.samples.iter().map(|s| s.v_mem).max().unwrap_or(0)
    }

    /// Compute aggregate statistics
    pub fn summary(&self) -> TraceSummary {
        TraceSummary {
            cycles: self.len(),
            spike_count: self.spike_count(),
            min_spike_gap: self.min_spike_gap(),
            peak_v_mem: self.peak_v_mem(),
            final_v_mem: self.final_v_mem().unwrap_or(0),
        }
    }
}

impl Extend<Sample> for Trace {
    fn extend<I: IntoIterator<Item = Sample>>(&mut self, iter: I) {
        self.samples.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusOutputs;

    fn sample(cycle: u64, spike: bool, v_mem: u16) -> Sample {
        let out = BusOutputs::encode(spike, v_mem);
        Sample {
            cycle,
            ui_in: 0,
            rst_n: true,
            ena: true,
            spike,
            v_mem,
            uo_out: out.uo_out,
            uio_out: out.uio_out,
        }
    }

    #[test]
    fn test_empty_trace() {
        let trace = Trace::new("empty");
        assert!(trace.is_empty());
        assert_eq!(trace.spike_count(), 0);
        assert_eq!(trace.min_spike_gap(), None);
        assert_eq!(trace.final_v_mem(), None);
        assert_eq!(trace.summary().final_v_mem, 0);
    }

    #[test]
    fn test_spike_statistics() {
        let mut trace = Trace::new("spikes");
        trace.extend([
            sample(0, false, 100),
            sample(1, true, 0),
            sample(2, false, 0),
            sample(6, true, 0),
            sample(7, false, 900),
            sample(13, true, 0),
            sample(14, false, 40),
        ]);

        assert_eq!(trace.spike_cycles(), vec![1, 6, 13]);
        assert_eq!(trace.spike_gaps(), vec![5, 7]);

        let summary = trace.summary();
        assert_eq!(summary.cycles, 7);
        assert_eq!(summary.spike_count, 3);
        assert_eq!(summary.min_spike_gap, Some(5));
        assert_eq!(summary.peak_v_mem, 900);
        assert_eq!(summary.final_v_mem, 40);
    }
}
