//! Bank of double buffers sharing one clock.

use cdcflow::*;
use thiserror::Error;

use crate::*;

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DoubleBufferArrayError {
    #[error("double buffer array `{name}` should contain at least one signal")]
    NoSignals { name: String },
}

/// `n_signals` independent [`BitSynchronizer`]s clocked by the same domain.
///
/// The bits are synchronized individually, so a multi-bit value crossing through the array may
/// be observed torn for a cycle. Use it for unrelated level signals only.
#[derive(Debug)]
pub struct DoubleBufferArray {
    name: String,
    init_value: bool,
    buffers: Vec<BitSynchronizer>,
}

impl DoubleBufferArray {
    /// Creates `n_signals` synchronizers, named `{name}_{index}`.
    pub fn new(name: &str, clock: ClockId, n_signals: usize, init_value: bool) -> Result<Self, DoubleBufferArrayError> {
        if n_signals == 0 {
            return Err(DoubleBufferArrayError::NoSignals { name: name.to_string() });
        }
        let buffers =
            (0..n_signals).map(|index| BitSynchronizer::new(&format!("{}_{}", name, index), clock, init_value)).collect();
        Ok(Self { name: name.to_string(), init_value, buffers })
    }

    /// Instance name.
    pub fn name(&self) -> &str { &self.name }

    /// Number of synchronized signals.
    pub fn n_signals(&self) -> usize { self.buffers.len() }

    /// Initial value of every output.
    pub fn init_value(&self) -> bool { self.init_value }

    /// Synchronized outputs, index 0 first.
    pub fn outputs(&self) -> Vec<bool> { self.buffers.iter().map(BitSynchronizer::bit_out).collect() }

    /// Synchronized output `index`.
    pub fn output(&self, index: usize) -> bool {
        assert!(index < self.n_signals(), "{}: signal {} is out of range", self.name, index);
        self.buffers[index].bit_out()
    }

    /// Samples `inputs` at a rising edge of the shared clock.
    pub fn tick(&mut self, inputs: &[bool]) {
        assert_eq!(inputs.len(), self.n_signals(), "{}: expected {} inputs", self.name, self.n_signals());
        for (buffer, bit_in) in self.buffers.iter_mut().zip(inputs) {
            buffer.tick(*bit_in);
        }
    }

    /// Ticks only if the shared clock rises in `edges`.
    pub fn tick_on(&mut self, edges: &Edges, inputs: &[bool]) -> bool {
        if edges.contains(self.buffers[0].clock()) {
            self.tick(inputs);
            true
        } else {
            false
        }
    }
}
