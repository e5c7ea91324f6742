//! Synchronizer pipeline.

use crate::*;

/// Shift register of `N` single-bit stages, all clocked by the consuming domain.
///
/// Stage 0 samples the asynchronous source; stage `i` copies stage `i - 1` one cycle later. The
/// extra stages give a metastable sample time to resolve before it reaches the tail, so `N` must be
/// at least 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPipeline<const N: usize> {
    stages: [bool; N],
}

impl<const N: usize> SyncPipeline<N> {
    const DEPTH_CHECK: () = assert!(N >= 2, "synchronizer pipeline needs at least two stages");

    /// Creates a pipeline with every stage set to `init`.
    pub fn new(init: bool) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::DEPTH_CHECK;
        Self { stages: [init; N] }
    }

    /// Number of stages.
    pub const fn depth(&self) -> usize { N }

    /// Returns the pipeline after one clock edge with `input` presented to stage 0.
    #[must_use]
    pub fn shift(&self, input: bool) -> Self {
        let mut stages = [input; N];
        stages[1..].copy_from_slice(&self.stages[..N - 1]);
        Self { stages }
    }

    /// Value of stage `index`.
    pub fn stage(&self, index: usize) -> bool {
        assert!(index < N, "stage {} is out of range for a {}-stage pipeline", index, N);
        self.stages[index]
    }

    /// Value of the last stage, the only one safe to read from the consuming domain.
    pub fn tail(&self) -> bool { self.stages[N - 1] }

    /// Rising edge on the tail: the second-to-last stage is set but the last is not yet.
    pub fn tail_rising(&self) -> bool { self.stages[N - 2] && !self.stages[N - 1] }

    /// All stages, stage 0 first.
    pub fn stages(&self) -> &[bool; N] { &self.stages }
}

impl<const N: usize> Default for SyncPipeline<N> {
    fn default() -> Self { Self::new(false) }
}

impl<const N: usize> Signal for SyncPipeline<N> {
    const WIDTH: usize = N;

    fn transl(self) -> Vec<bool> { self.stages.to_vec() }

    fn port_decls() -> PortDecls { PortDecls::Bits(N) }
}
