//! Double buffer (two-stage bit synchronizer).

use cdcflow::*;

/// Next-state logic of a bit synchronizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftLogic<const DEPTH: usize>;

impl<const DEPTH: usize> Fsm for ShiftLogic<DEPTH> {
    type Input = bool;
    type State = SyncPipeline<DEPTH>;

    fn next(&self, bit_in: bool, state: &SyncPipeline<DEPTH>) -> SyncPipeline<DEPTH> { state.shift(bit_in) }
}

/// Re-samples an asynchronous bit into the domain of `clock`.
///
/// `bit_out` is `bit_in` delayed by `DEPTH` cycles of the consuming clock; before the first input
/// reaches the tail it reads the initial value. Only level signals are safe to pass through: a
/// pulse shorter than one consuming cycle may be missed.
#[derive(Debug)]
pub struct BitSynchronizer<const DEPTH: usize = 2> {
    init_value: bool,
    process: Process<ShiftLogic<DEPTH>>,
}

impl BitSynchronizer<2> {
    /// Creates a two-stage synchronizer.
    pub fn new(name: &str, clock: ClockId, init_value: bool) -> Self { Self::with_depth(name, clock, init_value) }
}

impl<const DEPTH: usize> BitSynchronizer<DEPTH> {
    /// Creates a synchronizer with `DEPTH` stages.
    pub fn with_depth(name: &str, clock: ClockId, init_value: bool) -> Self {
        Self { init_value, process: Process::new(name, clock, ShiftLogic, SyncPipeline::new(init_value)) }
    }

    /// Instance name.
    pub fn name(&self) -> &str { self.process.module_name() }

    /// Consuming clock.
    pub fn clock(&self) -> ClockId { self.process.clock() }

    /// Value of every stage before the first edge.
    pub fn init_value(&self) -> bool { self.init_value }

    /// Synchronized output.
    pub fn bit_out(&self) -> bool { self.process.state().tail() }

    /// Pipeline registers.
    pub fn state(&self) -> &SyncPipeline<DEPTH> { self.process.state() }

    /// Samples `bit_in` at a rising edge of the consuming clock.
    pub fn tick(&mut self, bit_in: bool) {
        let before = self.bit_out();
        self.process.tick(bit_in);
        if before != self.bit_out() {
            log::trace!("{}: output {} at cycle {}", self.name(), u8::from(self.bit_out()), self.process.cycles());
        }
    }

    /// Ticks only if the consuming clock rises in `edges`.
    pub fn tick_on(&mut self, edges: &Edges, bit_in: bool) -> bool {
        if self.process.is_clocked_by(edges) {
            self.tick(bit_in);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> ClockId {
        let mut sim = Simulator::new();
        sim.add_clock(Clock::new("clk", 10)).unwrap()
    }

    #[test]
    fn output_lags_input_by_two_cycles() {
        let inputs = [true, false, true, true, false, false, true, false, true, true, true, false];
        let mut sync = BitSynchronizer::new("sync", clock(), false);

        let mut outputs = vec![];
        for bit_in in inputs {
            outputs.push(sync.bit_out());
            sync.tick(bit_in);
        }

        assert_eq!(&outputs[..2], &[false, false]);
        for t in 2..inputs.len() {
            assert_eq!(outputs[t], inputs[t - 2], "cycle {}", t);
        }
    }

    #[test]
    fn initial_value_is_held_until_input_arrives() {
        let mut sync = BitSynchronizer::new("sync", clock(), true);
        let mut trace = Trace::new("top");
        for (t, bit_in) in [false, false, false, true, true].into_iter().enumerate() {
            trace.probe(t as u64, "bit_out", sync.bit_out());
            sync.tick(bit_in);
        }
        trace.probe(5, "bit_out", sync.bit_out());
        assert_eq!(trace.wave("bit_out").unwrap(), "1.0..1");
        assert!(sync.init_value());
    }

    #[test]
    fn deeper_pipeline_adds_latency() {
        let mut sync = BitSynchronizer::<4>::with_depth("sync4", clock(), false);
        let mut outputs = vec![];
        for t in 0..6 {
            outputs.push(sync.bit_out());
            sync.tick(t == 0);
        }
        assert_eq!(outputs, vec![false, false, false, false, true, false]);
        assert_eq!(sync.state().depth(), 4);
    }

    #[test]
    fn tick_on_ignores_other_clocks() {
        let mut sim = Simulator::new();
        let fast = sim.add_clock(Clock::new("fast", 2)).unwrap();
        let slow = sim.add_clock(Clock::new("slow", 5)).unwrap();
        let mut sync = BitSynchronizer::new("sync", slow, false);

        let mut ticks = 0;
        for _ in 0..10 {
            let edges = sim.step().unwrap();
            if sync.tick_on(&edges, true) {
                ticks += 1;
            }
        }

        assert_eq!(ticks, sim.cycles(slow));
        assert!(sim.cycles(fast) > sim.cycles(slow));
        assert_eq!(sync.clock(), slow);
        assert_eq!(sync.name(), "sync");
        assert!(sync.bit_out());
    }
}
