//! Handshake pulse synchronizer.
//!
//! A one-cycle pulse in the trigger domain is carried into the output domain as a one-cycle pulse.
//! The trigger domain raises `trigger_pulse_detected` and holds it; the output domain synchronizes
//! it through a three-stage pipeline and pulses on the rising edge of the pipeline tail; the tail is
//! synchronized back into the trigger domain as an acknowledge, which clears the request. `busy`
//! stays high until the whole round trip has drained, and triggers arriving meanwhile are dropped.

use cdcflow::*;
use static_assertions::const_assert;

/// Depth of the request pipeline in the output domain.
pub const OUTPUT_DEPTH: usize = 3;

/// Depth of the acknowledge pipeline in the trigger domain.
pub const ACK_DEPTH: usize = 2;

const_assert!(OUTPUT_DEPTH >= 3);
const_assert!(ACK_DEPTH >= 2);

/// Registers of the trigger domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Signal)]
pub struct TriggerState {
    /// Request, held until acknowledged.
    pub trigger_pulse_detected: bool,
    /// A transfer is in flight.
    pub busy: bool,
    /// Output pipeline tail re-sampled by the trigger clock.
    pub acknowledge: SyncPipeline<ACK_DEPTH>,
}

/// Registers of the output domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Signal)]
pub struct OutputState {
    /// Request re-sampled by the output clock.
    pub pipeline: SyncPipeline<OUTPUT_DEPTH>,
    /// Output pulse.
    pub output: bool,
}

/// Values the trigger domain samples at its rising edge.
#[derive(Debug, Clone, Copy)]
pub struct TriggerInput {
    /// Transfer request.
    pub trigger: bool,
    /// Tail of the output-domain pipeline.
    pub output_tail: bool,
}

/// Next-state logic of the trigger domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerLogic;

impl Fsm for TriggerLogic {
    type Input = TriggerInput;
    type State = TriggerState;

    fn next(&self, input: TriggerInput, state: &TriggerState) -> TriggerState {
        let acknowledged = state.acknowledge.tail();

        let trigger_pulse_detected = if acknowledged && state.trigger_pulse_detected {
            false
        } else if input.trigger && !state.busy {
            true
        } else {
            state.trigger_pulse_detected
        };

        // Falls only once both the request and the acknowledge are low.
        let busy = if state.busy { state.trigger_pulse_detected || acknowledged } else { input.trigger };

        TriggerState { trigger_pulse_detected, busy, acknowledge: state.acknowledge.shift(input.output_tail) }
    }
}

/// Next-state logic of the output domain. The input is `trigger_pulse_detected`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputLogic;

impl Fsm for OutputLogic {
    type Input = bool;
    type State = OutputState;

    fn next(&self, trigger_pulse_detected: bool, state: &OutputState) -> OutputState {
        OutputState { pipeline: state.pipeline.shift(trigger_pulse_detected), output: state.pipeline.tail_rising() }
    }
}

/// Carries single-cycle pulses from `trigger_clock` to `output_clock`.
///
/// Both clocks may be the same [`ClockId`]. At most one transfer is in flight: an accepted trigger
/// produces exactly one output pulse, and a trigger seen while [`PulseSynchronizer::busy`] is
/// high is dropped.
#[derive(Debug)]
pub struct PulseSynchronizer {
    name: String,
    trigger: Process<TriggerLogic>,
    output: Process<OutputLogic>,
    accepted_triggers: u64,
    dropped_triggers: u64,
}

impl PulseSynchronizer {
    /// Creates a pulse synchronizer with every register low.
    pub fn new(name: &str, trigger_clock: ClockId, output_clock: ClockId) -> Self {
        Self {
            name: name.to_string(),
            trigger: Process::new(&format!("{}_trigger", name), trigger_clock, TriggerLogic, TriggerState::default()),
            output: Process::new(&format!("{}_output", name), output_clock, OutputLogic, OutputState::default()),
            accepted_triggers: 0,
            dropped_triggers: 0,
        }
    }

    /// Instance name.
    pub fn name(&self) -> &str { &self.name }

    /// Trigger clock.
    pub fn trigger_clock(&self) -> ClockId { self.trigger.clock() }

    /// Output clock.
    pub fn output_clock(&self) -> ClockId { self.output.clock() }

    /// A transfer is in flight (trigger domain).
    pub fn busy(&self) -> bool { self.trigger.state().busy }

    /// Output pulse (output domain).
    pub fn output(&self) -> bool { self.output.state().output }

    /// Registers of the trigger domain.
    pub fn trigger_state(&self) -> &TriggerState { self.trigger.state() }

    /// Registers of the output domain.
    pub fn output_state(&self) -> &OutputState { self.output.state() }

    /// Number of triggers that started a transfer.
    pub fn accepted_triggers(&self) -> u64 { self.accepted_triggers }

    /// Number of triggers ignored because a transfer was in flight.
    pub fn dropped_triggers(&self) -> u64 { self.dropped_triggers }

    fn eval_trigger(&self, trigger: bool) -> TriggerState {
        self.trigger.eval(TriggerInput { trigger, output_tail: self.output.state().pipeline.tail() })
    }

    fn commit_trigger(&mut self, next: TriggerState, trigger: bool) {
        let state = *self.trigger.state();
        let cycle = self.trigger.cycles();

        if trigger {
            if state.busy {
                self.dropped_triggers += 1;
                log::trace!("{}: trigger dropped at cycle {}, transfer in flight", self.name, cycle);
            } else {
                self.accepted_triggers += 1;
                log::debug!("{}: trigger accepted at cycle {}", self.name, cycle);
            }
        }
        if state.trigger_pulse_detected && !next.trigger_pulse_detected {
            log::debug!("{}: acknowledged at cycle {}", self.name, cycle);
        }
        if state.busy && !next.busy {
            log::debug!("{}: released at cycle {}", self.name, cycle);
        }

        self.trigger.commit(next);
    }

    fn commit_output(&mut self, next: OutputState) {
        if next.output {
            log::debug!("{}: output pulse at cycle {}", self.name, self.output.cycles());
        }
        self.output.commit(next);
    }

    /// Rising edge of the trigger clock alone.
    pub fn tick_trigger(&mut self, trigger: bool) {
        let next = self.eval_trigger(trigger);
        self.commit_trigger(next, trigger);
    }

    /// Rising edge of the output clock alone.
    pub fn tick_output(&mut self) {
        let next = self.output.eval(self.trigger.state().trigger_pulse_detected);
        self.commit_output(next);
    }

    /// Applies the domains rising in `edges`. When both rise at once, both are evaluated from
    /// pre-edge registers before either commits.
    pub fn tick(&mut self, edges: &Edges, trigger: bool) {
        let trigger_next = self.trigger.is_clocked_by(edges).then(|| self.eval_trigger(trigger));
        let output_next =
            self.output.is_clocked_by(edges).then(|| self.output.eval(self.trigger.state().trigger_pulse_detected));

        if let Some(next) = trigger_next {
            self.commit_trigger(next, trigger);
        }
        if let Some(next) = output_next {
            self.commit_output(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs the synchronizer on a single clock, triggering at the given cycles, and returns the
    /// trace sampled before every edge.
    fn run_shared_clock(triggers: &[u64], cycles: u64) -> (PulseSynchronizer, Trace) {
        let mut sim = Simulator::new();
        let clk = sim.add_clock(Clock::new("clk", 10)).unwrap();
        let mut sync = PulseSynchronizer::new("pulse", clk, clk);
        let mut trace = Trace::new("top");

        for cycle in 0..cycles {
            trace.probe(cycle, "busy", sync.busy());
            trace.probe(cycle, "output", sync.output());
            let edges = sim.step().unwrap();
            sync.tick(&edges, triggers.contains(&cycle));
        }
        (sync, trace)
    }

    #[test]
    fn single_trigger_round_trip() {
        let (sync, trace) = run_shared_clock(&[0], 15);
        assert_eq!(trace.wave("busy").unwrap(), "01...........0.");
        assert_eq!(trace.wave("output").unwrap(), "0...10.........");
        assert_eq!(sync.accepted_triggers(), 1);
        assert_eq!(sync.dropped_triggers(), 0);
    }

    #[test]
    fn trigger_while_busy_is_dropped() {
        let (sync, trace) = run_shared_clock(&[0, 2, 12], 20);
        assert_eq!(trace.samples("output").unwrap().iter().sum::<u128>(), 1);
        assert_eq!(sync.accepted_triggers(), 1);
        assert_eq!(sync.dropped_triggers(), 2);
        assert!(!sync.busy());
    }

    #[test]
    fn trigger_after_release_is_accepted() {
        let (sync, trace) = run_shared_clock(&[0, 13], 30);
        assert_eq!(trace.samples("output").unwrap().iter().sum::<u128>(), 2);
        assert_eq!(sync.accepted_triggers(), 2);
        assert_eq!(sync.dropped_triggers(), 0);
    }

    #[test]
    fn domains_tick_independently() {
        let mut sim = Simulator::new();
        let trigger_clk = sim.add_clock(Clock::new("trigger", 10)).unwrap();
        let output_clk = sim.add_clock(Clock::new("output", 10).with_phase(5)).unwrap();
        let mut sync = PulseSynchronizer::new("pulse", trigger_clk, output_clk);

        sync.tick_trigger(true);
        assert!(sync.busy() && sync.trigger_state().trigger_pulse_detected);

        // The request needs two output edges to reach the pipeline tail, and one more to pulse.
        sync.tick_output();
        sync.tick_output();
        assert!(!sync.output());
        sync.tick_output();
        assert!(sync.output());
        sync.tick_output();
        assert!(!sync.output());
        assert!(sync.output_state().pipeline.tail());

        // Acknowledge.
        sync.tick_trigger(false);
        sync.tick_trigger(false);
        assert!(sync.trigger_state().acknowledge.tail());
        sync.tick_trigger(false);
        assert!(!sync.trigger_state().trigger_pulse_detected);
        assert!(sync.busy());
    }

    #[test]
    fn registers_are_traceable() {
        let mut trace = Trace::new("top");
        trace.probe(0, "trigger", TriggerState::default());
        trace.probe(0, "output", OutputState::default());
        assert_eq!(TriggerState::WIDTH, 2 + ACK_DEPTH);
        assert_eq!(
            trace.names().collect::<Vec<_>>(),
            vec![
                "trigger_trigger_pulse_detected",
                "trigger_busy",
                "trigger_acknowledge",
                "output_pipeline",
                "output_output"
            ]
        );
    }
}
