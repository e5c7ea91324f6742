//! Finite state machine (Moore machine) clocked by one domain.

use std::fmt::Debug;

use crate::*;

/// Next-state logic of a clocked process.
///
/// The FSM is described by `next`, which computes the registers after a rising edge from the
/// inputs sampled at that edge and the registers before it. Outputs are read from the registers.
pub trait Fsm: Debug {
    /// Values sampled at the rising edge.
    type Input;

    /// Registers.
    type State: Signal;

    /// Computes the next-cycle state.
    fn next(&self, input: Self::Input, state: &Self::State) -> Self::State;
}

/// Registers of an [`Fsm`], written only by the process of the clock that owns them.
///
/// A tick is split into [`Process::eval`] and [`Process::commit`] so that processes of different
/// domains rising at the same instant all observe pre-edge values.
#[derive(Debug)]
pub struct Process<M: Fsm> {
    /// Module name.
    module_name: String,
    /// Owning clock.
    clock: ClockId,
    /// Next-state logic.
    logic: M,
    /// Current registers.
    state: M::State,
    /// Number of committed edges.
    cycles: u64,
}

impl<M: Fsm> Process<M> {
    /// Creates a new process with registers initialised to `init`.
    pub fn new(module_name: &str, clock: ClockId, logic: M, init: M::State) -> Self {
        Self { module_name: module_name.to_string(), clock, logic, state: init, cycles: 0 }
    }

    /// Module name.
    pub fn module_name(&self) -> &str { &self.module_name }

    /// Owning clock.
    pub fn clock(&self) -> ClockId { self.clock }

    /// Current registers.
    pub fn state(&self) -> &M::State { &self.state }

    /// Number of rising edges this process has seen.
    pub fn cycles(&self) -> u64 { self.cycles }

    /// Returns `true` if the owning clock rises in `edges`.
    pub fn is_clocked_by(&self, edges: &Edges) -> bool { edges.contains(self.clock) }

    /// Computes the registers after the next rising edge without committing them.
    pub fn eval(&self, input: M::Input) -> M::State { self.logic.next(input, &self.state) }

    /// Commits registers computed by [`Process::eval`].
    pub fn commit(&mut self, next: M::State) {
        self.state = next;
        self.cycles += 1;
    }

    /// Evaluates and commits one rising edge.
    pub fn tick(&mut self, input: M::Input) {
        let next = self.eval(input);
        self.commit(next);
    }

    /// Ticks only if the owning clock rises in `edges`. Returns whether it ticked.
    pub fn tick_on(&mut self, edges: &Edges, input: M::Input) -> bool {
        if self.is_clocked_by(edges) {
            self.tick(input);
            true
        } else {
            false
        }
    }
}
