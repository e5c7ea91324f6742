//! Multi-clock edge scheduler.

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::*;

/// Maximum number of clocks in one simulator.
pub const MAX_CLOCKS: usize = 8;

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("clock `{name}` has a zero period")]
    ZeroPeriod { name: String },

    #[error("there are too many clocks (at most {} are supported)", MAX_CLOCKS)]
    TooManyClocks,

    #[error("there are no clocks to advance")]
    NoClocks,

    #[error("clock `{name}` has run past the end of simulated time")]
    TimeOverflow { name: String },
}

/// Set of clocks rising at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edges {
    time: u64,
    clocks: ArrayVec<ClockId, MAX_CLOCKS>,
}

impl Edges {
    /// Creates an edge set. Duplicated clocks are ignored.
    pub fn new(time: u64, clocks: &[ClockId]) -> Self {
        let mut inner = ArrayVec::new();
        for clock in clocks {
            if !inner.contains(clock) {
                inner.push(*clock);
            }
        }
        Self { time, clocks: inner }
    }

    /// Time of the edges.
    pub fn time(&self) -> u64 { self.time }

    /// Returns `true` if `clock` rises at this instant.
    pub fn contains(&self, clock: ClockId) -> bool { self.clocks.contains(&clock) }

    /// Rising clocks in registration order.
    pub fn clocks(&self) -> &[ClockId] { &self.clocks }
}

#[derive(Debug)]
struct ClockState {
    clock: Clock,
    /// Number of rising edges produced so far.
    cycles: u64,
}

impl ClockState {
    fn next_edge(&self) -> Result<u64, SimError> {
        self.clock.edge_time(self.cycles).ok_or_else(|| SimError::TimeOverflow { name: self.clock.name().to_string() })
    }
}

/// Produces the rising edges of unrelated clocks in time order.
///
/// Callers read the outputs of their models, then tick every model with the returned [`Edges`].
#[derive(Debug, Default)]
pub struct Simulator {
    clocks: ArrayVec<ClockState, MAX_CLOCKS>,
    now: u64,
}

impl Simulator {
    /// Creates a simulator without clocks.
    pub fn new() -> Self { Self::default() }

    /// Registers a clock.
    pub fn add_clock(&mut self, clock: Clock) -> Result<ClockId, SimError> {
        if clock.period() == 0 {
            return Err(SimError::ZeroPeriod { name: clock.name().to_string() });
        }
        let id = ClockId(self.clocks.len());
        log::debug!("{}: `{}` period {} phase {}", id, clock.name(), clock.period(), clock.phase());
        self.clocks.try_push(ClockState { clock, cycles: 0 }).map_err(|_| SimError::TooManyClocks)?;
        Ok(id)
    }

    /// Advances to the earliest pending rising edge.
    pub fn step(&mut self) -> Result<Edges, SimError> {
        let next_edges =
            self.clocks.iter().map(ClockState::next_edge).collect::<Result<ArrayVec<u64, MAX_CLOCKS>, _>>()?;
        let time = next_edges.iter().copied().min().ok_or(SimError::NoClocks)?;

        let mut clocks = ArrayVec::new();
        for (index, (state, next_edge)) in self.clocks.iter_mut().zip(next_edges).enumerate() {
            if next_edge == time {
                state.cycles += 1;
                clocks.push(ClockId(index));
            }
        }

        self.now = time;
        Ok(Edges { time, clocks })
    }

    /// Time of the last produced edge.
    pub fn now(&self) -> u64 { self.now }

    /// Number of rising edges `clock` has produced.
    pub fn cycles(&self, clock: ClockId) -> u64 { self.clocks[clock.index()].cycles }

    /// Returns the registered clock.
    pub fn clock(&self, clock: ClockId) -> &Clock { &self.clocks[clock.index()].clock }
}
