//! Clock domains.

use std::fmt;

/// Identifier of a clock registered in a [`Simulator`](crate::Simulator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockId(pub(crate) usize);

impl ClockId {
    /// Index of the clock in registration order.
    pub fn index(self) -> usize { self.0 }
}

impl fmt::Display for ClockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "clk#{}", self.index()) }
}

/// Independent periodic clock source.
///
/// Rising edges occur at `phase + k * period` for `k = 0, 1, 2, ...`. Times are in abstract
/// units (the VCD writer labels them `1ps`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    name: String,
    period: u64,
    phase: u64,
}

impl Clock {
    /// Creates a clock whose first rising edge is at time 0.
    pub fn new(name: &str, period: u64) -> Self { Self { name: name.to_string(), period, phase: 0 } }

    /// Delays every rising edge by `phase`.
    #[must_use]
    pub fn with_phase(self, phase: u64) -> Self { Self { phase, ..self } }

    /// Clock name.
    pub fn name(&self) -> &str { &self.name }

    /// Clock period.
    pub fn period(&self) -> u64 { self.period }

    /// Time of the first rising edge.
    pub fn phase(&self) -> u64 { self.phase }

    /// Time of the `k`-th rising edge, or `None` past the end of the time axis.
    pub fn edge_time(&self, k: u64) -> Option<u64> { k.checked_mul(self.period)?.checked_add(self.phase) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_periodic() {
        let clock = Clock::new("read", 10).with_phase(3);
        assert_eq!(clock.name(), "read");
        assert_eq!(clock.edge_time(0), Some(3));
        assert_eq!(clock.edge_time(4), Some(43));
    }

    #[test]
    fn edge_time_saturates_to_none() {
        let clock = Clock::new("slow", u64::MAX / 2).with_phase(2);
        assert_eq!(clock.edge_time(1), Some(u64::MAX / 2 + 2));
        assert_eq!(clock.edge_time(2), None);
        assert_eq!(Clock::new("fast", 1).edge_time(u64::MAX), Some(u64::MAX));
    }
}
