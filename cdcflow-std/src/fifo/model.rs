//! Behavioral dual-clock FIFO.

use std::collections::VecDeque;

use cdcflow::*;
use thiserror::Error;

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FifoModelError {
    #[error("FIFO `{name}` should have a non-zero depth")]
    ZeroDepth { name: String },
}

/// Dual-clock FIFO with registered read ports, for driving readers in simulation.
///
/// On a write edge a presented word is pushed unless the FIFO is full (an overflow). On a read
/// edge with `read_enable` high the head word is popped into `data` and `data_valid` is raised;
/// reading while `empty` is an underrun. `empty` is registered at each read edge after the pop,
/// so a word written at the same instant shows up one read edge later.
#[derive(Debug)]
pub struct FifoModel<const N: usize> {
    name: String,
    write_clock: ClockId,
    read_clock: ClockId,
    depth: usize,
    words: VecDeque<Word<N>>,
    empty: bool,
    data: Word<N>,
    data_valid: bool,
    overflows: u64,
    underruns: u64,
}

impl<const N: usize> FifoModel<N> {
    /// Creates an empty FIFO holding at most `depth` words.
    pub fn new(name: &str, write_clock: ClockId, read_clock: ClockId, depth: usize) -> Result<Self, FifoModelError> {
        if depth == 0 {
            return Err(FifoModelError::ZeroDepth { name: name.to_string() });
        }
        Ok(Self {
            name: name.to_string(),
            write_clock,
            read_clock,
            depth,
            words: VecDeque::with_capacity(depth),
            empty: true,
            data: Word::default(),
            data_valid: false,
            overflows: 0,
            underruns: 0,
        })
    }

    /// Instance name.
    pub fn name(&self) -> &str { &self.name }

    /// Capacity in words.
    pub fn depth(&self) -> usize { self.depth }

    /// Read-side empty flag.
    pub fn empty(&self) -> bool { self.empty }

    /// Write-side full flag.
    pub fn full(&self) -> bool { self.words.len() >= self.depth }

    /// Last popped word.
    pub fn data(&self) -> Word<N> { self.data }

    /// `data` was popped at the last read edge.
    pub fn data_valid(&self) -> bool { self.data_valid }

    /// Stored words.
    pub fn len(&self) -> usize { self.words.len() }

    /// Returns `true` if no word is stored.
    pub fn is_empty(&self) -> bool { self.words.is_empty() }

    /// Writes dropped because the FIFO was full.
    pub fn overflows(&self) -> u64 { self.overflows }

    /// Reads requested while the FIFO was empty.
    pub fn underruns(&self) -> u64 { self.underruns }

    /// Applies the read and write edges in `edges`.
    pub fn tick(&mut self, edges: &Edges, write: Option<Word<N>>, read_enable: bool) {
        if edges.contains(self.read_clock) {
            let popped = if read_enable && !self.empty { self.words.pop_front() } else { None };
            if read_enable && popped.is_none() {
                self.underruns += 1;
                log::warn!("{}: read while empty at time {}", self.name, edges.time());
            }
            self.data_valid = popped.is_some();
            if let Some(word) = popped {
                self.data = word;
            }
            self.empty = self.words.is_empty();
        }

        if edges.contains(self.write_clock) {
            if let Some(word) = write {
                if self.full() {
                    self.overflows += 1;
                    log::warn!("{}: write of {} while full at time {}", self.name, word, edges.time());
                } else {
                    self.words.push_back(word);
                }
            }
        }
    }
}
