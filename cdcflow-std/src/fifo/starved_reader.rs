//! Paced reader of a starved FIFO.
//!
//! The reader drains a FIFO whose write clock is slower than its read clock. Once the FIFO
//! reports non-empty it waits until `buffer_n_words` words should have accumulated, then pulses
//! `fifo_read_enable` once every `n_cycles_per_word` cycles until the FIFO reports empty again.
//! The backlog absorbs slight phase drift between the write and read clocks.

use cdcflow::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted `buffer_n_words`.
pub const MAX_BUFFER_N_WORDS: usize = 8;

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReaderError {
    #[error("data_in ({data_in} bits) and data_out ({data_out} bits) should be the same width")]
    WidthMismatch { data_in: usize, data_out: usize },

    #[error("n_cycles_per_word should be greater than 0")]
    ZeroCyclesPerWord,

    #[error(
        "buffer_n_words ({buffer_n_words}) is intended as a small buffer to overcome slight phase alignment \
         discrepancies between the write and read clocks; it is limited to {max} to protect against data loss"
    )]
    BufferTooLarge { buffer_n_words: usize, max: usize },
}

/// Pacing parameters of a [`PacedFifoReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReaderConfig {
    /// Read one word every `n_cycles_per_word` cycles.
    pub n_cycles_per_word: usize,

    /// Words to let accumulate before reading starts.
    #[serde(default)]
    pub buffer_n_words: usize,
}

impl ReaderConfig {
    /// Creates a new configuration. See [`ReaderConfig::validate`].
    pub fn new(n_cycles_per_word: usize, buffer_n_words: usize) -> Self { Self { n_cycles_per_word, buffer_n_words } }

    /// Checks `n_cycles_per_word >= 1` and `buffer_n_words <= MAX_BUFFER_N_WORDS`.
    pub fn validate(&self) -> Result<(), ReaderError> {
        if self.n_cycles_per_word < 1 {
            return Err(ReaderError::ZeroCyclesPerWord);
        }
        if self.buffer_n_words > MAX_BUFFER_N_WORDS {
            return Err(ReaderError::BufferTooLarge { buffer_n_words: self.buffer_n_words, max: MAX_BUFFER_N_WORDS });
        }
        Ok(())
    }

    /// Cycles to wait after the FIFO becomes non-empty.
    pub fn buffer_n_cycles(&self) -> usize { self.buffer_n_words.saturating_mul(self.n_cycles_per_word) }
}

/// Reader state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Signal)]
pub enum ReaderState {
    /// Letting the FIFO fill up.
    AwaitingBuffer,
    /// Reading one word per period.
    Read,
}

/// Ports sampled at the rising edge.
#[derive(Debug, Clone, Copy, Signal)]
pub struct ReaderInput<const N: usize> {
    /// Word presented by the FIFO.
    pub data_in: Word<N>,
    /// `data_in` holds a freshly read word.
    pub data_in_valid: bool,
    /// The FIFO has nothing to read.
    pub fifo_empty: bool,
}

/// Reader registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Signal)]
pub struct State<const N: usize> {
    /// State machine.
    pub state: ReaderState,
    /// Cycle within the current word period.
    pub count: u64,
    /// Cycles waited in [`ReaderState::AwaitingBuffer`].
    pub buffer_count: u64,
    /// Read enable presented to the FIFO.
    pub fifo_read_enable: bool,
    /// Last valid word.
    pub data_out: Word<N>,
}

/// Next-state logic of the reader.
#[derive(Debug, Clone, Copy)]
pub struct ReaderLogic<const N: usize> {
    n_cycles_per_word: u64,
    buffer_n_cycles: u64,
    /// State held while the FIFO is empty.
    empty_state: ReaderState,
}

impl<const N: usize> ReaderLogic<N> {
    fn new(config: &ReaderConfig) -> Self {
        let buffer_n_cycles = config.buffer_n_cycles() as u64;
        Self {
            n_cycles_per_word: config.n_cycles_per_word as u64,
            buffer_n_cycles,
            empty_state: if buffer_n_cycles == 0 { ReaderState::Read } else { ReaderState::AwaitingBuffer },
        }
    }
}

impl<const N: usize> Fsm for ReaderLogic<N> {
    type Input = ReaderInput<N>;
    type State = State<N>;

    fn next(&self, input: ReaderInput<N>, state: &State<N>) -> State<N> {
        let mut next = *state;

        if input.data_in_valid {
            next.data_out = input.data_in;
        }

        match state.state {
            ReaderState::AwaitingBuffer => {
                if state.buffer_count + 2 >= self.buffer_n_cycles {
                    next.count = 0;
                    next.state = ReaderState::Read;
                } else {
                    next.buffer_count = state.buffer_count + 1;
                }
            }
            ReaderState::Read => {
                next.count = if state.count + 1 >= self.n_cycles_per_word { 0 } else { state.count + 1 };
                next.fifo_read_enable = state.count == 0;
            }
        }

        if input.fifo_empty {
            next.fifo_read_enable = false;
            next.buffer_count = 0;
            next.count = 0;
            next.state = self.empty_state;
        }

        next
    }
}

/// Reads a starved FIFO at a fixed pace.
///
/// `IN` and `OUT` are the widths of `data_in` and `data_out`, which must agree.
///
/// The reader has no reset: its registers start in the empty-state and only `fifo_empty` brings
/// them back there. A FIFO generated without a reset needs none either; if one is added, its
/// asynchronous reset should be held for at least 3 cycles of the slower clock, with at least 6
/// such cycles between resets, and both enables low during reset.
#[derive(Debug)]
pub struct PacedFifoReader<const IN: usize, const OUT: usize> {
    config: ReaderConfig,
    process: Process<ReaderLogic<OUT>>,
}

impl<const IN: usize, const OUT: usize> PacedFifoReader<IN, OUT> {
    /// Creates a reader. Fails on mismatched widths or an invalid `config`.
    pub fn new(name: &str, clock: ClockId, config: ReaderConfig) -> Result<Self, ReaderError> {
        if IN != OUT {
            return Err(ReaderError::WidthMismatch { data_in: IN, data_out: OUT });
        }
        config.validate()?;

        let logic = ReaderLogic::new(&config);
        let init = State {
            state: logic.empty_state,
            count: 0,
            buffer_count: 0,
            fifo_read_enable: false,
            data_out: Word::default(),
        };
        log::debug!(
            "{}: {} cycles per word, {} buffered words, starting in {:?}",
            name,
            config.n_cycles_per_word,
            config.buffer_n_words,
            init.state
        );

        Ok(Self { config, process: Process::new(name, clock, logic, init) })
    }

    /// Instance name.
    pub fn name(&self) -> &str { self.process.module_name() }

    /// Reader clock.
    pub fn clock(&self) -> ClockId { self.process.clock() }

    /// Pacing parameters.
    pub fn config(&self) -> &ReaderConfig { &self.config }

    /// Cycles waited after the FIFO becomes non-empty.
    pub fn buffer_n_cycles(&self) -> usize { self.config.buffer_n_cycles() }

    /// Read enable presented to the FIFO.
    pub fn fifo_read_enable(&self) -> bool { self.process.state().fifo_read_enable }

    /// Last valid word read from the FIFO.
    pub fn data_out(&self) -> Word<OUT> { self.process.state().data_out }

    /// State machine.
    pub fn reader_state(&self) -> ReaderState { self.process.state().state }

    /// Every register.
    pub fn state(&self) -> &State<OUT> { self.process.state() }

    /// Samples the ports at a rising edge of the reader clock.
    pub fn tick(&mut self, data_in: Word<IN>, data_in_valid: bool, fifo_empty: bool) {
        let before = self.reader_state();
        let input = ReaderInput { data_in: Word::new(data_in.value()), data_in_valid, fifo_empty };
        self.process.tick(input);

        let cycle = self.process.cycles();
        let after = self.reader_state();
        if before != after {
            log::debug!("{}: {:?} -> {:?} at cycle {}", self.name(), before, after, cycle);
        }
        if self.fifo_read_enable() {
            log::trace!("{}: read enable at cycle {}", self.name(), cycle);
        }
    }

    /// Ticks only if the reader clock rises in `edges`.
    pub fn tick_on(&mut self, edges: &Edges, data_in: Word<IN>, data_in_valid: bool, fifo_empty: bool) -> bool {
        if self.process.is_clocked_by(edges) {
            self.tick(data_in, data_in_valid, fifo_empty);
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
        sim.add_clock(Clock::new("rd_clk", 10)).unwrap()
    }

    /// Cycles during which `fifo_read_enable` is high, sampling before every edge. The FIFO is
    /// empty before cycle `first_non_empty` and never again.
    fn read_enable_cycles(config: ReaderConfig, first_non_empty: u64, cycles: u64) -> Vec<u64> {
        let mut reader = PacedFifoReader::<8, 8>::new("reader", clock(), config).unwrap();
        let mut high = vec![];
        for cycle in 0..cycles {
            if reader.fifo_read_enable() {
                high.push(cycle);
            }
            reader.tick(Word::new(0), false, cycle < first_non_empty);
        }
        high
    }

    #[test]
    fn buffered_reads_start_after_warm_up() {
        let config = ReaderConfig::new(4, 2);
        assert_eq!(config.buffer_n_cycles(), 8);
        assert_eq!(read_enable_cycles(config, 0, 20), vec![8, 12, 16]);
    }

    #[test]
    fn warm_up_is_counted_from_the_first_non_empty_edge() {
        assert_eq!(read_enable_cycles(ReaderConfig::new(4, 2), 5, 25), vec![13, 17, 21]);
    }

    #[test]
    fn unbuffered_reads_start_immediately() {
        assert_eq!(read_enable_cycles(ReaderConfig::new(3, 0), 0, 10), vec![1, 4, 7]);
        assert_eq!(read_enable_cycles(ReaderConfig::new(1, 0), 0, 4), vec![1, 2, 3]);
    }

    #[test]
    fn state_transitions() {
        let mut reader = PacedFifoReader::<8, 8>::new("reader", clock(), ReaderConfig::new(4, 2)).unwrap();
        assert_eq!(reader.reader_state(), ReaderState::AwaitingBuffer);
        for _ in 0..6 {
            reader.tick(Word::new(0), false, false);
            assert_eq!(reader.reader_state(), ReaderState::AwaitingBuffer);
        }
        reader.tick(Word::new(0), false, false);
        assert_eq!(reader.reader_state(), ReaderState::Read);
        assert_eq!(reader.state().count, 0);

        reader.tick(Word::new(0), false, false);
        assert!(reader.fifo_read_enable());

        reader.tick(Word::new(0), false, true);
        assert_eq!(reader.reader_state(), ReaderState::AwaitingBuffer);
        assert!(!reader.fifo_read_enable());
        assert_eq!((reader.state().count, reader.state().buffer_count), (0, 0));
    }

    #[test]
    fn empty_fifo_stops_reading() {
        let mut reader = PacedFifoReader::<8, 8>::new("reader", clock(), ReaderConfig::new(2, 0)).unwrap();
        reader.tick(Word::new(0), false, false);
        assert!(reader.fifo_read_enable());
        for _ in 0..5 {
            reader.tick(Word::new(0), false, true);
            assert!(!reader.fifo_read_enable());
            assert_eq!(reader.reader_state(), ReaderState::Read);
        }
    }

    #[test]
    fn data_out_holds_last_valid_word() {
        let mut reader = PacedFifoReader::<8, 8>::new("reader", clock(), ReaderConfig::new(2, 1)).unwrap();
        assert_eq!(reader.data_out().value(), 0);
        reader.tick(Word::new(0x5a), true, true);
        assert_eq!(reader.data_out().value(), 0x5a);
        reader.tick(Word::new(0x11), false, false);
        assert_eq!(reader.data_out().value(), 0x5a);
        reader.tick(Word::new(0x22), true, false);
        assert_eq!(reader.data_out().value(), 0x22);
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let clk = clock();
        assert_eq!(
            PacedFifoReader::<8, 8>::new("reader", clk, ReaderConfig::new(4, 9)).unwrap_err(),
            ReaderError::BufferTooLarge { buffer_n_words: 9, max: MAX_BUFFER_N_WORDS }
        );
        assert_eq!(
            PacedFifoReader::<8, 8>::new("reader", clk, ReaderConfig::new(0, 2)).unwrap_err(),
            ReaderError::ZeroCyclesPerWord
        );
        assert_eq!(
            PacedFifoReader::<8, 16>::new("reader", clk, ReaderConfig::new(4, 2)).unwrap_err(),
            ReaderError::WidthMismatch { data_in: 8, data_out: 16 }
        );
        assert!(PacedFifoReader::<8, 8>::new("reader", clk, ReaderConfig::new(1, MAX_BUFFER_N_WORDS)).is_ok());
    }

    #[test]
    fn registers_encode_state_in_one_bit() {
        assert_eq!(ReaderState::WIDTH, 1);
        assert_eq!(ReaderState::AwaitingBuffer.transl(), vec![false]);
        assert_eq!(ReaderState::Read.transl(), vec![true]);
        assert_eq!(State::<8>::WIDTH, 1 + 64 + 64 + 1 + 8);

        let reader = PacedFifoReader::<8, 8>::new("reader", clock(), ReaderConfig::new(4, 0)).unwrap();
        let bits = reader.state().transl();
        assert_eq!(bits.len(), State::<8>::WIDTH);
        assert!(bits[0]);
    }

    #[test]
    fn tick_on_follows_reader_clock() {
        let mut sim = Simulator::new();
        let wr_clk = sim.add_clock(Clock::new("wr_clk", 7)).unwrap();
        let rd_clk = sim.add_clock(Clock::new("rd_clk", 3)).unwrap();
        let mut reader = PacedFifoReader::<4, 4>::new("reader", rd_clk, ReaderConfig::new(2, 0)).unwrap();

        let mut ticks = 0;
        for _ in 0..20 {
            let edges = sim.step().unwrap();
            if reader.tick_on(&edges, Word::new(1), true, false) {
                ticks += 1;
            }
        }
        assert_eq!(ticks, sim.cycles(rd_clk));
        assert!(sim.cycles(wr_clk) < ticks);
        assert_eq!(reader.clock(), rd_clk);
        assert_eq!(reader.data_out().value(), 1);
    }
}
