//! FIFO readers and behavioral FIFOs.

pub mod model;
pub mod starved_reader;

pub use model::{FifoModel, FifoModelError};
pub use starved_reader::{PacedFifoReader, ReaderConfig, ReaderError, ReaderState, MAX_BUFFER_N_WORDS};
