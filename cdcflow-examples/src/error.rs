use cdcflow::{SimError, TraceError};
use cdcflow_std::{DoubleBufferArrayError, FifoModelError, ReaderError};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error(transparent)]
    Reader(#[from] ReaderError),

    #[error(transparent)]
    DoubleBufferArray(#[from] DoubleBufferArrayError),

    #[error(transparent)]
    FifoModel(#[from] FifoModelError),
}
