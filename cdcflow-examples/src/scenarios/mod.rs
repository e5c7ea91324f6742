pub mod bit_sync;
pub mod paced_reader;
pub mod pulse;
