//! Paced reader draining a FIFO written by a slower clock.

use cdcflow::*;
use cdcflow_std::fifo::starved_reader::ReaderInput;
use cdcflow_std::{FifoModel, PacedFifoReader};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::Error;

const WIDTH: usize = 16;

pub fn run(config: &Config) -> Result<Trace, Error> {
    let fifo_config = &config.fifo;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut sim = Simulator::new();
    let wr_clk = sim.add_clock(Clock::new("wr_clk", fifo_config.write_period))?;
    let rd_clk = sim.add_clock(Clock::new("rd_clk", fifo_config.read_period).with_phase(fifo_config.read_period / 2))?;

    let mut fifo = FifoModel::<WIDTH>::new("fifo", wr_clk, rd_clk, fifo_config.depth)?;
    let mut reader = PacedFifoReader::<WIDTH, WIDTH>::new("reader", rd_clk, config.reader)?;
    let mut trace = Trace::new("paced_reader");
    let mut next = 1;
    let mut words = 0;

    while sim.cycles(rd_clk) < config.cycles {
        let edges = sim.step()?;

        // Occasional gaps in the write stream.
        let write = rng.gen_bool(0.95).then(|| Word::<WIDTH>::from(next));
        let input = ReaderInput { data_in: fifo.data(), data_in_valid: fifo.data_valid(), fifo_empty: fifo.empty() };
        let read_enable = reader.fifo_read_enable();

        trace.probe(edges.time(), "fifo", input);
        trace.probe(edges.time(), "reader", *reader.state());

        fifo.tick(&edges, write, read_enable);
        if edges.contains(wr_clk) && write.is_some() {
            next += 1;
        }
        if reader.tick_on(&edges, input.data_in, input.data_in_valid, input.fifo_empty) && input.data_in_valid {
            words += 1;
        }
    }

    log::info!(
        "paced_reader: {} words written, {} read, {} left in the FIFO, {} underruns, {} overflows",
        next - 1,
        words,
        fifo.len(),
        fifo.underruns(),
        fifo.overflows()
    );
    Ok(trace)
}
