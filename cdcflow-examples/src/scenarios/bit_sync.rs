//! Level flags toggling in one domain, synchronized into another.

use cdcflow::*;
use cdcflow_std::DoubleBufferArray;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::Error;

pub fn run(config: &Config) -> Result<Trace, Error> {
    config.validate()?;
    let bit = &config.bit;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut sim = Simulator::new();
    let src_clk = sim.add_clock(Clock::new("src_clk", bit.source_period))?;
    let dst_clk = sim.add_clock(Clock::new("dst_clk", bit.period).with_phase(bit.period / 2))?;

    let mut flags = vec![false; bit.n_signals];
    let mut array = DoubleBufferArray::new("flags", dst_clk, bit.n_signals, false)?;
    let mut trace = Trace::new("bit_sync");
    let mut changes = 0;

    while sim.cycles(dst_clk) < config.cycles {
        let edges = sim.step()?;
        for (index, (flag, out)) in flags.iter().zip(array.outputs()).enumerate() {
            trace.probe(edges.time(), &format!("flag_{}", index), *flag);
            trace.probe(edges.time(), &format!("flag_{}_sync", index), out);
        }

        array.tick_on(&edges, &flags);
        if edges.contains(src_clk) {
            for flag in flags.iter_mut() {
                if rng.gen_bool(bit.toggle_probability) {
                    *flag = !*flag;
                    changes += 1;
                }
            }
        }
    }

    log::info!(
        "bit_sync: {} flags, {} source edges, {} destination edges, {} toggles",
        array.n_signals(),
        sim.cycles(src_clk),
        sim.cycles(dst_clk),
        changes
    );
    Ok(trace)
}
