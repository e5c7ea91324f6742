//! Random triggers carried across two unrelated clocks.

use cdcflow::*;
use cdcflow_std::PulseSynchronizer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::Error;

pub fn run(config: &Config) -> Result<Trace, Error> {
    config.validate()?;
    let pulse = &config.pulse;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut sim = Simulator::new();
    let trigger_clk = sim.add_clock(Clock::new("trigger_clk", pulse.trigger_period))?;
    let output_clk = sim.add_clock(Clock::new("output_clk", pulse.output_period).with_phase(pulse.output_period / 3))?;

    let mut sync = PulseSynchronizer::new("pulse", trigger_clk, output_clk);
    let mut trace = Trace::new("pulse");
    let mut pulses = 0;

    while sim.cycles(output_clk) < config.cycles {
        let edges = sim.step()?;
        let trigger = edges.contains(trigger_clk) && rng.gen_bool(pulse.trigger_probability);

        trace.probe(edges.time(), "trigger", trigger);
        trace.probe(edges.time(), "busy", sync.busy());
        trace.probe(edges.time(), "output", sync.output());
        trace.probe(edges.time(), "trigger_domain", *sync.trigger_state());
        trace.probe(edges.time(), "output_domain", *sync.output_state());

        sync.tick(&edges, trigger);
        if edges.contains(output_clk) && sync.output() {
            pulses += 1;
        }
    }

    log::info!(
        "pulse: {} triggers accepted, {} dropped while busy, {} output pulses",
        sync.accepted_triggers(),
        sync.dropped_triggers(),
        pulses
    );
    if sync.busy() {
        log::info!("pulse: a transfer was still in flight at the end of the run");
    }
    Ok(trace)
}
