mod config;
mod error;
mod scenarios;

use config::Config;
pub use error::Error;

fn main() -> Result<(), Error> {
    env_logger::init();

    let config = Config::load()?;
    let scenarios = [
        ("bit_sync", scenarios::bit_sync::run as fn(&Config) -> Result<cdcflow::Trace, Error>),
        ("pulse", scenarios::pulse::run),
        ("paced_reader", scenarios::paced_reader::run),
    ];

    for (name, run) in scenarios {
        let trace = run(&config)?;
        let path = config.output_dir.join(format!("{}.vcd", name));
        trace.save(&path)?;
        log::info!("{}: wrote {}", name, path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_config() -> Config { Config { cycles: 60, ..Config::default() } }

    #[test]
    fn scenarios_produce_traces() {
        let config = short_config();
        for (run, name) in [
            (scenarios::bit_sync::run as fn(&Config) -> Result<cdcflow::Trace, Error>, "flag_0_sync"),
            (scenarios::pulse::run, "busy"),
            (scenarios::paced_reader::run, "reader_fifo_read_enable"),
        ] {
            let trace = run(&config).unwrap();
            assert!(trace.wave(name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn invalid_reader_config_is_reported() {
        let mut config = short_config();
        config.reader.buffer_n_words = 9;
        assert!(matches!(scenarios::paced_reader::run(&config), Err(Error::Reader(_))));
    }

    #[test]
    fn out_of_range_probability_is_reported() {
        let mut config = short_config();
        config.bit.toggle_probability = 1.5;
        assert!(matches!(scenarios::bit_sync::run(&config), Err(Error::Config(_))));

        let mut config = short_config();
        config.pulse.trigger_probability = -0.5;
        assert!(matches!(scenarios::pulse::run(&config), Err(Error::Config(_))));
    }

    #[test]
    fn zero_period_is_reported() {
        let mut config = short_config();
        config.pulse.output_period = 0;
        assert!(matches!(scenarios::pulse::run(&config), Err(Error::Sim(_))));
    }
}
