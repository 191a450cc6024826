use orbswarm::prelude::*;
use simple_logger::SimpleLogger;

fn main() {
    if let Err(e) = SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
    {
        eprintln!("logger setup failed: {}", e);
    }

    if let Err(e) = Simulation::new(SwarmConfig::default()).run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
