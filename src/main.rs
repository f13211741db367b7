//! Stealth Flight entry point
//!
//! Headless runner: the autopilot flies a run and the horizon OSD is logged.
//!
//! Usage: `stealth-flight [TUNING.json] [--seed N] [--seconds S] [--realtime]`

use std::time::Instant;

use stealth_flight::consts::DEMO_DT;
use stealth_flight::platform::FrameClock;
use stealth_flight::sim::{Autopilot, FlightState, GateEvent, PassOutcome, tick};
use stealth_flight::{HorizonOsd, Tuning};

/// Command-line options
struct Options {
    tuning_path: Option<String>,
    seed: u64,
    seconds: f32,
    realtime: bool,
}

impl Options {
    fn parse() -> Result<Self, String> {
        let mut options = Options {
            tuning_path: None,
            seed: 0x5EED,
            seconds: 60.0,
            realtime: false,
        };

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => {
                    let value = args.next().ok_or("--seed needs a value")?;
                    options.seed = value
                        .parse()
                        .map_err(|e| format!("bad --seed '{value}': {e}"))?;
                }
                "--seconds" => {
                    let value = args.next().ok_or("--seconds needs a value")?;
                    options.seconds = value
                        .parse()
                        .map_err(|e| format!("bad --seconds '{value}': {e}"))?;
                }
                "--realtime" => options.realtime = true,
                other if other.starts_with("--") => {
                    return Err(format!("unknown option '{other}'"));
                }
                path => options.tuning_path = Some(path.to_string()),
            }
        }

        Ok(options)
    }
}

fn main() {
    env_logger::init();
    log::info!("Stealth Flight (headless) starting...");

    let options = match Options::parse() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("usage: stealth-flight [TUNING.json] [--seed N] [--seconds S] [--realtime]");
            std::process::exit(2);
        }
    };

    let tuning = match &options.tuning_path {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };

    let mut state = FlightState::new(options.seed, &tuning);
    let mut osd = HorizonOsd::new();
    let pilot = Autopilot::default();
    let mut clock = FrameClock::new();
    log::info!("Run initialized with seed: {}", options.seed);

    while state.elapsed < options.seconds {
        let dt = if options.realtime {
            std::thread::sleep(clock.remaining(DEMO_DT, Instant::now()));
            clock.tick()
        } else {
            DEMO_DT
        };

        if !state.is_dead() {
            pilot.drive(&mut state);
        }
        tick(&mut state, dt, &mut osd);

        for event in state.gates.events() {
            match event {
                GateEvent::Passed {
                    slot,
                    outcome: PassOutcome::Clean,
                    ..
                } => log::info!(
                    "{:6.2}s gate {} clean (score {})",
                    state.elapsed,
                    slot,
                    state.score()
                ),
                GateEvent::Passed {
                    slot,
                    outcome: PassOutcome::Missed,
                    dx,
                    dy,
                } => log::info!(
                    "{:6.2}s gate {} missed (dx {:.2}, dy {:.2}), {} dots left",
                    state.elapsed,
                    slot,
                    dx,
                    dy,
                    osd.visible_dots()
                ),
                _ => {}
            }
        }
    }

    let stats = state.gates.stats();
    println!(
        "score {} | spawned {} clean {} missed {} untested {} | {}",
        state.score(),
        stats.spawned,
        stats.clean,
        stats.missed,
        stats.untested,
        if state.is_dead() { "crashed" } else { "still flying" }
    );
}
