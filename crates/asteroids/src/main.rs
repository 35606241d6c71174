//! Headless asteroid arena
//!
//! Runs the simulation against the recording renderer with a scripted pilot.
//!
//! ```text
//! asteroids [config.toml|config.ron] [--ticks N] [--realtime]
//! ```

use arena_engine::config::Config;
use arena_engine::foundation::logging;
use arena_engine::foundation::time::{FixedTimestep, Timer};
use arena_engine::input::{InputMap, InputSource, KeyCode, ScriptedInput};
use arena_engine::render::HeadlessRenderer;
use asteroids::config::GameConfig;
use asteroids::controller::SharedRenderer;
use asteroids::game::Game;
use std::cell::RefCell;
use std::process::ExitCode;
use std::rc::Rc;

const DEFAULT_CONFIG: &str = "asteroids.toml";
const DEFAULT_TICKS: u64 = 30 * 60;

struct Args {
    config: String,
    ticks: u64,
    realtime: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config: DEFAULT_CONFIG.to_string(),
        ticks: DEFAULT_TICKS,
        realtime: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--ticks" => {
                let value = iter.next().ok_or("--ticks needs a value")?;
                args.ticks = value
                    .parse()
                    .map_err(|e| format!("bad tick count {:?}: {}", value, e))?;
            }
            "--realtime" => args.realtime = true,
            flag if flag.starts_with("--") => return Err(format!("unknown flag {}", flag)),
            path => args.config = path.to_string(),
        }
    }
    Ok(args)
}

/// Circles left while firing, then thrusts for a while
fn demo_pilot() -> ScriptedInput {
    ScriptedInput::new(InputMap::default())
        .press(0, KeyCode::Space)
        .press(15, KeyCode::Left)
        .release(75, KeyCode::Left)
        .press(90, KeyCode::Up)
        .release(120, KeyCode::Up)
        .press(150, KeyCode::Right)
        .release(240, KeyCode::Right)
}

/// Ticks to run now: what the clock owes, capped by what the limit leaves
fn ticks_due(owed: u32, ran: u64, limit: u64) -> u64 {
    u64::from(owed).min(limit.saturating_sub(ran))
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = GameConfig::load_or_default(&args.config)?;
    logging::init_with_default(&config.simulation.log_level);
    log::info!("Starting asteroid arena ({} ticks max)", args.ticks);

    let recorder = Rc::new(RefCell::new(HeadlessRenderer::new()));
    let renderer: SharedRenderer = recorder.clone();
    let mut game = Game::new(&config, renderer)?;
    let mut pilot = demo_pilot();

    let tick = config.simulation.tick;
    let mut stepper = FixedTimestep::new(tick);
    let mut timer = Timer::new();

    while !game.is_done() && game.ticks() < args.ticks {
        let due = if args.realtime {
            std::thread::sleep(std::time::Duration::from_secs_f32(tick / 4.0));
            timer.update();
            stepper.advance(timer.delta_time())
        } else {
            1
        };

        for _ in 0..ticks_due(due, game.ticks(), args.ticks) {
            for event in pilot.poll() {
                game.handle_input(event);
            }
            game.tick(tick)?;
            if game.is_done() {
                break;
            }
        }
    }

    let recorder = recorder.borrow();
    for label in recorder.labels() {
        log::info!("{}", label.text);
    }
    log::info!(
        "Finished after {} ticks, {:.2}s simulated, {} frames drawn",
        game.ticks(),
        game.world().elapsed(),
        recorder.frame_count()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("usage: asteroids [config] [--ticks N] [--realtime]");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_up_burst_stops_at_the_limit() {
        assert_eq!(ticks_due(5, 8, 10), 2);
        assert_eq!(ticks_due(5, 10, 10), 0);
        assert_eq!(ticks_due(3, 0, 10), 3);
    }
}
