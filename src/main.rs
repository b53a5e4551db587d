mod collision;
mod components;
mod config;
mod error;
mod ghost;
mod input;
mod level;
mod maze;
mod player;
mod round;
mod surface;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{self, Write};
use std::thread;
use std::time::Instant;

use crate::config::Config;
use crate::error::GameError;
use crate::input::{InputSource, Signal, TerminalInput};
use crate::round::Game;
use crate::surface::{Surface, TerminalSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    Quit,
    SurfaceLost,
}

fn main() -> Result<(), GameError> {
    let config = Config::from_env()?;
    init_logging(&config)?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    stdout.execute(Hide)?;

    let mut surface = TerminalSurface::new(io::stdout(), &config);
    let mut input = TerminalInput::new();
    let exit = run(&config, &mut surface, &mut input, &mut rng);
    log::info!("leaving game loop: {exit:?}");

    restore_terminal(&mut stdout);
    Ok(())
}

/// Undoes the session setup. Every step runs even when an earlier one
/// fails, since a lost terminal usually rejects the first write. Returns
/// how many steps failed.
fn restore_terminal(out: &mut impl Write) -> usize {
    let steps = [
        ("show cursor", out.execute(Show).map(|_| ())),
        ("disable mouse capture", out.execute(DisableMouseCapture).map(|_| ())),
        ("leave alternate screen", out.execute(LeaveAlternateScreen).map(|_| ())),
        ("disable raw mode", terminal::disable_raw_mode()),
    ];
    let mut failed = 0;
    for (step, result) in steps {
        if let Err(err) = result {
            log::warn!("terminal teardown: {step} failed: {err}");
            failed += 1;
        }
    }
    failed
}

/// The terminal belongs to the game, so logs only go somewhere when a log
/// file is configured or `RUST_LOG` asks for stderr explicitly.
fn init_logging(config: &Config) -> Result<(), GameError> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match &config.log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| GameError::LogFile {
                path: path.clone(),
                source,
            })?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None if std::env::var_os("RUST_LOG").is_none() => return Ok(()),
        None => {}
    }
    builder.init();
    Ok(())
}

/// Fixed-interval loop: poll input, advance, redraw, sleep. A quit signal
/// is honoured at the top of an iteration, never mid-tick. Any surface
/// failure is read as the window going away.
fn run(
    config: &Config,
    surface: &mut dyn Surface,
    input: &mut dyn InputSource,
    rng: &mut impl Rng,
) -> LoopExit {
    let mut game = match Game::new(config.clone(), surface) {
        Ok(game) => game,
        Err(err) => {
            log::error!("surface unavailable: {err}");
            return LoopExit::SurfaceLost;
        }
    };
    let frame_time = config.tick_interval;

    loop {
        let frame_start = Instant::now();
        let signal = input.pending_signal();
        if signal == Signal::Quit {
            log::info!(
                "quit requested during {:?} (outcome {:?}, {} ticks, {} entities shown)",
                game.phase(),
                game.outcome(),
                game.round().map_or(0, |r| r.ticks),
                game.visible_entities().len()
            );
            return LoopExit::Quit;
        }

        if let Err(err) = advance(&mut game, config, signal, surface, input, rng) {
            log::warn!("surface lost, stopping: {err}");
            return LoopExit::SurfaceLost;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn advance(
    game: &mut Game,
    config: &Config,
    signal: Signal,
    surface: &mut dyn Surface,
    input: &mut dyn InputSource,
    rng: &mut impl Rng,
) -> io::Result<()> {
    game.handle_signal(signal, rng, surface)?;
    if let Some(direction) = input.latest_direction() {
        game.steer(direction);
    }
    game.tick(config.tick_interval, rng, surface)?;
    surface.redraw()
}
