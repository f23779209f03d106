use std::{
    io,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use anyhow::{Context, anyhow, bail};
use colored::Colorize;
use libgame::{Grid, GridConfig, PatternFormat, PatternLibrary};

use crate::{State, config::ClientConfig, renderer, ticker::TickerHost};

const GENERATOR: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

pub struct Session {
    state_arc: Arc<RwLock<State>>,
    config: ClientConfig,
    library: PatternLibrary,
    ticker: Option<TickerHost>,
}

enum Flow {
    Continue,
    Exit,
}

impl Session {
    pub fn new(state_arc: Arc<RwLock<State>>, config: ClientConfig, library: PatternLibrary) -> Self {
        Self {
            state_arc,
            config,
            library,
            ticker: None,
        }
    }

    pub fn run(mut self) -> anyhow::Result<()> {
        for line_res in io::stdin().lines() {
            let line = line_res.context("Reading command")?;
            let args = line.split_whitespace();

            match self.handle_cmd(args) {
                Ok(Flow::Continue) => println!("{}", "OK".green()),
                Ok(Flow::Exit) => break,
                Err(e) => eprintln!("{} {e:#}", "!".red()),
            }
        }

        self.stop_ticker();
        Ok(())
    }

    fn handle_cmd<'a, I>(&mut self, mut args: I) -> anyhow::Result<Flow>
    where
        I: Iterator<Item = &'a str>,
    {
        match args.next().context("No command")? {
            "step" => {
                let times = args.next().unwrap_or("1").parse::<usize>()?;

                let mut state = write_state(&self.state_arc)?;
                for _ in 0..times {
                    state.grid.step();
                }
            }

            "run" => {
                let millis = match args.next() {
                    Some(millis) => millis.parse::<u64>()?,
                    None => self.config.tick_millis,
                };

                self.stop_ticker();
                self.ticker = Some(TickerHost::start(
                    self.state_arc.clone(),
                    Duration::from_millis(millis),
                ));
            }

            "stop" => {
                if !self.stop_ticker() {
                    bail!("Not running");
                }
            }

            "rate" => {
                let millis = args.next().context("missing millis")?.parse::<u64>()?;

                self.config.tick_millis = millis;
                if let Some(ticker) = &self.ticker {
                    ticker.set_rate(Duration::from_millis(millis));
                }
            }

            "clear" => {
                write_state(&self.state_arc)?.grid.clear();
            }

            "random" => {
                let alive_count = args
                    .next()
                    .context("missing alive count")?
                    .parse::<usize>()?;

                write_state(&self.state_arc)?.grid.scatter(alive_count);
            }

            "toggle" => {
                let x = args.next().context("missing x")?.parse::<usize>()?;
                let y = args.next().context("missing y")?.parse::<usize>()?;

                if !write_state(&self.state_arc)?.grid.toggle_at((x, y)) {
                    bail!("{x} {y} is outside the grid");
                }
            }

            "rule" => match args.next() {
                Some(text) => {
                    if !write_state(&self.state_arc)?.grid.set_rule(text) {
                        bail!("Couldn't use rule {text:?}");
                    }
                }
                None => println!("{}", read_state(&self.state_arc)?.grid.rule_text()),
            },

            "new" => {
                let mut grid_config = self.config.grid.clone();

                if let Some(width) = args.next() {
                    grid_config.width = width.parse()?;
                    grid_config.height = args.next().context("missing height")?.parse()?;
                }

                write_state(&self.state_arc)?.grid = Grid::from_config(&grid_config);
            }

            "load" => {
                let name = args.next().context("missing pattern name")?;

                // Seed a fresh grid so a failed load leaves the current one alone. The pattern's
                // own rule, if any, replaces the current one.
                let mut grid = {
                    let state = read_state(&self.state_arc)?;
                    let rule = state.grid.rule();
                    Grid::from_config(&GridConfig {
                        width: state.grid.width,
                        height: state.grid.height,
                        birth: rule.birth.clone(),
                        survive: rule.survive.clone(),
                        ..self.config.grid.clone()
                    })
                };

                let placed = self
                    .library
                    .seed(name, &mut grid, self.config.grid.colored)
                    .with_context(|| format!("Couldn't load {name}"))?;

                write_state(&self.state_arc)?.grid = grid;
                println!("Placed {placed} cells");
            }

            "save" => {
                let name = args.next().context("missing pattern name")?;
                let format = match args.next() {
                    Some(format) => format.parse::<PatternFormat>()?,
                    None => PatternFormat::RunLength,
                };

                if self.library.get(name).is_some_and(|source| !source.writable) {
                    bail!("{name} is a bundled pattern and can't be overwritten");
                }

                let state = read_state(&self.state_arc)?;
                let source = self
                    .library
                    .save(name, &state.grid, format, GENERATOR)
                    .with_context(|| format!("Couldn't save {name}"))?;

                println!("Saved to {}", source.path.display());
            }

            "patterns" => {
                for source in self.library.sources() {
                    let access = if source.writable { "" } else { ", read-only" };
                    println!("{} ({}{access})", source.name, source.format);
                }
            }

            "show" => {
                let state = read_state(&self.state_arc)?;
                print!("{}", renderer::render(&state.grid));
                println!("{}", stats(&state.grid, self.is_running()));
            }

            "stats" => {
                let state = read_state(&self.state_arc)?;
                println!("{}", stats(&state.grid, self.is_running()));
            }

            "exit" => return Ok(Flow::Exit),

            _ => bail!("Unknown command"),
        }

        Ok(Flow::Continue)
    }

    fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(TickerHost::is_running)
    }

    /// Returns whether a ticker was running.
    fn stop_ticker(&mut self) -> bool {
        match self.ticker.take() {
            Some(ticker) => {
                ticker.stop();
                true
            }
            None => false,
        }
    }
}

fn stats(grid: &Grid, running: bool) -> String {
    format!(
        "generation {} | population {} | rule {} | {}x{} {} | {}",
        grid.generation(),
        grid.population(),
        grid.rule_text(),
        grid.width,
        grid.height,
        if grid.wrap { "wrapping" } else { "bounded" },
        if running { "running" } else { "paused" },
    )
}

fn read_state(state_arc: &Arc<RwLock<State>>) -> anyhow::Result<RwLockReadGuard<'_, State>> {
    state_arc.read().map_err(|_| anyhow!("State lock poisoned"))
}

fn write_state(state_arc: &Arc<RwLock<State>>) -> anyhow::Result<RwLockWriteGuard<'_, State>> {
    state_arc.write().map_err(|_| anyhow!("State lock poisoned"))
}
