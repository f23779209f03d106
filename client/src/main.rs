use std::{
    env,
    sync::{Arc, RwLock},
};

use cli::Session;
use config::ClientConfig;
use libgame::Grid;

mod cli;
mod config;
mod renderer;
mod ticker;

pub struct State {
    grid: Grid,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config_path = env::args().nth(1);
    let config = ClientConfig::load(config_path.as_deref())?;

    let state_arc = Arc::new(RwLock::new(State {
        grid: Grid::from_config(&config.grid),
    }));

    let library = config.library();
    log::info!("{} patterns available", library.sources().len());

    Session::new(state_arc, config, library).run()
}
