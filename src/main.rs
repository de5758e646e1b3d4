mod app;
mod cli;
mod config;
mod http;
mod logging;
mod paths;
mod store;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    logging::init()?;
    let config = config::Config::load()?;
    app::run(cli, config)
}
