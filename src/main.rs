mod animation;
mod app;
mod assets;
mod config;
mod error;
mod input;
mod layout;
mod overlay;
mod render;
mod sprite;

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::error::{ConfigError, Error};

/// Keyboard-driven sprite animation viewer.
#[derive(Parser, Debug)]
#[command(name = "spritestate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML config file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding sprite sheets and backgrounds (overrides the config)
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn try_main(cli: Cli) -> Result<(), Error> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.assets {
        config.assets_dir = dir;
    }

    if cli.print_config {
        let text = toml::to_string_pretty(&config).map_err(ConfigError::from)?;
        print!("{text}");
        return Ok(());
    }

    log::info!("Assets directory: {}", config.assets_dir.display());
    app::run(config)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("spritestate starting up");

    if let Err(e) = try_main(cli) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
