use std::{
    io,
    path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre::{Result, bail, eyre};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use glyphfall_config::Config;

mod app;
mod clock;
mod logging;
mod page;
mod render;

use app::App;
use page::Page;

#[derive(Parser, Debug)]
#[command(name = "glyphfall", version)]
#[command(about = "Falling binary rain with scroll-triggered reveals", long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip animations and show everything in its final state
    #[arg(long)]
    reduce_motion: bool,

    /// Rain frame rate
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=120))]
    fps: Option<u32>,

    /// Write the default config file and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if cli.init_config {
        return init_config(cli.config.as_deref());
    }

    let (mut config, rejected) = match Config::load(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(err) => {
            eprintln!("glyphfall: {err}; using defaults");
            (Config::default(), Some(err))
        }
    };
    if let Some(fps) = cli.fps {
        config.rain.fps = fps;
    }

    logging::init(config.log_file.as_deref())?;
    if let Some(err) = rejected {
        tracing::warn!(%err, "config rejected, using defaults");
    }

    let page = Page::load(config.content.as_deref())?;
    let reduced_motion = cli.reduce_motion || config.prefers_reduced_motion();
    let app = App::new(&config, page, reduced_motion)?;

    let terminal = ratatui::init();
    let result = execute!(io::stdout(), EnableMouseCapture)
        .map_err(color_eyre::Report::from)
        .and_then(|()| app.run(terminal));
    if let Err(err) = execute!(io::stdout(), DisableMouseCapture) {
        tracing::debug!(%err, "failed to release mouse capture");
    }
    ratatui::restore();
    result
}

fn init_config(path: Option<&Path>) -> Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(Config::default_path)
        .ok_or_else(|| eyre!("no config directory available, pass --config"))?;
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    Config::default().save(&path)?;
    println!("wrote {}", path.display());
    Ok(())
}
