use anyhow::Context;
use clap::Parser;
use geocoin_core::{Coord, FileStorage, GameSession, SeededLuck};
use std::path::PathBuf;

mod commands;
mod settings;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// TOML file with game settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the session is saved in
    #[arg(long, default_value = ".geocoin")]
    save_dir: PathBuf,

    /// Force a luck seed instead of the configured one
    #[arg(short, long)]
    seed: Option<u64>,

    /// Override the visibility radius, in cells
    #[arg(short, long)]
    radius: Option<Coord>,

    #[command(subcommand)]
    command: commands::Cmd,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let settings = settings::Settings::load(args.config.as_deref())?;
    let mut config = settings.game;
    if let Some(radius) = args.radius {
        config = config.with_radius(radius);
    }
    let seed = args.seed.unwrap_or(settings.seed);
    log::debug!("seed: {seed}, save dir: {}", args.save_dir.display());

    let storage = FileStorage::new(args.save_dir.clone());
    let mut session = GameSession::restore(config, SeededLuck::new(seed), storage);

    let out = commands::dispatch(&mut session, &args.command)
        .with_context(|| format!("{:?} failed", args.command))?;
    print!("{out}");
    Ok(())
}
