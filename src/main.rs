use clap::{ArgAction, Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shades::engine::grid_size_for_level;
use shades::engine::palette::{generate_palette, RngSource};
use shades::games;
use shades::{logging, GameConfig, GameError};
use std::path::PathBuf;

/// Spot the target shade in a grid of near-identical colors before the clock runs out.
#[derive(Parser, Debug)]
#[command(name = "shades", version, about, args_conflicts_with_subcommands = true)]
struct Cli
{
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    play: PlayArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command
{
    /// Play the color perception game (default).
    Play(PlayArgs),
    /// Print one generated palette with its stats.
    Preview(PreviewArgs),
}

#[derive(Args, Debug)]
struct PlayArgs
{
    /// TOML config file.
    #[arg(long, env = "SHADES_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for reproducible palettes.
    #[arg(long)]
    seed: Option<u64>,

    /// Seconds per round.
    #[arg(long)]
    round_seconds: Option<u32>,

    /// Write logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PreviewArgs
{
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    level: u32,

    /// Defaults to the grid size a game reaches at `--level`.
    #[arg(long)]
    grid_size: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,
}

fn main()
{
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), GameError>
{
    match cli.command {
        None => play(cli.play, cli.verbose),
        Some(Command::Play(args)) => play(args, cli.verbose),
        Some(Command::Preview(args)) => {
            preview(&args);
            Ok(())
        }
    }
}

fn play(args: PlayArgs, verbose: u8) -> Result<(), GameError>
{
    let mut config = GameConfig::load_or_default(args.config.as_deref())?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(seconds) = args.round_seconds {
        config.round_seconds = seconds;
    }
    if args.log_file.is_some() {
        config.log_file = args.log_file;
    }
    config.validate()?;

    logging::init(verbose, config.log_file.as_deref())?;
    games::shades::run(RngSource(seeded_rng(config.seed)), &config)
}

fn preview(args: &PreviewArgs)
{
    let grid_size = args.grid_size.unwrap_or_else(|| grid_size_for_level(args.level));
    let mut rng = RngSource(seeded_rng(args.seed));
    let palette = generate_palette(args.level, grid_size, &mut rng);
    for line in games::shades::render_preview(&palette) {
        println!("{line}");
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng
{
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
