use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tile_merge::game::GameConfig;
use tile_merge::metrics::ScoreStore;
use tile_merge::modes::HumanMode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tile_merge")]
#[command(version, about = "Sliding-tile merge puzzle for the terminal")]
struct Cli {
    /// TOML file with game settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid rows
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns
    #[arg(long)]
    cols: Option<usize>,

    /// Spacing between cells
    #[arg(long)]
    gap: Option<u16>,

    /// Seed for tile spawns, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Where the best score is kept
    #[arg(long, default_value = "tile_merge_scores.json")]
    best_score_file: PathBuf,

    /// Log filter, e.g. "info" or "tile_merge=debug"
    #[arg(long, default_value = "info")]
    log: String,

    /// Write logs to this file (the terminal belongs to the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_toml_file(path)?,
            None => GameConfig::default(),
        };

        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.cols = cols;
        }
        if let Some(gap) = self.gap {
            config.gap = gap;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };
    let file =
        File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(cli.log.clone()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    // Create game configuration from the file and CLI overrides
    let config = cli.game_config()?;
    info!(
        rows = config.rows,
        cols = config.cols,
        seed = ?config.seed,
        "starting"
    );

    let store = ScoreStore::load(&cli.best_score_file)?;
    let mut human_mode = HumanMode::new(config, store)?;
    human_mode.run().await?;

    Ok(())
}
