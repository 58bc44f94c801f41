use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use ml_tictactoe::ai::QTable;
use ml_tictactoe::config::AppConfig;
use ml_tictactoe::game::Variant;
use ml_tictactoe::training::Trainer;

/// Train a tic-tac-toe Q-learning agent via self-play.
#[derive(Parser)]
#[command(name = "train", about = "Train a tic-tac-toe Q-learning agent")]
struct Cli {
    /// Board variant: 3x3 or 4x4
    #[arg(long, default_value = "4x4")]
    variant: String,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Resume from the Q-table at the configured path
    #[arg(long)]
    resume: bool,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override number of wildcard cells per game
    #[arg(long)]
    wildcards: Option<usize>,

    /// Seed the random source for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Skip saving the Q-table when training finishes
    #[arg(long)]
    no_save: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let variant = match cli.variant.as_str() {
        "3x3" => Variant::Classic3,
        "4x4" => Variant::Dual4,
        other => bail!("unknown variant '{}' (expected '3x3' or '4x4')", other),
    };

    // Load configuration
    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(episodes) = cli.episodes {
        app_config.training.num_episodes = episodes;
    }
    if cli.wildcards.is_some() {
        app_config.training.wildcard_count = cli.wildcards;
    }
    app_config.validate().context("validating configuration")?;

    let table_path = app_config.training.table_path.clone();

    let table = if cli.resume && table_path.exists() {
        let table = QTable::load(&table_path)
            .with_context(|| format!("loading Q-table from {}", table_path.display()))?;
        println!(
            "Resumed Q-table with {} entries (alpha={}, gamma={}, epsilon={})",
            table.len(),
            table.alpha(),
            table.gamma(),
            table.epsilon()
        );
        table
    } else {
        if cli.resume {
            println!(
                "No Q-table found at {}, starting fresh",
                table_path.display()
            );
        }
        QTable::new(
            app_config.qlearning.alpha,
            app_config.qlearning.gamma,
            app_config.qlearning.epsilon,
        )
    };
    let table = table.into_shared();

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let trainer = Trainer::new(app_config.training.clone());
    trainer
        .train(variant, &table, &mut rng)
        .context("running training")?;

    if !cli.no_save {
        table
            .borrow()
            .save(&table_path)
            .with_context(|| format!("saving Q-table to {}", table_path.display()))?;
        println!("Q-table saved to {}", table_path.display());
    }

    Ok(())
}
