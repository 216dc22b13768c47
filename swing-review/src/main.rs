//! swing-review - review the swings of played chess games.
//!
//! Fetches a player's analysed games from the game service and lets the user
//! step through them: every move with its swing and classification, the
//! board at any ply, and the moves that swung the evaluation the most.
//!
//! With no subcommand the interactive review loop starts. The session (last
//! handle, game list, open game and ply) is cached on disk so the next run
//! resumes where this one stopped. Runtime tunables are read from the
//! environment (see [`config`]) and can be overridden by flags.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gateway_client::{GatewayError, HttpGateway};
use review::{
    CacheError, ClassificationBands, FetchError, JsonFileCache, ReviewConfig, ReviewError,
    ReviewSession,
};
use tokio::io::BufReader;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod interactive;
mod render;

/// Top-level CLI arguments.
#[derive(Parser)]
#[command(name = "swing-review", about = "Review the evaluation swings of your chess games")]
struct Cli {
    /// Base URL of the game service [env: SWING_REVIEW_GATEWAY_URL]
    #[arg(long, global = true)]
    gateway_url: Option<String>,

    /// Directory for the session cache [env: SWING_REVIEW_CACHE_DIR]
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Minimum |swing| for a move to count as notable [env: SWING_REVIEW_SWING_THRESHOLD]
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Disable coloured output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Optional subcommand. When omitted, runs the interactive review.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List a player's games.
    Games {
        /// Player handle (case-insensitive).
        handle: String,
    },
    /// Print one game move by move with its notable swings.
    Show {
        /// Game number as printed by `games`.
        number: usize,

        /// Fetch this player's games first instead of using the cached list.
        #[arg(long)]
        handle: Option<String>,
    },
    /// Step through games interactively.
    Review,
    /// Manage the session cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Forget the cached handle, games and position.
    Clear,
}

/// Error type for CLI operations.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Displayed as the user-facing fetch message.
    #[error("{}", .0.user_message())]
    Fetch(FetchError),

    #[error("game service client: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error("session cache: {0}")]
    Cache(#[from] CacheError),

    #[error("No cached games. Run `swing-review games <handle>` or pass --handle.")]
    NoGames,

    #[error("invalid swing threshold {0}: must be a finite, non-negative number")]
    InvalidThreshold(f64),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Create the log directory, returning a warning for stderr when that fails.
/// Runs before the subscriber exists.
fn prepare_log_dir(log_dir: &std::path::Path) -> Option<String> {
    std::fs::create_dir_all(log_dir).err().map(|e| {
        format!(
            "warning: could not create log directory {}: {}",
            log_dir.display(),
            e
        )
    })
}

fn init_logging(log_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    if let Some(warning) = prepare_log_dir(log_dir) {
        eprintln!("{}", warning);
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "swing-review");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    guard
}

fn review_config(threshold: Option<f64>) -> Result<ReviewConfig, CliError> {
    let swing_threshold = threshold.unwrap_or_else(config::get_swing_threshold);
    if !swing_threshold.is_finite() || swing_threshold < 0.0 {
        return Err(CliError::InvalidThreshold(swing_threshold));
    }
    Ok(ReviewConfig {
        bands: ClassificationBands::default(),
        swing_threshold,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&config::get_log_dir());

    let gateway_url = cli.gateway_url.unwrap_or_else(config::get_gateway_url);
    let cache_dir = cli.cache_dir.unwrap_or_else(config::get_cache_dir);
    let color = !cli.no_color && std::io::stdout().is_terminal();

    tracing::info!(%gateway_url, cache_dir = %cache_dir.display(), "swing-review starting up");

    let cache = JsonFileCache::new(&cache_dir);
    let mut session = ReviewSession::new(cache, review_config(cli.threshold)?);
    let gateway = HttpGateway::new(gateway_url, config::get_timeout()).map_err(CliError::from)?;
    let mut stdout = std::io::stdout();

    match cli.command.unwrap_or(Commands::Review) {
        Commands::Games { handle } => {
            commands::games(&mut session, &gateway, &handle, &mut stdout).await?;
        }
        Commands::Show { number, handle } => {
            match handle {
                Some(handle) => commands::fetch_into(&mut session, &gateway, &handle).await?,
                None => {
                    session.restore();
                }
            }
            commands::show(&mut session, number, &mut stdout, color)?;
        }
        Commands::Review => {
            session.restore();
            println!("swing-review - type 'help' for commands");
            println!("Debug logs: {}/swing-review.YYYY-MM-DD", config::get_log_dir().display());
            let input = BufReader::new(tokio::io::stdin());
            interactive::run(&mut session, gateway, input, &mut stdout, color).await?;
        }
        Commands::Cache {
            action: CacheAction::Clear,
        } => {
            session.clear().map_err(CliError::from)?;
            println!("Cleared session cache in {}", session.cache().dir().display());
        }
    }

    tracing::info!("swing-review shutting down");
    Ok(())
}
