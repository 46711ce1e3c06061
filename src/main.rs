//! Main entry point for the bot population server
//!
//! Runs a local game server session with bots managed by the population
//! controller, until a frame limit is reached or a shutdown signal arrives.

use anyhow::Result;
use bot_population::config::{validate_config, AppConfig};
use bot_population::service::ServerRuntime;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tokio::signal;
use tracing::{error, info};

/// Bot Population Server - bot slot allocation and team balancing
#[derive(Parser)]
#[command(
    name = "bot-population",
    version,
    about = "Runs a game server session with automatically managed bots",
    long_about = "Bot Population keeps a server's bot count in line with its minimum player \
                 and bot targets, balancing bots across teams and carrying them across \
                 level changes."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Maximum bots override
    #[arg(long, value_name = "N", help = "Override sv_maxbots")]
    max_bots: Option<usize>,

    /// Minimum players override
    #[arg(long, value_name = "N", help = "Override sv_minplayers")]
    min_players: Option<usize>,

    /// Baseline bots override
    #[arg(long, value_name = "N", help = "Override sv_numbots")]
    num_bots: Option<usize>,

    /// Game root override
    #[arg(long, value_name = "DIR", help = "Directory model listings are resolved against")]
    game_root: Option<PathBuf>,

    /// Human clients to connect at startup
    #[arg(long, default_value_t = 0, help = "Number of simulated human clients")]
    humans: usize,

    /// Frames to run before exiting
    #[arg(long, default_value_t = 0, help = "Stop after this many frames (0 runs until Ctrl+C)")]
    frames: u64,

    /// Print session statistics on exit
    #[arg(long, help = "Print session statistics as JSON when the session ends")]
    print_stats: bool,

    /// Print metrics on exit
    #[arg(long, help = "Print Prometheus metrics when the session ends")]
    print_metrics: bool,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting the server"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with session settings
fn display_startup_banner(config: &AppConfig) {
    info!("Bot Population Server");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Human slots: {}", config.server.human_slots);
    info!(
        "   Bots: max {}, min players {}, baseline {}",
        config.bots.max_bots, config.bots.min_players, config.bots.num_bots
    );
    info!(
        "   Models: {}/{} (*{})",
        config.service.game_root, config.models.directory, config.models.extension
    );
}

/// Load and merge configuration from environment, file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }
    if args.debug {
        config.service.log_level = "debug".to_string();
    }
    if let Some(max_bots) = args.max_bots {
        config.bots.max_bots = max_bots;
    }
    if let Some(min_players) = args.min_players {
        config.bots.min_players = min_players;
    }
    if let Some(num_bots) = args.num_bots {
        config.bots.num_bots = num_bots;
    }
    if let Some(game_root) = &args.game_root {
        config.service.game_root = game_root.display().to_string();
    }

    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    if args.dry_run {
        info!("Configuration validation successful, exiting");
        return Ok(());
    }

    let mut runtime = match ServerRuntime::new(config) {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to initialize server: {}", e);
            std::process::exit(1);
        }
    };
    runtime.seed_humans(args.humans);

    let running = runtime.running_flag();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("Shutdown signal received, stopping after the current frame");
        running.store(false, Ordering::SeqCst);
    });

    if let Err(e) = runtime.run(args.frames).await {
        error!("Server loop failed: {}", e);
        std::process::exit(1);
    }

    let stats = runtime.manager().stats();
    info!(
        "Session {} finished: {} added, {} removed, {} restored, {} slot exhaustions",
        runtime.manager().session_id(),
        stats.bots_added,
        stats.bots_removed,
        stats.bots_restored,
        stats.slot_exhaustions
    );

    if args.print_stats {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    if args.print_metrics {
        println!("{}", runtime.metrics().render()?);
    }

    Ok(())
}
