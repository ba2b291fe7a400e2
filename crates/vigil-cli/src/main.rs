mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vigil_core::Strictness;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Focus coach: classify attention and decide when to nudge", long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay recorded JSON-lines traces, one session per file
    Replay {
        /// Trace files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Strictness 1-10 (overrides config)
        #[arg(short, long)]
        strictness: Option<i64>,
        /// Print decisions as JSON lines
        #[arg(long)]
        json: bool,
        /// Include ticks that did not intervene
        #[arg(short, long)]
        all: bool,
    },
    /// Read observations from stdin and print interventions live
    Watch {
        /// Strictness 1-10 (overrides config)
        #[arg(short, long)]
        strictness: Option<i64>,
        /// Ring the terminal bell on medium or worse
        #[arg(long)]
        bell: bool,
        /// Print decisions as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Run the built-in scenarios
    Bench {
        /// Strictness 1-10
        #[arg(short, long, default_value_t = 5)]
        strictness: i64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
    /// Show the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Replay {
            files,
            strictness,
            json,
            all,
        } => {
            let settings = commands::helpers::resolve_settings(config, strictness)?;
            commands::replay::replay_command(files, settings, json, all).await
        }
        Commands::Watch {
            strictness,
            bell,
            json,
        } => {
            let settings = commands::helpers::resolve_settings(config, strictness)?;
            commands::watch::watch_command(settings, bell, json).await
        }
        Commands::Bench { strictness, json } => {
            commands::bench::bench_command(Strictness::new(strictness), json)
        }
        Commands::Config { action } => match action {
            ConfigAction::Get { key } => commands::config::handle_config_get(config, &key),
            ConfigAction::Set { key, value } => {
                commands::config::handle_config_set(config, &key, &value)
            }
            ConfigAction::List => commands::config::handle_config_list(config),
            ConfigAction::Path => commands::config::handle_config_path(config),
        },
    }
}
