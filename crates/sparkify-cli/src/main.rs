use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use sparkify_etl::Config;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "sparkify", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/sparkify/sparkify.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Drop and recreate every table
    ///
    /// Issues DROP TABLE IF EXISTS for songplays, users, songs, artists and
    /// time, then creates them again, empty. This is the only command that
    /// deletes data.
    CreateTables,
    /// Load song metadata and event logs into the star schema
    ///
    /// Resets the schema (unless --keep-existing), then loads every .json
    /// file under the song data directory, then every .json file under the
    /// log data directory. Song data must come first: each song play is
    /// matched to a song by title and artist name, and plays whose song is
    /// not in the catalog are stored without song and artist ids.
    ///
    /// Every file is committed on its own. Inserts skip rows whose key
    /// already exists, so re-running with --keep-existing adds nothing new.
    Etl {
        /// Root of the song metadata files (default: data/song_data)
        #[arg(long)]
        song_data: Option<PathBuf>,

        /// Root of the event log files (default: data/log_data)
        #[arg(long)]
        log_data: Option<PathBuf>,

        /// Load on top of existing rows instead of resetting the schema
        #[arg(long)]
        keep_existing: bool,
    },
    /// Show the row count of every table
    Status,
    /// Print the first rows of every table
    Sample {
        /// Rows to print per table
        #[arg(long, short = 'n', default_value_t = 5)]
        limit: usize,
    },
    /// Inspect or initialise the configuration file
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration (default)
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults if it does not exist
    Init,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match cli.db {
        Some(db_path) => Config::load_with_db_path(db_path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::CreateTables => {
            commands::create_tables(&config)?;
        }
        Commands::Etl {
            song_data,
            log_data,
            keep_existing,
        } => {
            let mut config = config;
            if let Some(dir) = song_data {
                config.song_data_dir = dir;
            }
            if let Some(dir) = log_data {
                config.log_data_dir = dir;
            }
            config.keep_existing |= keep_existing;
            commands::run_etl(&config)?;
        }
        Commands::Status => {
            commands::show_status(&config)?;
        }
        Commands::Sample { limit } => {
            commands::show_sample(&config, limit)?;
        }
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => commands::config::show_config(&config),
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
