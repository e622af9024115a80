use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Configuration for sparkify.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (SPARKIFY_* prefix)
/// 3. Config file (~/.config/sparkify/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database holding the star schema.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: SPARKIFY_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/sparkify/sparkify.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Root of the song-metadata tree.
    ///
    /// Can be set via:
    /// - CLI: sparkify etl --song-data DIR
    /// - ENV: SPARKIFY_SONG_DATA_DIR
    /// - Config: song_data_dir = "data/song_data"
    #[serde(default = "default_song_data_dir")]
    pub song_data_dir: PathBuf,

    /// Root of the event-log tree.
    ///
    /// Can be set via:
    /// - CLI: sparkify etl --log-data DIR
    /// - ENV: SPARKIFY_LOG_DATA_DIR
    /// - Config: log_data_dir = "data/log_data"
    #[serde(default = "default_log_data_dir")]
    pub log_data_dir: PathBuf,

    /// Load on top of existing rows instead of resetting the schema first.
    ///
    /// Can be set via:
    /// - CLI: sparkify etl --keep-existing
    /// - ENV: SPARKIFY_KEEP_EXISTING=true
    /// - Config: keep_existing = true
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub keep_existing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            song_data_dir: default_song_data_dir(),
            log_data_dir: default_log_data_dir(),
            keep_existing: false,
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/sparkify/config.toml
    /// Reads environment variables with SPARKIFY_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("sparkify");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with custom database path.
    ///
    /// This is used when the --db CLI flag is provided.
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }
}

/// Accept a TOML boolean or its string form; environment overrides always
/// arrive as strings.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" | "" => Ok(false),
            other => Err(de::Error::custom(format!(
                "invalid boolean {other:?}, expected true or false"
            ))),
        },
    }
}

/// Returns: ~/.local/share/sparkify/sparkify.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sparkify")
        .join("sparkify.db")
}

fn default_song_data_dir() -> PathBuf {
    PathBuf::from("data").join("song_data")
}

fn default_log_data_dir() -> PathBuf {
    PathBuf::from("data").join("log_data")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/sparkify/config.toml
/// - macOS: ~/Library/Application Support/sparkify/config.toml
/// - Windows: %APPDATA%\sparkify\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sparkify")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Sparkify Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (SPARKIFY_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite database holding the star schema
#
# Can also be set via:
# - CLI: sparkify --db /custom/path.db etl
# - Environment: SPARKIFY_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/sparkify.db"

# Root directory of the song metadata files (one JSON object per file)
song_data_dir = "data/song_data"

# Root directory of the event log files (one JSON event per line)
log_data_dir = "data/log_data"

# Set to true to load on top of existing rows instead of dropping and
# recreating every table first
keep_existing = false
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
