pub mod config;
pub mod create_tables;
pub mod etl;
pub mod sample;
pub mod status;

pub use create_tables::create_tables;
pub use etl::run_etl;
pub use sample::show_sample;
pub use status::show_status;

use anyhow::{Context, Result};
use sparkify_core::schema::Database;
use sparkify_etl::Config;

/// Open the configured database, creating its directory if needed.
fn open_database(config: &Config) -> Result<Database> {
    let db_path = &config.database_path;

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    Database::open(db_path).with_context(|| format!("Failed to open {}", db_path.display()))
}
