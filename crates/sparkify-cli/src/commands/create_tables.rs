use anyhow::{Context, Result};
use sparkify_core::schema::TABLES;
use sparkify_etl::Config;

pub fn create_tables(config: &Config) -> Result<()> {
    log::info!("Resetting schema in {}", config.database_path.display());

    let db = super::open_database(config)?;
    db.reset().context("Schema reset failed")?;

    println!("✓ Recreated {} tables in {}", TABLES.len(), config.database_path.display());
    for table in TABLES {
        println!("  {}", table.name);
    }

    Ok(())
}
