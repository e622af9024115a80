use anyhow::Result;
use sparkify_etl::Config;

pub fn show_status(config: &Config) -> Result<()> {
    let db = super::open_database(config)?;

    println!("\n📊 Sparkify Status\n");
    println!("  Database: {}", config.database_path.display());
    println!();

    let counts = db.table_counts()?;
    for (table, count) in &counts {
        println!("  {:<10} {:>8}", table, count);
    }

    if counts.iter().all(|(_, count)| *count == 0) {
        println!("\n  Run `sparkify etl` to load data");
    }

    Ok(())
}
