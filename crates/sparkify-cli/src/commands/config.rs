use anyhow::Result;
use sparkify_etl::{config, Config};

/// Show the current effective configuration.
pub fn show_config(config: &Config) {
    println!("Current Configuration");
    println!("=====================\n");

    let path = config::config_file_path();
    println!("Config file: {}", path.display());
    println!(
        "File exists: {}\n",
        if path.exists() { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    println!("  database_path: {}", config.database_path.display());
    println!("  song_data_dir: {}", config.song_data_dir.display());
    println!("  log_data_dir: {}", config.log_data_dir.display());
    println!("  keep_existing: {}", config.keep_existing);

    println!("\nPriority: CLI args > ENV vars (SPARKIFY_*) > Config file > Defaults");
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure sparkify.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
