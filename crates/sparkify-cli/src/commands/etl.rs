use anyhow::{Context, Result};
use sparkify_etl::{Config, LoadEvent, LoadReport, Pipeline};

/// Run the full load and print per-file progress.
pub fn run_etl(config: &Config) -> Result<()> {
    println!("\n🎵 Sparkify Load\n");
    println!("  Song data: {}", config.song_data_dir.display());
    println!("  Log data:  {}", config.log_data_dir.display());
    println!("  Database:  {}", config.database_path.display());
    if config.keep_existing {
        println!("  Keeping existing rows");
    }
    println!();

    let db = super::open_database(config)?;

    let report = Pipeline::from_config(&db, config)
        .run(&mut print_progress)
        .context("Load failed")?;

    print_summary(&report);
    Ok(())
}

fn print_progress(event: &LoadEvent<'_>) {
    match event {
        LoadEvent::DatasetStarted { root, files, .. } => {
            println!("{} files found in {}", files, root.display());
        }
        LoadEvent::FileLoaded { index, total, .. } => {
            println!("{}/{} files processed.", index, total);
        }
        LoadEvent::DatasetFinished { dataset, .. } => {
            println!("  ✓ {dataset} complete\n");
        }
    }
}

fn print_summary(report: &LoadReport) {
    let songs = report.catalog.stats();
    let logs = &report.logs;

    println!("✓ Load complete");
    println!(
        "  Song files: {} ({} new songs, {} new artists)",
        report.catalog.files(),
        songs.songs,
        songs.artists
    );
    println!(
        "  Log files:  {} ({} events, {} song plays kept, {} other events skipped)",
        report.log_files,
        logs.events,
        logs.events - logs.skipped,
        logs.skipped
    );
    println!(
        "  New rows:   {} songplays, {} users, {} time",
        logs.songplays, logs.users, logs.time_rows
    );
    println!(
        "  Catalog matches: {} matched, {} unmatched",
        logs.matched, logs.unmatched
    );
    println!("\nRun 'sparkify sample' to inspect the loaded tables");
}
