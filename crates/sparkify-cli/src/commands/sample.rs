use anyhow::Result;
use sparkify_core::schema::{Sample, TABLES};
use sparkify_etl::Config;

/// Print the first `limit` rows of every table, with column labels.
pub fn show_sample(config: &Config, limit: usize) -> Result<()> {
    let db = super::open_database(config)?;

    for table in TABLES {
        let sample = db.sample_rows(table.name, limit)?;
        print!("{}", render(&sample));
        println!();
    }

    Ok(())
}

fn render(sample: &Sample) -> String {
    let mut out = format!(
        "{} TABLE\nLabels: {}\n",
        sample.table.to_uppercase(),
        sample.columns.join(", ")
    );

    if sample.rows.is_empty() {
        out.push_str("  (empty)\n");
    }
    for row in &sample.rows {
        out.push_str("  (");
        out.push_str(&row.join(", "));
        out.push_str(")\n");
    }

    out
}
