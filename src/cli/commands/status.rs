//! Status command - list cache partitions

use crate::cache::{CacheStorage, PartitionNames};
use crate::cli::args::{OutputFormat, StatusArgs};
use crate::config::Config;
use crate::error::RecymResult;
use crate::worker::create_worker;
use console::style;
use serde::Serialize;

/// One row of the partition listing
#[derive(Debug, Serialize)]
struct PartitionRow {
    name: String,
    kind: Option<String>,
    version: Option<String>,
    current: bool,
    entries: usize,
}

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> RecymResult<()> {
    let worker = create_worker(config)?;
    let rows = collect_rows(worker.storage(), &worker.settings().names).await?;

    if rows.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => println!("No cache partitions found."),
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&rows, &worker.version()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            for row in &rows {
                println!("{}", row.name);
            }
        }
    }

    Ok(())
}

async fn collect_rows(
    storage: &dyn CacheStorage,
    names: &PartitionNames,
) -> RecymResult<Vec<PartitionRow>> {
    let mut rows = vec![];
    for name in storage.keys().await? {
        let info = names.describe(&name);
        let entries = storage.entries(&name).await?.len();
        rows.push(PartitionRow {
            kind: info.as_ref().map(|i| i.kind.to_string()),
            version: info.as_ref().map(|i| i.version.to_string()),
            current: names.is_current(&name),
            entries,
            name,
        });
    }
    Ok(rows)
}

fn print_table(rows: &[PartitionRow], version: &str) {
    println!(
        "{:<32} {:<8} {:<10} {:<8}",
        style("PARTITION").bold(),
        style("KIND").bold(),
        style("STATE").bold(),
        style("ENTRIES").bold()
    );
    println!("{}", "-".repeat(62));

    for row in rows {
        let state = if row.current {
            style("current").green()
        } else {
            style("stale").red()
        };
        println!(
            "{:<32} {:<8} {:<10} {:<8}",
            row.name,
            row.kind.as_deref().unwrap_or("-"),
            state,
            row.entries
        );
    }

    let stale = rows.iter().filter(|r| !r.current).count();
    println!();
    println!("Active version: {}", style(version).cyan());
    if stale > 0 {
        println!(
            "{} {} stale partition(s), run: recym-cache activate",
            style("!").yellow(),
            stale
        );
    }
}
