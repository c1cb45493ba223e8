//! Activate command - purge partitions of other versions

use crate::config::Config;
use crate::error::RecymResult;
use crate::worker::create_worker;
use console::style;

/// Execute the activate command
pub async fn execute(config: &Config) -> RecymResult<()> {
    let worker = create_worker(config)?;
    let report = worker.activate().await?;

    if report.deleted.is_empty() {
        println!("No old partitions to delete.");
    } else {
        for name in &report.deleted {
            println!("  {} deleted {}", style("•").red(), name);
        }
    }

    println!(
        "{} {} active ({} client(s) claimed)",
        style("✓").green(),
        style(worker.version()).cyan(),
        report.clients_claimed
    );

    Ok(())
}
