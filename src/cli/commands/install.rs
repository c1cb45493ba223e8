//! Install command - populate the static partition

use crate::config::Config;
use crate::error::RecymResult;
use crate::worker::create_worker;
use console::style;

/// Execute the install command
pub async fn execute(config: &Config) -> RecymResult<()> {
    let worker = create_worker(config)?;

    println!(
        "Installing {} from {}...",
        style(worker.version()).cyan(),
        worker.settings().origin
    );

    let report = worker.install().await?;

    for url in &report.cached {
        println!("  {} {}", style("✓").green(), url);
    }
    for failure in &report.failed {
        println!(
            "  {} {} ({})",
            style("✗").red(),
            failure.url,
            style(&failure.reason).dim()
        );
    }

    println!();
    if report.is_complete() {
        println!(
            "{} cached {} file(s) in {}",
            style("✓").green(),
            report.cached.len(),
            report.partition
        );
    } else {
        println!(
            "{} cached {} of {} file(s) in {}, install continues",
            style("!").yellow(),
            report.cached.len(),
            report.cached.len() + report.failed.len(),
            report.partition
        );
    }

    Ok(())
}
