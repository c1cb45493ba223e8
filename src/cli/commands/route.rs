//! Route command - show the strategy for each request

use crate::cache::Request;
use crate::cli::args::RouteArgs;
use crate::config::Config;
use crate::error::RecymResult;
use crate::worker::{Strategy, WorkerSettings};
use console::style;

/// Execute the route command
pub async fn execute(args: RouteArgs, config: &Config) -> RecymResult<()> {
    let settings = WorkerSettings::from_config(config)?;

    for target in &args.urls {
        let request = Request::resolve(target, &settings.origin)?;
        let strategy = settings.router.classify(request.path());
        let styled = match strategy {
            Strategy::CacheFirst => style(strategy.to_string()).green(),
            Strategy::NetworkFirst => style(strategy.to_string()).yellow(),
            Strategy::StaleWhileRevalidate => style(strategy.to_string()).cyan(),
        };
        println!("{:<24} {}", styled, request.url);
    }

    Ok(())
}
