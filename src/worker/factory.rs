//! Worker factory
//!
//! Wires a [`CacheWorker`] to the on-disk store, the HTTP fetcher and the
//! console host according to configuration.

use crate::cache::DiskStorage;
use crate::config::{Config, ConfigManager};
use crate::error::RecymResult;
use crate::fetch::HttpFetcher;
use crate::host::ConsoleHost;
use crate::journal::Journal;
use crate::worker::{CacheWorker, WorkerSettings};
use std::sync::Arc;
use tracing::debug;

/// Create the worker used by the command line
pub fn create_worker(config: &Config) -> RecymResult<CacheWorker> {
    let settings = WorkerSettings::from_config(config)?;
    let store_dir = ConfigManager::store_dir(config);
    debug!(
        "Using partition store {} for {}",
        store_dir.display(),
        settings.names.static_name()
    );

    let worker = CacheWorker::new(
        settings,
        Arc::new(DiskStorage::new(store_dir)),
        Arc::new(HttpFetcher::new(&config.network)),
        Arc::new(ConsoleHost),
    )
    .with_journal(Journal::new(config));

    Ok(worker)
}
