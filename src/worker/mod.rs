//! Offline resource cache worker
//!
//! Intercepts resource requests and serves them from the static or dynamic
//! partition using the strategy picked by [`Router`], and keeps partitions in
//! line with the deployed version across install and activate.
//!
//! # Lifecycle
//!
//! | Event | Effect |
//! |-------|--------|
//! | install | open static partition, fetch and store the static set, set skip-waiting |
//! | activate | delete every non-current partition, claim open clients |
//! | fetch | route to cache-first, network-first or stale-while-revalidate |
//! | message | `SKIP_WAITING`, `GET_VERSION` |
//! | push | show a notification with `explore` and `close` actions |
//! | notification click | close it, open the page on `explore` |
//!
//! Network failures while handling a request never escape: each strategy
//! answers with a synthetic 503 instead.

pub mod factory;
pub mod lifecycle;
pub mod messages;
pub mod notification;
pub mod strategy;

pub use factory::create_worker;
pub use lifecycle::{ActivationReport, InstallFailure, InstallReport, LifecycleState, Phase};
pub use messages::{ClientMessage, ReplyPort, VersionReply};
pub use notification::{Notification, PushPayload, ACTION_CLOSE, ACTION_EXPLORE};
pub use strategy::{Router, Strategy};

use crate::cache::{CacheStorage, PartitionNames, Request, RequestKey, Response};
use crate::config::schema::{Config, NotificationsConfig};
use crate::error::{RecymError, RecymResult};
use crate::fetch::{FetchError, Fetcher};
use crate::host::ClientHost;
use crate::journal::Journal;
use futures_util::future::join_all;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use url::Url;

/// Body of the 503 returned by cache-first when offline
pub const CACHE_FIRST_OFFLINE: &str = "Offline content not available";
/// Body of the 503 returned by network-first when offline with no copy
pub const NETWORK_FIRST_OFFLINE: &str = "Network error";
/// Body of the 503 returned by stale-while-revalidate when offline with no copy
pub const STALE_OFFLINE: &str = "Offline";

type Revalidation = JoinHandle<Result<Response, FetchError>>;

/// Everything a worker needs from configuration
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub names: PartitionNames,
    pub router: Router,
    pub static_files: Vec<String>,
    pub origin: Url,
    pub notifications: NotificationsConfig,
}

impl WorkerSettings {
    pub fn from_config(config: &Config) -> RecymResult<Self> {
        let names = PartitionNames::parse(&config.cache.prefix, &config.cache.version)?;
        let origin = Url::parse(&config.network.origin).map_err(|e| RecymError::InvalidUrl {
            url: config.network.origin.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            names,
            router: Router::from_config(&config.cache),
            static_files: config.cache.static_files.clone(),
            origin,
            notifications: config.notifications.clone(),
        })
    }
}

/// An externally delivered event
#[derive(Debug)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
    Message {
        data: serde_json::Value,
        reply: Option<ReplyPort>,
    },
    /// Push with its raw payload, if any
    Push(Option<Vec<u8>>),
    NotificationClick {
        notification: Notification,
        action: Option<String>,
    },
}

/// Result of dispatching an event
#[derive(Debug)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivationReport),
    Responded(Response),
    Handled,
    Ignored,
}

/// The cache worker for one deployed version
pub struct CacheWorker {
    settings: WorkerSettings,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    host: Arc<dyn ClientHost>,
    journal: Journal,
    state: RwLock<LifecycleState>,
    revalidations: Mutex<Vec<Revalidation>>,
}

impl CacheWorker {
    pub fn new(
        settings: WorkerSettings,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        host: Arc<dyn ClientHost>,
    ) -> Self {
        Self {
            settings,
            storage,
            fetcher,
            host,
            journal: Journal::disabled(),
            state: RwLock::new(LifecycleState::default()),
            revalidations: Mutex::new(Vec::new()),
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    pub fn storage(&self) -> &dyn CacheStorage {
        self.storage.as_ref()
    }

    /// Version identifier reported to clients: the current static partition name
    pub fn version(&self) -> String {
        self.settings.names.static_name()
    }

    pub async fn state(&self) -> LifecycleState {
        self.state.read().await.clone()
    }

    /// Handle one event
    pub async fn dispatch(&self, event: WorkerEvent) -> RecymResult<EventOutcome> {
        match event {
            WorkerEvent::Install => self.install().await.map(EventOutcome::Installed),
            WorkerEvent::Activate => self.activate().await.map(EventOutcome::Activated),
            WorkerEvent::Fetch(request) => {
                Ok(EventOutcome::Responded(self.handle_fetch(&request).await))
            }
            WorkerEvent::Message { data, reply } => self.handle_message(&data, reply).await,
            WorkerEvent::Push(data) => self.handle_push(data.as_deref()).await,
            WorkerEvent::NotificationClick {
                notification,
                action,
            } => {
                self.handle_notification_click(&notification, action.as_deref())
                    .await
            }
        }
    }

    /// Populate the static partition with the static set, then ask the host
    /// to activate without waiting for clients of the previous version.
    ///
    /// Fetch failures are logged and reported but do not fail the install.
    pub async fn install(&self) -> RecymResult<InstallReport> {
        self.set_phase(Phase::Installing).await;

        let partition = self.settings.names.static_name();
        info!("Installing {}", partition);
        self.storage.open(&partition).await?;

        info!("Caching {} static files...", self.settings.static_files.len());
        let fetches = self.settings.static_files.iter().map(|entry| async move {
            let outcome = match Request::resolve(entry, &self.settings.origin) {
                Ok(request) => self
                    .fetcher
                    .fetch(&request)
                    .await
                    .map(|response| (request, response))
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            (entry.clone(), outcome)
        });
        let results = join_all(fetches).await;

        let mut report = InstallReport {
            partition: partition.clone(),
            ..InstallReport::default()
        };

        for (entry, outcome) in results {
            let reason = match outcome {
                Ok((request, response)) if response.is_ok() => {
                    match self.storage.put(&partition, &request.key(), &response).await {
                        Ok(()) => {
                            report.cached.push(entry);
                            continue;
                        }
                        Err(e) => e.to_string(),
                    }
                }
                Ok((_, response)) => format!("HTTP {}", response.status),
                Err(reason) => reason,
            };
            report.failed.push(InstallFailure { url: entry, reason });
        }

        if report.is_complete() {
            info!("Static files cached successfully");
        } else {
            for failure in &report.failed {
                error!("Failed to cache {}: {}", failure.url, failure.reason);
            }
            error!(
                "Failed to cache static files: {} of {} failed",
                report.failed.len(),
                self.settings.static_files.len()
            );
        }

        {
            let mut state = self.state.write().await;
            state.phase = Phase::Installed;
            state.skip_waiting = true;
        }
        self.host.skip_waiting(&partition).await?;

        self.journal
            .record(
                "worker.installed",
                &json!({
                    "partition": report.partition,
                    "cached": report.cached.len(),
                    "failed": report.failed,
                }),
            )
            .await;

        Ok(report)
    }

    /// Delete every partition that is not current and claim open clients.
    /// Running it again with no new partitions deletes nothing.
    pub async fn activate(&self) -> RecymResult<ActivationReport> {
        self.set_phase(Phase::Activating).await;
        info!("Activating {}", self.version());

        let mut report = ActivationReport::default();
        for name in self.storage.keys().await? {
            if self.settings.names.is_current(&name) {
                report.retained.push(name);
                continue;
            }

            info!("Deleting old cache: {}", name);
            self.storage.delete(&name).await?;
            self.journal
                .record("partition.deleted", &json!({ "name": name }))
                .await;
            report.deleted.push(name);
        }

        report.clients_claimed = self.host.claim(&self.version()).await?;

        {
            let mut state = self.state.write().await;
            state.phase = Phase::Running;
            state.clients_claimed = report.clients_claimed;
        }

        self.journal
            .record(
                "worker.activated",
                &json!({
                    "version": self.version(),
                    "deleted": report.deleted,
                    "clients_claimed": report.clients_claimed,
                }),
            )
            .await;

        info!("Activated {}", self.version());
        Ok(report)
    }

    /// Strategy a request would be handled with
    pub fn route(&self, request: &Request) -> Strategy {
        self.settings.router.classify(request.path())
    }

    /// Answer an intercepted request
    pub async fn handle_fetch(&self, request: &Request) -> Response {
        let strategy = self.route(request);
        debug!("{} {} via {}", request.method, request.url, strategy);

        match strategy {
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
        }
    }

    async fn cache_first(&self, request: &Request) -> Response {
        let key = request.key();

        if request.method.is_cacheable() {
            match self.storage.match_any(&key).await {
                Ok(Some(cached)) => {
                    debug!("Serving from cache: {}", request.url);
                    return cached;
                }
                Ok(None) => {}
                Err(e) => warn!("Cache lookup failed for {}: {}", request.url, e),
            }
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() && request.method.is_cacheable() {
                    let partition = self.settings.names.static_name();
                    store_copy(self.storage.as_ref(), &partition, &key, &response).await;
                    debug!("Cached new resource: {}", request.url);
                }
                response
            }
            Err(e) => {
                error!("Cache first failed: {}", e);
                Response::unavailable(CACHE_FIRST_OFFLINE)
            }
        }
    }

    async fn network_first(&self, request: &Request) -> Response {
        let key = request.key();

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() && request.method.is_cacheable() {
                    let partition = self.settings.names.dynamic_name();
                    store_copy(self.storage.as_ref(), &partition, &key, &response).await;
                }
                response
            }
            Err(e) => {
                debug!("Network first falling back to cache: {}", e);
                if request.method.is_cacheable() {
                    match self.storage.match_any(&key).await {
                        Ok(Some(cached)) => return cached,
                        Ok(None) => {}
                        Err(e) => warn!("Cache lookup failed for {}: {}", request.url, e),
                    }
                }
                Response::unavailable(NETWORK_FIRST_OFFLINE)
            }
        }
    }

    async fn stale_while_revalidate(&self, request: &Request) -> Response {
        let partition = self.settings.names.dynamic_name();
        let key = request.key();

        let cached = if request.method.is_cacheable() {
            if let Err(e) = self.storage.open(&partition).await {
                warn!("Failed to open {}: {}", partition, e);
            }
            self.storage.get(&partition, &key).await.unwrap_or_else(|e| {
                warn!("Cache lookup failed for {}: {}", request.url, e);
                None
            })
        } else {
            None
        };

        let storage = Arc::clone(&self.storage);
        let fetcher = Arc::clone(&self.fetcher);
        let outgoing = request.clone();
        let refresh: Revalidation = tokio::spawn(async move {
            let response = fetcher.fetch(&outgoing).await?;
            if response.is_ok() && outgoing.method.is_cacheable() {
                store_copy(storage.as_ref(), &partition, &key, &response).await;
            }
            Ok(response)
        });

        if let Some(cached) = cached {
            debug!("Serving stale copy of {}", request.url);
            self.track(refresh).await;
            return cached;
        }

        match refresh.await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("Stale while revalidate failed: {}", e);
                Response::unavailable(STALE_OFFLINE)
            }
            Err(e) => {
                error!("Revalidation task for {} aborted: {}", request.url, e);
                Response::unavailable(STALE_OFFLINE)
            }
        }
    }

    async fn track(&self, refresh: Revalidation) {
        let mut pending = self.revalidations.lock().await;
        pending.retain(|handle| !handle.is_finished());
        pending.push(refresh);
    }

    /// Wait for background refreshes still in flight.
    /// Returns how many were awaited.
    pub async fn settle(&self) -> usize {
        let pending = std::mem::take(&mut *self.revalidations.lock().await);
        let count = pending.len();

        for handle in pending {
            match handle.await {
                Ok(Ok(response)) => debug!("Revalidated with status {}", response.status),
                Ok(Err(e)) => debug!("Revalidation failed: {}", e),
                Err(e) => warn!("Revalidation task aborted: {}", e),
            }
        }

        count
    }

    /// Handle a client control message
    pub async fn handle_message(
        &self,
        data: &serde_json::Value,
        reply: Option<ReplyPort>,
    ) -> RecymResult<EventOutcome> {
        let outcome = match ClientMessage::parse(data) {
            Some(ClientMessage::SkipWaiting) => {
                self.state.write().await.skip_waiting = true;
                info!("Skip waiting requested");
                self.host.skip_waiting(&self.version()).await?;
                EventOutcome::Handled
            }
            Some(ClientMessage::GetVersion) => match reply {
                Some(port) => {
                    let reply = VersionReply {
                        version: self.version(),
                    };
                    if port.send(reply).is_err() {
                        debug!("Version reply dropped, client went away");
                    }
                    EventOutcome::Handled
                }
                None => {
                    warn!("GET_VERSION received without a reply port");
                    EventOutcome::Ignored
                }
            },
            None => {
                debug!("Ignoring unknown message: {}", data);
                EventOutcome::Ignored
            }
        };
        Ok(outcome)
    }

    /// Show the notification for a push. A push without payload is ignored.
    pub async fn handle_push(&self, data: Option<&[u8]>) -> RecymResult<EventOutcome> {
        let Some(data) = data else {
            debug!("Push without payload");
            return Ok(EventOutcome::Ignored);
        };

        let notification = Notification::from_push_bytes(data, &self.settings.notifications)?;
        self.host.show_notification(&notification).await?;
        Ok(EventOutcome::Handled)
    }

    /// Close the clicked notification and open the page on `explore`
    pub async fn handle_notification_click(
        &self,
        notification: &Notification,
        action: Option<&str>,
    ) -> RecymResult<EventOutcome> {
        self.host.close_notification(notification).await?;

        if action == Some(ACTION_EXPLORE) {
            self.host
                .open_window(&self.settings.notifications.open_url)
                .await?;
        }

        Ok(EventOutcome::Handled)
    }

    async fn set_phase(&self, phase: Phase) {
        self.state.write().await.phase = phase;
    }
}

/// Store a response copy; failures are logged, never propagated
async fn store_copy(
    storage: &dyn CacheStorage,
    partition: &str,
    key: &RequestKey,
    response: &Response,
) {
    if let Err(e) = storage.put(partition, key, response).await {
        warn!("Failed to store {} in {}: {}", key, partition, e);
    }
}
