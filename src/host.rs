//! Client host abstraction
//!
//! The worker never talks to pages or the notification system directly. A
//! [`ClientHost`] takes over from the previous worker, claims open clients on
//! activation, shows notifications and opens windows.

use crate::error::{RecymError, RecymResult};
use crate::worker::notification::Notification;
use async_trait::async_trait;
use console::style;
use std::io::Write;
use tracing::info;

/// Abstract client host interface
#[async_trait]
pub trait ClientHost: Send + Sync {
    /// Let `version` activate without waiting for clients of the previous
    /// worker to close
    async fn skip_waiting(&self, version: &str) -> RecymResult<()>;

    /// Make `controller` the active worker for every open client.
    /// Returns the number of clients claimed.
    async fn claim(&self, controller: &str) -> RecymResult<usize>;

    /// Open `url` in a new client window
    async fn open_window(&self, url: &str) -> RecymResult<()>;

    /// Display a notification
    async fn show_notification(&self, notification: &Notification) -> RecymResult<()>;

    /// Dismiss a notification
    async fn close_notification(&self, notification: &Notification) -> RecymResult<()>;
}

/// Host for the command line: there are no clients, notifications and
/// windows are printed to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleHost;

impl ConsoleHost {
    fn emit(lines: &[String]) -> RecymResult<()> {
        let mut out = std::io::stdout().lock();
        for line in lines {
            writeln!(out, "{}", line)
                .map_err(|e| RecymError::Host(format!("writing to terminal: {}", e)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ClientHost for ConsoleHost {
    async fn skip_waiting(&self, version: &str) -> RecymResult<()> {
        Self::emit(&[format!(
            "{} {} takes over without waiting for open clients",
            style("→").cyan(),
            version
        )])
    }

    async fn claim(&self, controller: &str) -> RecymResult<usize> {
        info!("No open clients to claim for {}", controller);
        Ok(0)
    }

    async fn open_window(&self, url: &str) -> RecymResult<()> {
        Self::emit(&[format!("{} open window {}", style("→").cyan(), url)])
    }

    async fn show_notification(&self, notification: &Notification) -> RecymResult<()> {
        let mut lines = vec![format!(
            "{} {}",
            style("Notification:").bold(),
            style(&notification.title).cyan()
        )];
        if !notification.body.is_empty() {
            lines.push(format!("  {}", notification.body));
        }
        for action in &notification.actions {
            lines.push(format!("  [{}] {}", action.action, action.title));
        }
        Self::emit(&lines)
    }

    async fn close_notification(&self, notification: &Notification) -> RecymResult<()> {
        info!("Closed notification: {}", notification.title);
        Ok(())
    }
}
