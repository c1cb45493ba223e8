//! Push and click commands - drive the notification events

use crate::cli::args::{ClickArgs, PushArgs};
use crate::config::Config;
use crate::error::RecymResult;
use crate::worker::{create_worker, EventOutcome, Notification, PushPayload, WorkerEvent};

/// Execute the push command
pub async fn push(args: PushArgs, config: &Config) -> RecymResult<()> {
    let worker = create_worker(config)?;

    let outcome = worker
        .dispatch(WorkerEvent::Push(args.payload.map(String::into_bytes)))
        .await?;

    if matches!(outcome, EventOutcome::Ignored) {
        println!("Push without payload, nothing to show.");
    }

    Ok(())
}

/// Execute the click command
pub async fn click(args: ClickArgs, config: &Config) -> RecymResult<()> {
    let worker = create_worker(config)?;

    let notification = Notification::from_push(
        PushPayload {
            title: args.title,
            body: String::new(),
        },
        &config.notifications,
    );

    worker
        .dispatch(WorkerEvent::NotificationClick {
            notification,
            action: args.action,
        })
        .await?;

    Ok(())
}
