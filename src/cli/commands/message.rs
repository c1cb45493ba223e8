//! Message command - post a control message to the worker

use crate::cli::args::{MessageArgs, MessageKind};
use crate::config::Config;
use crate::error::{RecymError, RecymResult};
use crate::worker::{create_worker, EventOutcome, WorkerEvent};
use console::style;
use serde_json::json;
use tokio::sync::oneshot;

/// Execute the message command
pub async fn execute(args: MessageArgs, config: &Config) -> RecymResult<()> {
    let worker = create_worker(config)?;

    match args.kind {
        MessageKind::SkipWaiting => {
            worker
                .dispatch(WorkerEvent::Message {
                    data: json!({ "type": "SKIP_WAITING" }),
                    reply: None,
                })
                .await?;

            // Nothing holds the previous version open here, so it activates now
            if worker.state().await.skip_waiting {
                let report = worker.activate().await?;
                for name in &report.deleted {
                    println!("  {} deleted {}", style("•").red(), name);
                }
                println!("{} {} active", style("✓").green(), style(worker.version()).cyan());
            }
        }
        MessageKind::GetVersion => {
            let (tx, rx) = oneshot::channel();
            let outcome = worker
                .dispatch(WorkerEvent::Message {
                    data: json!({ "type": "GET_VERSION" }),
                    reply: Some(tx),
                })
                .await?;
            if !matches!(outcome, EventOutcome::Handled) {
                return Err(RecymError::Internal("version request not handled".to_string()));
            }
            let reply = rx
                .await
                .map_err(|_| RecymError::Internal("version reply channel closed".to_string()))?;
            println!("{}", serde_json::to_string(&reply)?);
        }
    }

    Ok(())
}
