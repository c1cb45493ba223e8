//! Control messages posted to the worker by clients

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// A recognised control message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Activate immediately instead of waiting for old clients to close
    SkipWaiting,
    /// Ask for the active version; answered on the reply port
    GetVersion,
}

impl ClientMessage {
    /// Interpret arbitrary message data. Anything unrecognised is `None`.
    pub fn parse(data: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(data.clone()).ok()
    }
}

/// Answer to [`ClientMessage::GetVersion`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReply {
    pub version: String,
}

/// Channel a client listens on for the reply
pub type ReplyPort = oneshot::Sender<VersionReply>;
