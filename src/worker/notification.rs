//! Push payloads and the notifications they produce

use crate::config::schema::NotificationsConfig;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Action id that opens the product page
pub const ACTION_EXPLORE: &str = "explore";
/// Action id that dismisses the notification
pub const ACTION_CLOSE: &str = "close";

/// JSON body of a push message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Epoch milliseconds when the push arrived
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// A user-visible notification, as handed to the client host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Build the notification shown for a push payload
    pub fn from_push(payload: PushPayload, config: &NotificationsConfig) -> Self {
        let action = |id: &str, title: &str| NotificationAction {
            action: id.to_string(),
            title: title.to_string(),
            icon: config.icon.clone(),
        };

        Self {
            title: payload.title,
            body: payload.body,
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            vibrate: config.vibrate.clone(),
            data: NotificationData {
                date_of_arrival: Utc::now().timestamp_millis(),
                primary_key: 1,
            },
            actions: vec![
                action(ACTION_EXPLORE, &config.explore_title),
                action(ACTION_CLOSE, &config.close_title),
            ],
        }
    }

    /// Parse a raw push body and build its notification
    pub fn from_push_bytes(
        data: &[u8],
        config: &NotificationsConfig,
    ) -> Result<Self, serde_json::Error> {
        let payload: PushPayload = serde_json::from_slice(data)?;
        Ok(Self::from_push(payload, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_builds_two_actions() {
        let config = NotificationsConfig::default();
        let n = Notification::from_push_bytes(
            br#"{"title": "Nuevo modelo", "body": "Rack 3 disponible"}"#,
            &config,
        )
        .unwrap();

        assert_eq!(n.title, "Nuevo modelo");
        assert_eq!(n.body, "Rack 3 disponible");
        assert_eq!(n.vibrate, vec![100, 50, 100]);
        let ids: Vec<_> = n.actions.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(ids, vec![ACTION_EXPLORE, ACTION_CLOSE]);
        assert_eq!(n.actions[0].title, "Ver en AR");
        assert_eq!(n.data.primary_key, 1);
        assert!(n.data.date_of_arrival > 0);
    }

    #[test]
    fn data_serializes_camel_case() {
        let n = Notification::from_push(
            PushPayload {
                title: "t".to_string(),
                body: String::new(),
            },
            &NotificationsConfig::default(),
        );
        let json = serde_json::to_value(&n).unwrap();
        assert!(json["data"]["dateOfArrival"].is_i64());
        assert_eq!(json["data"]["primaryKey"], 1);
    }

    #[test]
    fn malformed_push_rejected() {
        let config = NotificationsConfig::default();
        assert!(Notification::from_push_bytes(b"not json", &config).is_err());
        assert!(Notification::from_push_bytes(br#"{"body": "no title"}"#, &config).is_err());
    }
}
