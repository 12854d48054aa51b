//! In-app notification and reminder models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a notification was raised
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Reminder,
    #[default]
    Update,
    Social,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reminder => "reminder",
            Self::Update => "update",
            Self::Social => "social",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "reminder" => Some(Self::Reminder),
            "update" => Some(Self::Update),
            "social" => Some(Self::Social),
            _ => None,
        }
    }
}

/// A message shown in the user's notification list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub notification_type: NotificationType,
    /// Ordering key for the list, newest first
    pub scheduled_at: DateTime<Utc>,
}

/// A user-requested reminder, pending until marked sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub user_id: String,
    pub message: String,
    pub scheduled_at: DateTime<Utc>,
    pub is_sent: bool,
}
