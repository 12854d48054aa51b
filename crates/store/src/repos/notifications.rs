//! In-app notification and reminder repository
//!
//! Delivery to devices happens elsewhere; this is the user-facing inbox.
//! Every read and write is scoped to the owning user.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::{debug, info};

use crate::db::{format_ts, parse_ts};
use crate::error::{Result, StoreError};
use crate::models::{Notification, NotificationType, Reminder};

/// Notification repository
pub struct NotificationRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> NotificationRepo<'a> {
    /// Create a new notification repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Add an unread notification to a user's inbox
    pub async fn create(
        &self,
        user_id: &str,
        kind: NotificationType,
        title: &str,
        message: &str,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Notification> {
        let id = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, title, message, notification_type, scheduled_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(message)
        .bind(kind.as_str())
        .bind(format_ts(scheduled_at))
        .execute(self.pool)
        .await?
        .last_insert_rowid();

        debug!(user_id, notification_id = id, kind = kind.as_str(), "notification created");

        Ok(Notification {
            id,
            user_id: user_id.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            is_read: false,
            notification_type: kind,
            scheduled_at,
        })
    }

    /// A user's notifications, newest first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT * FROM notifications WHERE user_id = ? ORDER BY scheduled_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(Self::row_to_notification).collect()
    }

    /// Mark a notification read; false when the user does not own it
    pub async fn mark_read(&self, user_id: &str, notification_id: i64) -> Result<bool> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
                .bind(notification_id)
                .bind(user_id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a notification; false when the user does not own it
    pub async fn delete(&self, user_id: &str, notification_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ? AND user_id = ?")
            .bind(notification_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(user_id, notification_id, "notification deleted");
        }
        Ok(deleted)
    }

    // =========================================================================
    // Reminders
    // =========================================================================

    /// Schedule a reminder
    pub async fn create_reminder(
        &self,
        user_id: &str,
        message: &str,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Reminder> {
        if message.trim().is_empty() {
            return Err(StoreError::invalid("message", "must not be empty"));
        }

        let id = sqlx::query(
            "INSERT INTO reminders (user_id, message, scheduled_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(message)
        .bind(format_ts(scheduled_at))
        .execute(self.pool)
        .await?
        .last_insert_rowid();

        info!(user_id, reminder_id = id, %scheduled_at, "reminder scheduled");

        Ok(Reminder {
            id,
            user_id: user_id.to_string(),
            message: message.to_string(),
            scheduled_at,
            is_sent: false,
        })
    }

    /// A user's unsent reminders, soonest first
    pub async fn pending_reminders(&self, user_id: &str) -> Result<Vec<Reminder>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM reminders
            WHERE user_id = ? AND is_sent = 0
            ORDER BY scheduled_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(Self::row_to_reminder).collect()
    }

    /// Move a user's due reminders into their inbox
    ///
    /// Each reminder scheduled at or before `now` becomes an unread
    /// `reminder` notification and is marked sent, in one transaction.
    pub async fn deliver_due_reminders(&self, user_id: &str, now: DateTime<Utc>) -> Result<u64> {
        let cutoff = format_ts(now);
        let mut tx = self.pool.begin().await?;

        let delivered = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, title, message, notification_type, scheduled_at)
            SELECT user_id, 'Reminder', message, ?, scheduled_at FROM reminders
            WHERE user_id = ? AND is_sent = 0 AND scheduled_at <= ?
            ORDER BY scheduled_at, id
            "#,
        )
        .bind(NotificationType::Reminder.as_str())
        .bind(user_id)
        .bind(&cutoff)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            "UPDATE reminders SET is_sent = 1 WHERE user_id = ? AND is_sent = 0 AND scheduled_at <= ?",
        )
        .bind(user_id)
        .bind(&cutoff)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if delivered > 0 {
            info!(user_id, delivered, "reminders delivered");
        }
        Ok(delivered)
    }

    fn row_to_notification(row: &SqliteRow) -> Result<Notification> {
        let kind: String = row.get("notification_type");
        let scheduled_at: String = row.get("scheduled_at");
        Ok(Notification {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            message: row.get("message"),
            is_read: row.get("is_read"),
            notification_type: NotificationType::from_str(&kind).ok_or_else(|| {
                StoreError::invalid("notification_type", format!("unknown type '{}'", kind))
            })?,
            scheduled_at: parse_ts(&scheduled_at)?,
        })
    }

    fn row_to_reminder(row: &SqliteRow) -> Result<Reminder> {
        let scheduled_at: String = row.get("scheduled_at");
        Ok(Reminder {
            id: row.get("id"),
            user_id: row.get("user_id"),
            message: row.get("message"),
            scheduled_at: parse_ts(&scheduled_at)?,
            is_sent: row.get("is_sent"),
        })
    }
}
