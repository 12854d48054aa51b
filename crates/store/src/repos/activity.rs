//! Activity ledger repository
//!
//! Append-only: entries are inserted and read, never updated or deleted.

use chrono::{Days, NaiveTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::debug;

use crate::db::{format_ts, parse_ts};
use crate::error::{Result, StoreError};
use crate::models::{ActivityFilter, ActivityKind, ActivityLog, NewActivity};

/// Activity ledger repository
pub struct ActivityRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ActivityRepo<'a> {
    /// Create a new activity repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one entry, timestamped now
    pub async fn record(&self, user_id: &str, entry: NewActivity) -> Result<ActivityLog> {
        if entry.time_spent.is_some_and(|secs| secs < 0) {
            return Err(StoreError::invalid("time_spent", "must not be negative"));
        }

        let timestamp = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO activity_logs (user_id, lesson_id, content_id, activity_type, time_spent, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(entry.lesson_id)
        .bind(entry.content_id)
        .bind(entry.kind.as_str())
        .bind(entry.time_spent)
        .bind(format_ts(timestamp))
        .execute(self.pool)
        .await?
        .last_insert_rowid();

        debug!(
            user_id,
            kind = entry.kind.as_str(),
            lesson_id = ?entry.lesson_id,
            "activity recorded"
        );

        Ok(ActivityLog {
            id,
            user_id: user_id.to_string(),
            lesson_id: entry.lesson_id,
            content_id: entry.content_id,
            kind: entry.kind,
            time_spent: entry.time_spent,
            timestamp,
        })
    }

    /// Total recorded seconds for a user; zero when there are no entries
    pub async fn total_time(&self, user_id: &str) -> Result<i64> {
        let total: Option<i64> =
            sqlx::query_scalar("SELECT SUM(time_spent) FROM activity_logs WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;

        Ok(total.unwrap_or(0))
    }

    /// Mean of a user's known durations in seconds; zero when none
    pub async fn average_time(&self, user_id: &str) -> Result<f64> {
        let avg: Option<f64> =
            sqlx::query_scalar("SELECT AVG(time_spent) FROM activity_logs WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;

        Ok(avg.unwrap_or(0.0))
    }

    /// A user's entries, newest first
    pub async fn list(&self, user_id: &str, filter: &ActivityFilter) -> Result<Vec<ActivityLog>> {
        let start = filter
            .start_date
            .map(|d| format_ts(d.and_time(NaiveTime::MIN).and_utc()));
        // End date is inclusive: compare against the following midnight
        let end = filter
            .end_date
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .map(|d| format_ts(d.and_time(NaiveTime::MIN).and_utc()));

        let rows = sqlx::query(
            r#"
            SELECT * FROM activity_logs
            WHERE user_id = ?1
              AND (?2 IS NULL OR activity_type = ?2)
              AND (?3 IS NULL OR timestamp >= ?3)
              AND (?4 IS NULL OR timestamp < ?4)
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.kind.map(|k| k.as_str()))
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Number of entries across all users
    pub async fn count_all(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Lesson with the most entries and its entry count
    ///
    /// Ties go to the lowest lesson id.
    pub async fn most_popular_lesson(&self) -> Result<Option<(i64, i64)>> {
        let row = sqlx::query(
            r#"
            SELECT lesson_id, COUNT(*) AS n
            FROM activity_logs
            WHERE lesson_id IS NOT NULL
            GROUP BY lesson_id
            ORDER BY n DESC, lesson_id ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|row| (row.get("lesson_id"), row.get("n"))))
    }

    fn row_to_entry(row: &SqliteRow) -> Result<ActivityLog> {
        let kind: String = row.get("activity_type");
        let timestamp: String = row.get("timestamp");
        Ok(ActivityLog {
            id: row.get("id"),
            user_id: row.get("user_id"),
            lesson_id: row.get("lesson_id"),
            content_id: row.get("content_id"),
            kind: ActivityKind::from_str(&kind).ok_or_else(|| {
                StoreError::invalid("activity_type", format!("unknown kind: {}", kind))
            })?,
            time_spent: row.get("time_spent"),
            timestamp: parse_ts(&timestamp)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_total_time_zero_when_empty() {
        let store = Store::new_memory().await.unwrap();
        let repo = store.activity();

        assert_eq!(repo.total_time("nobody").await.unwrap(), 0);
        assert_eq!(repo.average_time("nobody").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_record_and_sum() {
        let store = Store::new_memory().await.unwrap();
        let repo = store.activity();

        repo.record("u1", NewActivity::new(ActivityKind::View).lesson(1).duration(30))
            .await
            .unwrap();
        repo.record("u1", NewActivity::new(ActivityKind::QuizAttempt).lesson(1).duration(90))
            .await
            .unwrap();
        // Unknown duration counts as nothing
        repo.record("u1", NewActivity::new(ActivityKind::Completion).lesson(1))
            .await
            .unwrap();
        repo.record("u2", NewActivity::new(ActivityKind::View).duration(500))
            .await
            .unwrap();

        assert_eq!(repo.total_time("u1").await.unwrap(), 120);
        assert_eq!(repo.average_time("u1").await.unwrap(), 60.0);
        assert_eq!(repo.count_all().await.unwrap(), 4);

        // Visible immediately, newest first
        let entries = repo.list("u1", &ActivityFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, ActivityKind::Completion);
        assert_eq!(entries[2].kind, ActivityKind::View);
    }

    #[tokio::test]
    async fn test_negative_duration_rejected() {
        let store = Store::new_memory().await.unwrap();
        let err = store
            .activity()
            .record("u1", NewActivity::new(ActivityKind::View).duration(-5))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid { field: "time_spent", .. }));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let store = Store::new_memory().await.unwrap();
        let repo = store.activity();

        repo.record("u1", NewActivity::new(ActivityKind::View)).await.unwrap();
        repo.record("u1", NewActivity::new(ActivityKind::QuizAttempt))
            .await
            .unwrap();

        let quiz_only = ActivityFilter {
            kind: Some(ActivityKind::QuizAttempt),
            ..Default::default()
        };
        let entries = repo.list("u1", &quiz_only).await.unwrap();
        assert_eq!(entries.len(), 1);

        let today = Utc::now().date_naive();
        let today_only = ActivityFilter {
            start_date: Some(today),
            end_date: Some(today),
            ..Default::default()
        };
        assert_eq!(repo.list("u1", &today_only).await.unwrap().len(), 2);

        let past = ActivityFilter {
            end_date: NaiveDate::from_ymd_opt(2000, 1, 1),
            ..Default::default()
        };
        assert!(repo.list("u1", &past).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_most_popular_tie_breaks_on_lowest_id() {
        let store = Store::new_memory().await.unwrap();
        let repo = store.activity();

        assert_eq!(repo.most_popular_lesson().await.unwrap(), None);

        for lesson in [2, 1, 2, 1, 3] {
            repo.record("u1", NewActivity::new(ActivityKind::View).lesson(lesson))
                .await
                .unwrap();
        }
        assert_eq!(repo.most_popular_lesson().await.unwrap(), Some((1, 2)));
    }
}
