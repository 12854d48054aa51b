//! Leaderboard repository

use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::debug;

use crate::db::{format_ts, parse_ts};
use crate::error::{Result, StoreError};
use crate::models::LeaderboardEntry;

/// Leaderboard repository
pub struct LeaderboardRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LeaderboardRepo<'a> {
    /// Create a new leaderboard repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add points to a user's entry, creating it on first award
    pub async fn award_points(&self, user_id: &str, points: i64) -> Result<LeaderboardEntry> {
        if points < 0 {
            return Err(StoreError::invalid("points", "must not be negative"));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO leaderboard (user_id, points, last_updated)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (user_id) DO UPDATE
                SET points = points + excluded.points, last_updated = excluded.last_updated
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(points)
        .bind(format_ts(Utc::now()))
        .fetch_one(self.pool)
        .await?;

        debug!(user_id, points, "points awarded");
        Self::row_to_entry(&row)
    }

    /// Assign ranks 1..n by points descending; ties go to the lower user id
    pub async fn recompute_ranks(&self) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE leaderboard
            SET rank = (
                SELECT COUNT(*) + 1 FROM leaderboard other
                WHERE other.points > leaderboard.points
                   OR (other.points = leaderboard.points AND other.user_id < leaderboard.user_id)
            )
            "#,
        )
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Entries in rank order
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<LeaderboardEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM leaderboard
            ORDER BY rank IS NULL, rank, points DESC, user_id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Number of entries
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leaderboard")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// A user's entry
    pub async fn get(&self, user_id: &str) -> Result<Option<LeaderboardEntry>> {
        let row = sqlx::query("SELECT * FROM leaderboard WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    fn row_to_entry(row: &SqliteRow) -> Result<LeaderboardEntry> {
        let last_updated: String = row.get("last_updated");
        Ok(LeaderboardEntry {
            user_id: row.get("user_id"),
            points: row.get("points"),
            rank: row.get("rank"),
            last_updated: parse_ts(&last_updated)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;

    #[tokio::test]
    async fn test_award_accumulates() {
        let store = Store::new_memory().await.unwrap();
        let repo = store.leaderboard();

        assert!(repo.get("u1").await.unwrap().is_none());
        repo.award_points("u1", 5).await.unwrap();
        let entry = repo.award_points("u1", 3).await.unwrap();
        assert_eq!(entry.points, 8);
        assert_eq!(entry.rank, None);
    }

    #[tokio::test]
    async fn test_ranks_by_points() {
        let store = Store::new_memory().await.unwrap();
        let repo = store.leaderboard();

        repo.award_points("carol", 10).await.unwrap();
        repo.award_points("alice", 30).await.unwrap();
        repo.award_points("bob", 10).await.unwrap();
        repo.recompute_ranks().await.unwrap();

        let board = repo.list(10, 0).await.unwrap();
        let order: Vec<_> = board
            .iter()
            .map(|e| (e.user_id.as_str(), e.rank))
            .collect();
        assert_eq!(
            order,
            [("alice", Some(1)), ("bob", Some(2)), ("carol", Some(3))]
        );
    }
}
