//! Review queue repository
//!
//! Set membership per (user, review type, item id). Adding an existing
//! member and removing an absent one are both silent no-ops.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::debug;

use crate::db::{format_ts, parse_ts};
use crate::error::{Result, StoreError, is_unique_violation};
use crate::models::{BulkOutcome, ReviewCounts, ReviewItem, ReviewType};

/// Resolves whether a catalog entity of a given type exists
///
/// Checked only when an item is added; later deletions of the entity leave
/// the review item in place.
#[async_trait]
pub trait ItemResolver: Send + Sync {
    async fn exists(&self, review_type: ReviewType, item_id: i64) -> Result<bool>;
}

/// Review queue repository
pub struct ReviewRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReviewRepo<'a> {
    /// Create a new review repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add an item, returning whether it was newly created
    pub async fn add(&self, user_id: &str, review_type: ReviewType, item_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO review_items (user_id, review_type, item_id, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(review_type.as_str())
        .bind(item_id)
        .bind(format_ts(Utc::now()))
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    /// Remove an item, returning whether it was present
    pub async fn remove(
        &self,
        user_id: &str,
        review_type: ReviewType,
        item_id: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM review_items WHERE user_id = ? AND review_type = ? AND item_id = ?",
        )
        .bind(user_id)
        .bind(review_type.as_str())
        .bind(item_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List a user's review items, newest first, optionally of one type
    pub async fn list(
        &self,
        user_id: &str,
        review_type: Option<ReviewType>,
    ) -> Result<Vec<ReviewItem>> {
        self.list_page(user_id, review_type, -1, 0).await
    }

    /// Paged variant of [`list`](Self::list); a negative limit means no limit
    pub async fn list_page(
        &self,
        user_id: &str,
        review_type: Option<ReviewType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReviewItem>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM review_items
            WHERE user_id = ?1 AND (?2 IS NULL OR review_type = ?2)
            ORDER BY created_at DESC, id DESC
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(user_id)
        .bind(review_type.map(|t| t.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(Self::row_to_item).collect()
    }

    /// Count a user's review items, optionally of one type
    pub async fn count(&self, user_id: &str, review_type: Option<ReviewType>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM review_items WHERE user_id = ?1 AND (?2 IS NULL OR review_type = ?2)",
        )
        .bind(user_id)
        .bind(review_type.map(|t| t.as_str()))
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Count a user's review items per type
    pub async fn counts_by_type(&self, user_id: &str) -> Result<ReviewCounts> {
        let rows = sqlx::query(
            "SELECT review_type, COUNT(*) AS n FROM review_items WHERE user_id = ? GROUP BY review_type",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let mut counts = ReviewCounts::default();
        for row in rows {
            let type_str: String = row.get("review_type");
            if let Some(review_type) = ReviewType::from_str(&type_str) {
                counts.set(review_type, row.get("n"));
            }
        }
        Ok(counts)
    }

    /// Add several items of one type
    ///
    /// Ids whose entity does not exist, or that are already queued, are
    /// reported as skipped.
    pub async fn bulk_add(
        &self,
        user_id: &str,
        review_type: ReviewType,
        item_ids: &[i64],
        resolver: &dyn ItemResolver,
    ) -> Result<BulkOutcome> {
        let mut outcome = BulkOutcome::default();

        for &item_id in item_ids {
            if !resolver.exists(review_type, item_id).await? {
                debug!(user_id, review_type = review_type.as_str(), item_id, "review target missing");
                outcome.skipped.push(item_id);
                continue;
            }
            if self.add(user_id, review_type, item_id).await? {
                outcome.applied.push(item_id);
            } else {
                outcome.skipped.push(item_id);
            }
        }

        Ok(outcome)
    }

    /// Remove several items of one type
    pub async fn bulk_remove(
        &self,
        user_id: &str,
        review_type: ReviewType,
        item_ids: &[i64],
    ) -> Result<BulkOutcome> {
        let mut outcome = BulkOutcome::default();

        for &item_id in item_ids {
            if self.remove(user_id, review_type, item_id).await? {
                outcome.applied.push(item_id);
            } else {
                outcome.skipped.push(item_id);
            }
        }

        Ok(outcome)
    }

    fn row_to_item(row: &SqliteRow) -> Result<ReviewItem> {
        let type_str: String = row.get("review_type");
        let created_at: String = row.get("created_at");
        Ok(ReviewItem {
            id: row.get("id"),
            user_id: row.get("user_id"),
            review_type: ReviewType::from_str(&type_str).ok_or_else(|| {
                StoreError::invalid("review_type", format!("unknown type: {}", type_str))
            })?,
            item_id: row.get("item_id"),
            created_at: parse_ts(&created_at)?,
        })
    }
}
