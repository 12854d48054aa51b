//! Study goal repository
//!
//! Goals are owned by one user. Reads and updates are scoped to the owner;
//! another user's goal looks the same as a missing one.

use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::info;

use crate::db::{format_ts, parse_ts};
use crate::error::{Result, StoreError};
use crate::models::{FieldOfStudy, Goal, GoalInput, Purpose, RankRange, StudyHours};

/// Goal repository
pub struct GoalRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> GoalRepo<'a> {
    /// Create a new goal repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a goal for a user
    ///
    /// Fails with `Invalid` when the rank range is reversed or an average is
    /// out of range, and `NotFound` for an unknown grade.
    pub async fn create(&self, user_id: &str, input: &GoalInput) -> Result<Goal> {
        self.validate(input).await?;

        let created_at = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO goals (user_id, grade_id, field_of_study, purpose, from_rank_range,
                               to_rank_range, study_hours, average_tenth, average_eleventh, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(input.grade_id)
        .bind(input.field_of_study.as_str())
        .bind(input.purpose.as_str())
        .bind(input.from_rank_range.as_str())
        .bind(input.to_rank_range.as_str())
        .bind(input.study_hours.as_str())
        .bind(input.average_tenth)
        .bind(input.average_eleventh)
        .bind(format_ts(created_at))
        .execute(self.pool)
        .await?
        .last_insert_rowid();

        info!(user_id, goal_id = id, purpose = input.purpose.as_str(), "goal created");

        Ok(Goal {
            id,
            user_id: user_id.to_string(),
            input: input.clone(),
            created_at,
        })
    }

    /// Replace every field of a user's goal
    ///
    /// `NotFound` when the goal is missing or belongs to someone else.
    pub async fn update(&self, user_id: &str, goal_id: i64, input: &GoalInput) -> Result<Goal> {
        self.validate(input).await?;

        let result = sqlx::query(
            r#"
            UPDATE goals SET grade_id = ?, field_of_study = ?, purpose = ?, from_rank_range = ?,
                             to_rank_range = ?, study_hours = ?, average_tenth = ?, average_eleventh = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(input.grade_id)
        .bind(input.field_of_study.as_str())
        .bind(input.purpose.as_str())
        .bind(input.from_rank_range.as_str())
        .bind(input.to_rank_range.as_str())
        .bind(input.study_hours.as_str())
        .bind(input.average_tenth)
        .bind(input.average_eleventh)
        .bind(goal_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("goal", goal_id));
        }

        info!(user_id, goal_id, "goal updated");
        self.get(user_id, goal_id)
            .await?
            .ok_or_else(|| StoreError::not_found("goal", goal_id))
    }

    /// A user's goal by id
    pub async fn get(&self, user_id: &str, goal_id: i64) -> Result<Option<Goal>> {
        let row = sqlx::query("SELECT * FROM goals WHERE id = ? AND user_id = ?")
            .bind(goal_id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(Self::row_to_goal).transpose()
    }

    /// A user's goals ordered by field of study, then grade
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Goal>> {
        let rows = sqlx::query(
            "SELECT * FROM goals WHERE user_id = ? ORDER BY field_of_study, grade_id, id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(Self::row_to_goal).collect()
    }

    async fn validate(&self, input: &GoalInput) -> Result<()> {
        input
            .check()
            .map_err(|(field, message)| StoreError::invalid(field, message))?;

        let grade_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM grades WHERE id = ?)")
                .bind(input.grade_id)
                .fetch_one(self.pool)
                .await?;
        if !grade_exists {
            return Err(StoreError::not_found("grade", input.grade_id));
        }
        Ok(())
    }

    fn row_to_goal(row: &SqliteRow) -> Result<Goal> {
        let created_at: String = row.get("created_at");
        Ok(Goal {
            id: row.get("id"),
            user_id: row.get("user_id"),
            input: GoalInput {
                grade_id: row.get("grade_id"),
                field_of_study: choice(row, "field_of_study", FieldOfStudy::from_str)?,
                purpose: choice(row, "purpose", Purpose::from_str)?,
                from_rank_range: choice(row, "from_rank_range", RankRange::from_str)?,
                to_rank_range: choice(row, "to_rank_range", RankRange::from_str)?,
                study_hours: choice(row, "study_hours", StudyHours::from_str)?,
                average_tenth: row.get("average_tenth"),
                average_eleventh: row.get("average_eleventh"),
            },
            created_at: parse_ts(&created_at)?,
        })
    }
}

fn choice<T>(row: &SqliteRow, column: &'static str, parse: fn(&str) -> Option<T>) -> Result<T> {
    let value: String = row.get(column);
    parse(&value).ok_or_else(|| StoreError::invalid(column, format!("unknown choice '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;

    async fn grade(store: &Store) -> i64 {
        store.catalog().create_grade("Eleventh").await.unwrap().id
    }

    #[tokio::test]
    async fn test_create_list_update() {
        let store = Store::new_memory().await.unwrap();
        let grade_id = grade(&store).await;
        let repo = store.goals();

        let mut input = GoalInput::new(grade_id);
        input.purpose = Purpose::Entrance;
        input.from_rank_range = RankRange::R50To100;
        input.to_rank_range = RankRange::R500To1000;
        input.average_tenth = 18.5;
        let goal = repo.create("u1", &input).await.unwrap();
        assert_eq!(goal.input.field_of_study, FieldOfStudy::Experimental);

        let listed = repo.list_for_user("u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].input.purpose, Purpose::Entrance);
        assert_eq!(listed[0].input.average_tenth, 18.5);
        assert!(repo.list_for_user("u2").await.unwrap().is_empty());

        input.study_hours = StudyHours::TwoToFour;
        let updated = repo.update("u1", goal.id, &input).await.unwrap();
        assert_eq!(updated.input.study_hours, StudyHours::TwoToFour);
        assert_eq!(updated.created_at, listed[0].created_at);
    }

    #[tokio::test]
    async fn test_reversed_rank_range_rejected() {
        let store = Store::new_memory().await.unwrap();
        let grade_id = grade(&store).await;

        let mut input = GoalInput::new(grade_id);
        input.from_rank_range = RankRange::R1000To20000;
        input.to_rank_range = RankRange::R1To50;
        let err = store.goals().create("u1", &input).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid { field: "from_rank_range", .. }));
        assert!(store.goals().list_for_user("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_grade_and_foreign_goal() {
        let store = Store::new_memory().await.unwrap();
        let repo = store.goals();

        let err = repo.create("u1", &GoalInput::new(99)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "grade", .. }));

        let grade_id = grade(&store).await;
        let goal = repo.create("u1", &GoalInput::new(grade_id)).await.unwrap();
        let err = repo
            .update("u2", goal.id, &GoalInput::new(grade_id))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "goal", .. }));
        assert!(repo.get("u2", goal.id).await.unwrap().is_none());
    }
}
