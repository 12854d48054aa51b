//! Lesson feedback models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest accepted rating
pub const MIN_RATING: i64 = 1;

/// Highest accepted rating
pub const MAX_RATING: i64 = 5;

/// A user's rating of a lesson; one per (user, lesson)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub user_id: String,
    pub lesson_id: i64,
    pub rating: i64,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}
