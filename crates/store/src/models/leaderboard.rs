//! Leaderboard models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's points and position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub points: i64,
    /// 1 is the top; None until ranks are recomputed
    pub rank: Option<i64>,
    pub last_updated: DateTime<Utc>,
}
