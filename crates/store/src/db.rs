//! Database connection and schema management
//!
//! A single SQLite database holds the catalog (grades through questions),
//! exams, per-user state (progress, answers, review items, feedback,
//! leaderboard, goals, notifications, reminders) and the append-only
//! activity ledger.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::error::{Result, StoreError};

/// Store handle
///
/// Cheap to clone; the pool is reference counted.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open or create a database file
    ///
    /// Creates parent directories and the schema if missing.
    pub async fn open<P: AsRef<Path>>(path: P, max_connections: u32) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::invalid(
                    "path",
                    format!("failed to create directory {}: {}", parent.display(), e),
                )
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;

        info!(path = %path.display(), "Store opened");
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    ///
    /// Uses a single long-lived connection so every query sees the same
    /// database.
    pub async fn new_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Underlying connection pool, for read-side aggregations
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial query
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn init_schema(&self) -> Result<()> {
        // === Identity ===
        sqlx::query(SCHEMA_USERS).execute(&self.pool).await?;

        // === Catalog ===
        sqlx::query(SCHEMA_GRADES).execute(&self.pool).await?;
        sqlx::query(SCHEMA_CATEGORIES).execute(&self.pool).await?;
        sqlx::query(SCHEMA_SUB_CATEGORIES).execute(&self.pool).await?;
        sqlx::query(SCHEMA_LESSONS).execute(&self.pool).await?;
        sqlx::query(SCHEMA_SYLLABUS).execute(&self.pool).await?;
        sqlx::query(SCHEMA_SECTIONS).execute(&self.pool).await?;
        sqlx::query(SCHEMA_CONTENTS).execute(&self.pool).await?;
        sqlx::query(SCHEMA_QUESTIONS).execute(&self.pool).await?;
        sqlx::query(SCHEMA_EXAMS).execute(&self.pool).await?;
        sqlx::query(SCHEMA_EXAM_QUESTIONS).execute(&self.pool).await?;

        // === Per-user state ===
        sqlx::query(SCHEMA_USER_LESSONS).execute(&self.pool).await?;
        sqlx::query(SCHEMA_USER_ANSWERS).execute(&self.pool).await?;
        sqlx::query(SCHEMA_ACTIVITY_LOGS).execute(&self.pool).await?;
        sqlx::query(SCHEMA_REVIEW_ITEMS).execute(&self.pool).await?;
        sqlx::query(SCHEMA_FEEDBACK).execute(&self.pool).await?;
        sqlx::query(SCHEMA_LEADERBOARD).execute(&self.pool).await?;
        sqlx::query(SCHEMA_GOALS).execute(&self.pool).await?;
        sqlx::query(SCHEMA_NOTIFICATIONS).execute(&self.pool).await?;
        sqlx::query(SCHEMA_REMINDERS).execute(&self.pool).await?;

        // Indexes
        for index in INDEXES {
            sqlx::query(index).execute(&self.pool).await?;
        }

        info!("Store schema initialized");
        Ok(())
    }
}

/// Format a timestamp for storage
///
/// Fixed precision keeps TEXT ordering identical to chronological ordering.
pub(crate) fn format_ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub(crate) fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::invalid("timestamp", format!("malformed '{}': {}", s, e)))
}

// =============================================================================
// Identity
// =============================================================================

const SCHEMA_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    phone_number TEXT UNIQUE NOT NULL,
    password_hash TEXT,
    referral_code TEXT UNIQUE NOT NULL,
    referred_by TEXT REFERENCES users(id),
    created_at TEXT NOT NULL
)
"#;

// =============================================================================
// Catalog
// =============================================================================

const SCHEMA_GRADES: &str = r#"
CREATE TABLE IF NOT EXISTS grades (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL
)
"#;

const SCHEMA_CATEGORIES: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT
)
"#;

const SCHEMA_SUB_CATEGORIES: &str = r#"
CREATE TABLE IF NOT EXISTS sub_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT
)
"#;

const SCHEMA_LESSONS: &str = r#"
CREATE TABLE IF NOT EXISTS lessons (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    grade_id INTEGER REFERENCES grades(id) ON DELETE SET NULL,
    category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
    sub_category_id INTEGER REFERENCES sub_categories(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL
)
"#;

const SCHEMA_SYLLABUS: &str = r#"
CREATE TABLE IF NOT EXISTS syllabus (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lesson_id INTEGER NOT NULL REFERENCES lessons(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    position INTEGER NOT NULL DEFAULT 0,
    stars INTEGER NOT NULL DEFAULT 1 CHECK (stars BETWEEN 1 AND 5),
    estimate_study_time INTEGER NOT NULL DEFAULT 0 CHECK (estimate_study_time >= 0)
)
"#;

const SCHEMA_SECTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS sections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    syllabus_id INTEGER NOT NULL REFERENCES syllabus(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    section_type TEXT NOT NULL,
    position INTEGER NOT NULL DEFAULT 0
)
"#;

const SCHEMA_CONTENTS: &str = r#"
CREATE TABLE IF NOT EXISTS contents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    section_id INTEGER NOT NULL REFERENCES sections(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    content_type TEXT NOT NULL,
    body TEXT NOT NULL DEFAULT '',
    url TEXT
)
"#;

const SCHEMA_QUESTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS questions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content_id INTEGER NOT NULL REFERENCES contents(id) ON DELETE CASCADE,
    text TEXT NOT NULL,
    options TEXT NOT NULL DEFAULT '[]',
    correct_answer TEXT NOT NULL,
    explanation TEXT NOT NULL DEFAULT '',
    difficulty TEXT NOT NULL DEFAULT 'medium',
    tags TEXT NOT NULL DEFAULT '[]',
    score INTEGER NOT NULL DEFAULT 1 CHECK (score >= 0)
)
"#;

const SCHEMA_EXAMS: &str = r#"
CREATE TABLE IF NOT EXISTS exams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    created_by TEXT REFERENCES users(id) ON DELETE SET NULL,
    duration INTEGER NOT NULL DEFAULT 0 CHECK (duration >= 0)
)
"#;

const SCHEMA_EXAM_QUESTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS exam_questions (
    exam_id INTEGER NOT NULL REFERENCES exams(id) ON DELETE CASCADE,
    question_id INTEGER NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    PRIMARY KEY (exam_id, question_id)
)
"#;

// =============================================================================
// Per-user state
// =============================================================================

const SCHEMA_USER_LESSONS: &str = r#"
CREATE TABLE IF NOT EXISTS user_lessons (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    lesson_id INTEGER NOT NULL REFERENCES lessons(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'not_started',
    progress_percentage REAL NOT NULL DEFAULT 0,
    accuracy_percentage REAL NOT NULL DEFAULT 0,
    time_spent REAL,
    points_earned INTEGER NOT NULL DEFAULT 0,
    last_accessed_at TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (user_id, lesson_id)
)
"#;

const SCHEMA_USER_ANSWERS: &str = r#"
CREATE TABLE IF NOT EXISTS user_answers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    question_id INTEGER NOT NULL,
    selected_option TEXT NOT NULL,
    is_correct INTEGER NOT NULL,
    time_taken REAL NOT NULL DEFAULT 0,
    attempt_number INTEGER NOT NULL,
    answered_at TEXT NOT NULL
)
"#;

const SCHEMA_ACTIVITY_LOGS: &str = r#"
CREATE TABLE IF NOT EXISTS activity_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    lesson_id INTEGER,
    content_id INTEGER,
    activity_type TEXT NOT NULL,
    time_spent INTEGER CHECK (time_spent IS NULL OR time_spent >= 0),
    timestamp TEXT NOT NULL
)
"#;

const SCHEMA_REVIEW_ITEMS: &str = r#"
CREATE TABLE IF NOT EXISTS review_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    review_type TEXT NOT NULL,
    item_id INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (user_id, review_type, item_id)
)
"#;

const SCHEMA_FEEDBACK: &str = r#"
CREATE TABLE IF NOT EXISTS feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    lesson_id INTEGER NOT NULL REFERENCES lessons(id) ON DELETE CASCADE,
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    comments TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (user_id, lesson_id)
)
"#;

const SCHEMA_LEADERBOARD: &str = r#"
CREATE TABLE IF NOT EXISTS leaderboard (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT UNIQUE NOT NULL,
    points INTEGER NOT NULL DEFAULT 0 CHECK (points >= 0),
    rank INTEGER,
    last_updated TEXT NOT NULL
)
"#;

const SCHEMA_GOALS: &str = r#"
CREATE TABLE IF NOT EXISTS goals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    grade_id INTEGER NOT NULL REFERENCES grades(id) ON DELETE CASCADE,
    field_of_study TEXT NOT NULL,
    purpose TEXT NOT NULL,
    from_rank_range TEXT NOT NULL,
    to_rank_range TEXT NOT NULL,
    study_hours TEXT NOT NULL,
    average_tenth REAL NOT NULL DEFAULT 0 CHECK (average_tenth BETWEEN 0 AND 20),
    average_eleventh REAL NOT NULL DEFAULT 0 CHECK (average_eleventh BETWEEN 0 AND 20),
    created_at TEXT NOT NULL
)
"#;

const SCHEMA_NOTIFICATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS notifications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    message TEXT NOT NULL,
    is_read INTEGER NOT NULL DEFAULT 0,
    notification_type TEXT NOT NULL,
    scheduled_at TEXT NOT NULL
)
"#;

const SCHEMA_REMINDERS: &str = r#"
CREATE TABLE IF NOT EXISTS reminders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    message TEXT NOT NULL,
    scheduled_at TEXT NOT NULL,
    is_sent INTEGER NOT NULL DEFAULT 0
)
"#;

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_lessons_grade ON lessons(grade_id)",
    "CREATE INDEX IF NOT EXISTS idx_syllabus_lesson ON syllabus(lesson_id)",
    "CREATE INDEX IF NOT EXISTS idx_sections_syllabus ON sections(syllabus_id)",
    "CREATE INDEX IF NOT EXISTS idx_contents_section ON contents(section_id)",
    "CREATE INDEX IF NOT EXISTS idx_questions_content ON questions(content_id)",
    "CREATE INDEX IF NOT EXISTS idx_user_lessons_user ON user_lessons(user_id, status)",
    "CREATE INDEX IF NOT EXISTS idx_answers_user_question ON user_answers(user_id, question_id)",
    "CREATE INDEX IF NOT EXISTS idx_activity_user_time ON activity_logs(user_id, timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_activity_lesson ON activity_logs(lesson_id)",
    "CREATE INDEX IF NOT EXISTS idx_review_user_type ON review_items(user_id, review_type)",
    "CREATE INDEX IF NOT EXISTS idx_goals_user ON goals(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, scheduled_at)",
    "CREATE INDEX IF NOT EXISTS idx_reminders_user ON reminders(user_id, is_sent)",
];
