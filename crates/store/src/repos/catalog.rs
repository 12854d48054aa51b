//! Catalog repository
//!
//! Inserts and reads for grades, categories, lessons and the syllabus tree.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};

use crate::db::{format_ts, parse_ts};
use crate::error::{Result, StoreError, insert_conflict};
use crate::models::{
    Category, Content, ContentType, Difficulty, Grade, Lesson, LessonFilter, LessonStatus,
    Question, QuestionLocation, ReviewType, Section, SectionType, SubCategory, Syllabus,
};
use crate::repos::review::ItemResolver;

/// Catalog repository
pub struct CatalogRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogRepo<'a> {
    /// Create a new catalog repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Classification
    // =========================================================================

    /// Create a grade
    pub async fn create_grade(&self, name: &str) -> Result<Grade> {
        let id = sqlx::query("INSERT INTO grades (name) VALUES (?)")
            .bind(name)
            .execute(self.pool)
            .await
            .map_err(|e| insert_conflict(e, "grade", name))?
            .last_insert_rowid();

        Ok(Grade {
            id,
            name: name.to_string(),
        })
    }

    /// List all grades
    pub async fn list_grades(&self) -> Result<Vec<Grade>> {
        let rows = sqlx::query("SELECT id, name FROM grades ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| Grade {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    /// Create a category
    pub async fn create_category(&self, name: &str, description: Option<&str>) -> Result<Category> {
        let id = sqlx::query("INSERT INTO categories (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(self.pool)
            .await?
            .last_insert_rowid();

        Ok(Category {
            id,
            name: name.to_string(),
            description: description.map(String::from),
        })
    }

    /// Create a sub-category under an existing category
    pub async fn create_sub_category(&self, category_id: i64, name: &str) -> Result<SubCategory> {
        let id = sqlx::query("INSERT INTO sub_categories (category_id, name) VALUES (?, ?)")
            .bind(category_id)
            .bind(name)
            .execute(self.pool)
            .await?
            .last_insert_rowid();

        Ok(SubCategory {
            id,
            category_id,
            name: name.to_string(),
            description: None,
        })
    }

    // =========================================================================
    // Lessons
    // =========================================================================

    /// Store a lesson, returning it with its assigned id
    pub async fn create_lesson(&self, lesson: &Lesson) -> Result<Lesson> {
        let id = sqlx::query(
            r#"
            INSERT INTO lessons (title, description, grade_id, category_id, sub_category_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&lesson.title)
        .bind(&lesson.description)
        .bind(lesson.grade_id)
        .bind(lesson.category_id)
        .bind(lesson.sub_category_id)
        .bind(format_ts(lesson.created_at))
        .execute(self.pool)
        .await?
        .last_insert_rowid();

        Ok(Lesson {
            id,
            ..lesson.clone()
        })
    }

    /// Get a lesson by id
    pub async fn get_lesson(&self, id: i64) -> Result<Option<Lesson>> {
        let row = sqlx::query("SELECT * FROM lessons WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(Self::row_to_lesson).transpose()
    }

    /// List lessons matching a filter, in id order
    pub async fn list_lessons(
        &self,
        filter: &LessonFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Lesson>> {
        let search = filter.search.as_ref().map(|s| format!("%{}%", s));

        let rows = sqlx::query(
            r#"
            SELECT * FROM lessons
            WHERE (?1 IS NULL OR grade_id = ?1)
              AND (?2 IS NULL OR category_id = ?2)
              AND (?3 IS NULL OR sub_category_id = ?3)
              AND (?4 IS NULL OR title LIKE ?4 OR description LIKE ?4)
            ORDER BY id
            LIMIT ?5 OFFSET ?6
            "#,
        )
        .bind(filter.grade_id)
        .bind(filter.category_id)
        .bind(filter.sub_category_id)
        .bind(search)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(Self::row_to_lesson).collect()
    }

    /// Count lessons matching a filter
    pub async fn count_lessons(&self, filter: &LessonFilter) -> Result<i64> {
        let search = filter.search.as_ref().map(|s| format!("%{}%", s));

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM lessons
            WHERE (?1 IS NULL OR grade_id = ?1)
              AND (?2 IS NULL OR category_id = ?2)
              AND (?3 IS NULL OR sub_category_id = ?3)
              AND (?4 IS NULL OR title LIKE ?4 OR description LIKE ?4)
            "#,
        )
        .bind(filter.grade_id)
        .bind(filter.category_id)
        .bind(filter.sub_category_id)
        .bind(search)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Lessons the user has no progress record for, in storage order
    pub async fn list_not_started(&self, user_id: &str, limit: i64) -> Result<Vec<Lesson>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM lessons
            WHERE id NOT IN (SELECT lesson_id FROM user_lessons WHERE user_id = ?)
            ORDER BY id
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(Self::row_to_lesson).collect()
    }

    /// Lessons whose progress record for the user has the given status
    pub async fn list_with_status(
        &self,
        user_id: &str,
        status: LessonStatus,
        limit: i64,
    ) -> Result<Vec<Lesson>> {
        let rows = sqlx::query(
            r#"
            SELECT l.* FROM lessons l
            JOIN user_lessons ul ON ul.lesson_id = l.id
            WHERE ul.user_id = ? AND ul.status = ?
            ORDER BY l.id
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(status.as_str())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(Self::row_to_lesson).collect()
    }

    // =========================================================================
    // Syllabus tree
    // =========================================================================

    /// Store a syllabus topic
    pub async fn create_syllabus(&self, topic: &Syllabus) -> Result<Syllabus> {
        topic.validate()?;

        let id = sqlx::query(
            r#"
            INSERT INTO syllabus (lesson_id, title, description, position, stars, estimate_study_time)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(topic.lesson_id)
        .bind(&topic.title)
        .bind(&topic.description)
        .bind(topic.position)
        .bind(topic.stars)
        .bind(topic.estimate_study_time)
        .execute(self.pool)
        .await?
        .last_insert_rowid();

        Ok(Syllabus {
            id,
            ..topic.clone()
        })
    }

    /// Syllabus topics of a lesson in display order
    pub async fn list_syllabus(&self, lesson_id: i64) -> Result<Vec<Syllabus>> {
        let rows = sqlx::query("SELECT * FROM syllabus WHERE lesson_id = ? ORDER BY position, id")
            .bind(lesson_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| Syllabus {
                id: row.get("id"),
                lesson_id: row.get("lesson_id"),
                title: row.get("title"),
                description: row.get("description"),
                position: row.get("position"),
                stars: row.get("stars"),
                estimate_study_time: row.get("estimate_study_time"),
            })
            .collect())
    }

    /// Store a section
    pub async fn create_section(&self, section: &Section) -> Result<Section> {
        let id = sqlx::query(
            "INSERT INTO sections (syllabus_id, title, section_type, position) VALUES (?, ?, ?, ?)",
        )
        .bind(section.syllabus_id)
        .bind(&section.title)
        .bind(section.section_type.as_str())
        .bind(section.position)
        .execute(self.pool)
        .await?
        .last_insert_rowid();

        Ok(Section {
            id,
            ..section.clone()
        })
    }

    /// Sections of a syllabus topic in display order
    pub async fn list_sections(&self, syllabus_id: i64) -> Result<Vec<Section>> {
        let rows =
            sqlx::query("SELECT * FROM sections WHERE syllabus_id = ? ORDER BY position, id")
                .bind(syllabus_id)
                .fetch_all(self.pool)
                .await?;

        rows.iter()
            .map(|row| {
                let type_str: String = row.get("section_type");
                Ok(Section {
                    id: row.get("id"),
                    syllabus_id: row.get("syllabus_id"),
                    title: row.get("title"),
                    section_type: SectionType::from_str(&type_str).ok_or_else(|| {
                        StoreError::invalid("section_type", format!("unknown type: {}", type_str))
                    })?,
                    position: row.get("position"),
                })
            })
            .collect()
    }

    /// Store a content item
    pub async fn create_content(&self, content: &Content) -> Result<Content> {
        content.validate()?;

        let id = sqlx::query(
            "INSERT INTO contents (section_id, title, content_type, body, url) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(content.section_id)
        .bind(&content.title)
        .bind(content.content_type.as_str())
        .bind(&content.body)
        .bind(&content.url)
        .execute(self.pool)
        .await?
        .last_insert_rowid();

        Ok(Content {
            id,
            ..content.clone()
        })
    }

    /// Contents of a section
    pub async fn list_contents(&self, section_id: i64) -> Result<Vec<Content>> {
        let rows = sqlx::query("SELECT * FROM contents WHERE section_id = ? ORDER BY id")
            .bind(section_id)
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(Self::row_to_content).collect()
    }

    // =========================================================================
    // Questions
    // =========================================================================

    /// Store a question
    pub async fn create_question(&self, question: &Question) -> Result<Question> {
        let id = sqlx::query(
            r#"
            INSERT INTO questions (content_id, text, options, correct_answer, explanation, difficulty, tags, score)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(question.content_id)
        .bind(&question.text)
        .bind(serde_json::to_string(&question.options)?)
        .bind(&question.correct_answer)
        .bind(&question.explanation)
        .bind(question.difficulty.as_str())
        .bind(serde_json::to_string(&question.tags)?)
        .bind(question.score)
        .execute(self.pool)
        .await?
        .last_insert_rowid();

        Ok(Question {
            id,
            ..question.clone()
        })
    }

    /// Get a question by id
    pub async fn get_question(&self, id: i64) -> Result<Option<Question>> {
        let row = sqlx::query("SELECT * FROM questions WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(Self::row_to_question).transpose()
    }

    /// Questions attached to a content item
    pub async fn list_questions(&self, content_id: i64) -> Result<Vec<Question>> {
        let rows = sqlx::query("SELECT * FROM questions WHERE content_id = ? ORDER BY id")
            .bind(content_id)
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(Self::row_to_question).collect()
    }

    // =========================================================================
    // Tree lookups
    // =========================================================================

    /// Lesson owning a syllabus topic
    pub async fn lesson_for_syllabus(&self, syllabus_id: i64) -> Result<Option<i64>> {
        let lesson_id = sqlx::query_scalar("SELECT lesson_id FROM syllabus WHERE id = ?")
            .bind(syllabus_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(lesson_id)
    }

    /// Lesson owning a content item
    pub async fn lesson_for_content(&self, content_id: i64) -> Result<Option<i64>> {
        let lesson_id = sqlx::query_scalar(
            r#"
            SELECT sy.lesson_id
            FROM contents c
            JOIN sections se ON se.id = c.section_id
            JOIN syllabus sy ON sy.id = se.syllabus_id
            WHERE c.id = ?
            "#,
        )
        .bind(content_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(lesson_id)
    }

    /// Lesson and content a question belongs to
    pub async fn locate_question(&self, question_id: i64) -> Result<Option<QuestionLocation>> {
        let row = sqlx::query(
            r#"
            SELECT sy.lesson_id, q.content_id
            FROM questions q
            JOIN contents c ON c.id = q.content_id
            JOIN sections se ON se.id = c.section_id
            JOIN syllabus sy ON sy.id = se.syllabus_id
            WHERE q.id = ?
            "#,
        )
        .bind(question_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|row| QuestionLocation {
            lesson_id: row.get("lesson_id"),
            content_id: row.get("content_id"),
        }))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn row_to_lesson(row: &SqliteRow) -> Result<Lesson> {
        let created_at: String = row.get("created_at");
        Ok(Lesson {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            grade_id: row.get("grade_id"),
            category_id: row.get("category_id"),
            sub_category_id: row.get("sub_category_id"),
            created_at: parse_ts(&created_at)?,
        })
    }

    fn row_to_content(row: &SqliteRow) -> Result<Content> {
        let type_str: String = row.get("content_type");
        Ok(Content {
            id: row.get("id"),
            section_id: row.get("section_id"),
            title: row.get("title"),
            content_type: ContentType::from_str(&type_str).ok_or_else(|| {
                StoreError::invalid("content_type", format!("unknown type: {}", type_str))
            })?,
            body: row.get("body"),
            url: row.get("url"),
        })
    }

    fn row_to_question(row: &SqliteRow) -> Result<Question> {
        let options: String = row.get("options");
        let tags: String = row.get("tags");
        let difficulty: String = row.get("difficulty");
        Ok(Question {
            id: row.get("id"),
            content_id: row.get("content_id"),
            text: row.get("text"),
            options: serde_json::from_str(&options)?,
            correct_answer: row.get("correct_answer"),
            explanation: row.get("explanation"),
            difficulty: Difficulty::from_str(&difficulty).unwrap_or_default(),
            tags: serde_json::from_str(&tags)?,
            score: row.get("score"),
        })
    }
}

#[async_trait]
impl ItemResolver for CatalogRepo<'_> {
    async fn exists(&self, review_type: ReviewType, item_id: i64) -> Result<bool> {
        // Table names come from a fixed match, never from input
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)",
            review_type.table()
        );
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(item_id)
            .fetch_one(self.pool)
            .await?;

        Ok(exists)
    }
}
