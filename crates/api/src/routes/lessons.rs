//! Lesson endpoints
//!
//! Catalog browsing, progress tracking and the progress dashboard.
//!
//! | Endpoint | Auth | Notes |
//! |----------|------|-------|
//! | `GET /lessons` | No | Paginated, filterable |
//! | `GET /lessons/{id}/syllabus` | Required | 404 when the lesson has none |
//! | `GET /lessons/syllabus/{id}/sections` | Required | |
//! | `GET /lessons/sections/{id}/contents` | Required | |
//! | `GET /lessons/progress` | Required | Valid progress types and statuses |
//! | `POST /lessons/progress` | Required | 201 |
//! | `PUT /lessons/progress` | Required | |
//! | `GET /lessons/dashboard` | Required | |
//! | `GET /lessons/review` | Required | 404 when nothing is in review |

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use tutor_analytics::format_percent;
use tutor_store::{
    Content, Lesson, LessonFilter, LessonStatus, ProgressEvent, ProgressType, ProgressWrite,
    Section, Syllabus, UserLesson,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{Choice, PageParams, PaginatedResponse, choices};

/// Lesson routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_lessons))
        .route("/{id}/syllabus", get(list_syllabus))
        .route("/syllabus/{id}/sections", get(list_sections))
        .route("/sections/{id}/contents", get(list_contents))
        .route(
            "/progress",
            get(progress_choices)
                .post(create_progress)
                .put(update_progress),
        )
        .route("/dashboard", get(dashboard))
        .route("/review", get(list_in_review))
}

// =============================================================================
// Request/Response types
// =============================================================================

/// Lesson listing query
#[derive(Debug, Default, Deserialize)]
pub struct ListLessonsQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub grade: Option<i64>,
    pub category: Option<i64>,
    pub sub_category: Option<i64>,
    pub search: Option<String>,
}

impl ListLessonsQuery {
    fn filter(&self) -> LessonFilter {
        LessonFilter {
            grade_id: self.grade,
            category_id: self.category,
            sub_category_id: self.sub_category,
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
        }
    }

    fn page(&self) -> PageParams {
        PageParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressChoicesResponse {
    pub progress_types: Vec<Choice>,
    pub statuses: Vec<Choice>,
}

/// Progress write request
#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    #[serde(rename = "type")]
    pub progress_type: String,
    pub id: i64,
    pub status: String,
}

impl ProgressRequest {
    fn event(&self) -> Result<ProgressEvent> {
        let progress_type = ProgressType::from_str(&self.progress_type)
            .ok_or_else(|| ApiError::validation("type", "invalid progress type"))?;
        let status = LessonStatus::from_str(&self.status)
            .ok_or_else(|| ApiError::validation("status", "invalid status value"))?;
        Ok(ProgressEvent::new(progress_type, self.id, status))
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub message: String,
    pub progress: UserLesson,
}

/// Dashboard with the progress percentage rendered for display
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub completed_lessons: i64,
    pub review_items_count: i64,
    pub overall_progress: String,
    pub new_lessons: i64,
    pub total_time_spend: f64,
}

// =============================================================================
// Catalog
// =============================================================================

/// GET /api/v1/lessons
async fn list_lessons(
    State(state): State<AppState>,
    Query(query): Query<ListLessonsQuery>,
) -> Result<Json<PaginatedResponse<Lesson>>> {
    let page = query.page().resolve(&state.pagination);
    let filter = query.filter();
    let catalog = state.store.catalog();

    let lessons = catalog
        .list_lessons(&filter, page.limit(), page.offset())
        .await?;
    let total = catalog.count_lessons(&filter).await?;

    Ok(Json(PaginatedResponse::new(lessons, total, page)))
}

/// GET /api/v1/lessons/{id}/syllabus
async fn list_syllabus(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(lesson_id): Path<i64>,
) -> Result<Json<Vec<Syllabus>>> {
    let topics = state.store.catalog().list_syllabus(lesson_id).await?;
    if topics.is_empty() {
        return Err(ApiError::not_found("No syllabus found for this lesson."));
    }
    Ok(Json(topics))
}

/// GET /api/v1/lessons/syllabus/{id}/sections
async fn list_sections(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(syllabus_id): Path<i64>,
) -> Result<Json<Vec<Section>>> {
    Ok(Json(state.store.catalog().list_sections(syllabus_id).await?))
}

/// GET /api/v1/lessons/sections/{id}/contents
async fn list_contents(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(section_id): Path<i64>,
) -> Result<Json<Vec<Content>>> {
    Ok(Json(state.store.catalog().list_contents(section_id).await?))
}

// =============================================================================
// Progress
// =============================================================================

/// GET /api/v1/lessons/progress
async fn progress_choices(_user: AuthUser) -> Json<ProgressChoicesResponse> {
    Json(ProgressChoicesResponse {
        progress_types: choices(ProgressType::choices()),
        statuses: choices(LessonStatus::choices()),
    })
}

/// POST /api/v1/lessons/progress
async fn create_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ProgressRequest>,
) -> Result<(StatusCode, Json<ProgressResponse>)> {
    let event = req.event()?;
    let progress = state
        .store
        .apply_progress(&user.id, &event, ProgressWrite::Create)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProgressResponse {
            message: format!(
                "{} progress logged as {}.",
                event.progress_type.as_str(),
                event.status.as_str()
            ),
            progress,
        }),
    ))
}

/// PUT /api/v1/lessons/progress
async fn update_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ProgressRequest>,
) -> Result<Json<ProgressResponse>> {
    let event = req.event()?;
    let progress = state
        .store
        .apply_progress(&user.id, &event, ProgressWrite::Update)
        .await?;

    Ok(Json(ProgressResponse {
        message: format!(
            "{} progress updated to {}.",
            event.progress_type.as_str(),
            event.status.as_str()
        ),
        progress,
    }))
}

/// GET /api/v1/lessons/dashboard
async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardResponse>> {
    let dashboard = state.analytics.dashboard(&user.id).await?;

    Ok(Json(DashboardResponse {
        completed_lessons: dashboard.completed_lessons,
        review_items_count: dashboard.review_items_count,
        overall_progress: format_percent(dashboard.overall_progress),
        new_lessons: dashboard.new_lessons,
        total_time_spend: dashboard.total_time_spend,
    }))
}

/// GET /api/v1/lessons/review
async fn list_in_review(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<PaginatedResponse<UserLesson>>> {
    let progress = state.store.progress();
    let total = progress
        .count_by_status(&user.id, LessonStatus::InReview)
        .await?;
    if total == 0 {
        return Err(ApiError::not_found(
            "No lessons are currently in review for this user.",
        ));
    }

    let page = params.resolve(&state.pagination);
    let records = progress
        .list_by_status(&user.id, LessonStatus::InReview, page.limit(), page.offset())
        .await?;

    Ok(Json(PaginatedResponse::new(records, total, page)))
}
