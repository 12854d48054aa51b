//! Analytics endpoints
//!
//! Read-side summaries, recommendations, the activity ledger and lesson
//! feedback. All routes require authentication.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use tutor_analytics::{
    DEFAULT_RECOMMENDATION_LIMIT, GlobalAnalytics, GradeCount, Recommendation, ReviewAnalytics,
    UserAnalytics, format_minutes, format_percent,
};
use tutor_store::{ActivityFilter, ActivityKind, ActivityLog, Feedback, NewActivity};

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Analytics routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(user_analytics))
        .route("/global", get(global_analytics))
        .route("/performance", get(performance_analytics))
        .route("/review", get(review_analytics))
        .route("/recommendations", get(recommendations))
        .route("/activity", get(list_activity).post(record_activity))
        .route("/feedback", get(list_feedback))
        .route("/feedback/{lesson_id}", post(submit_feedback))
}

// =============================================================================
// Request/Response types
// =============================================================================

/// Performance with rendered accuracy and time
#[derive(Debug, Serialize)]
pub struct PerformanceResponse {
    pub quiz_accuracy: String,
    pub average_time_spent: String,
    pub lessons_by_grade: Vec<GradeCount>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
}

/// Ledger listing query
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub activity_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ActivityQuery {
    fn filter(&self) -> Result<ActivityFilter> {
        let kind = self
            .activity_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(parse_kind)
            .transpose()?;

        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && start > end
        {
            return Err(ApiError::validation(
                "start_date",
                "must not be after end_date",
            ));
        }

        Ok(ActivityFilter {
            kind,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

fn parse_kind(value: &str) -> Result<ActivityKind> {
    ActivityKind::from_str(value).ok_or_else(|| {
        ApiError::validation("activity_type", format!("unknown activity type: {}", value))
    })
}

/// New ledger entry
#[derive(Debug, Deserialize)]
pub struct RecordActivityRequest {
    pub activity_type: String,
    pub lesson_id: Option<i64>,
    pub content_id: Option<i64>,
    /// Seconds
    pub time_spent: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub rating: i64,
    #[serde(default)]
    pub comments: Option<String>,
}

// =============================================================================
// Summaries
// =============================================================================

/// GET /api/v1/analytics/user
async fn user_analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserAnalytics>> {
    Ok(Json(state.analytics.user(&user.id).await?))
}

/// GET /api/v1/analytics/global
async fn global_analytics(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<GlobalAnalytics>> {
    Ok(Json(state.analytics.global().await?))
}

/// GET /api/v1/analytics/performance
async fn performance_analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PerformanceResponse>> {
    let performance = state.analytics.performance(&user.id).await?;

    Ok(Json(PerformanceResponse {
        quiz_accuracy: format_percent(performance.quiz_accuracy),
        average_time_spent: format_minutes(performance.average_time_spent),
        lessons_by_grade: performance.lessons_by_grade,
    }))
}

/// GET /api/v1/analytics/review
async fn review_analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ReviewAnalytics>> {
    Ok(Json(state.analytics.review(&user.id).await?))
}

/// GET /api/v1/analytics/recommendations
async fn recommendations(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECOMMENDATION_LIMIT);
    let recommendations = state.analytics.recommend(&user.id, limit).await?;
    Ok(Json(RecommendationResponse { recommendations }))
}

// =============================================================================
// Activity ledger
// =============================================================================

/// GET /api/v1/analytics/activity
async fn list_activity(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityLog>>> {
    let filter = query.filter()?;
    Ok(Json(state.store.activity().list(&user.id, &filter).await?))
}

/// POST /api/v1/analytics/activity
async fn record_activity(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<RecordActivityRequest>,
) -> Result<(StatusCode, Json<ActivityLog>)> {
    let mut entry = NewActivity::new(parse_kind(&req.activity_type)?);
    if let Some(lesson_id) = req.lesson_id {
        entry = entry.lesson(lesson_id);
    }
    if let Some(content_id) = req.content_id {
        entry = entry.content(content_id);
    }
    if let Some(seconds) = req.time_spent {
        entry = entry.duration(seconds);
    }

    let logged = state.store.activity().record(&user.id, entry).await?;
    Ok((StatusCode::CREATED, Json(logged)))
}

// =============================================================================
// Feedback
// =============================================================================

/// POST /api/v1/analytics/feedback/{lesson_id}
///
/// A second submission for the same lesson is refused with 400 and the
/// stored rating is kept.
async fn submit_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lesson_id): Path<i64>,
    Json(req): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<Feedback>)> {
    let feedback = state
        .store
        .feedback()
        .submit(&user.id, lesson_id, req.rating, req.comments.as_deref())
        .await
        .map_err(|e| match e {
            tutor_store::StoreError::AlreadyExists { .. } => {
                ApiError::Conflict("Feedback already submitted for this lesson.".to_string())
            }
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(feedback)))
}

/// GET /api/v1/analytics/feedback
async fn list_feedback(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<Feedback>>> {
    Ok(Json(state.store.feedback().list().await?))
}
