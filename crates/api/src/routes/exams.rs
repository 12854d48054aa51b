//! Exam endpoints
//!
//! Exam listing, quiz questions, answer submission and answer statistics.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use tutor_store::{AnswerStats, Exam, Question, UserAnswer};

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Exam routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exams))
        .route("/contents/{id}/questions", get(list_questions))
        .route("/answers", post(submit_answer))
        .route("/stats", get(answer_stats))
}

/// Answer submission
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_id: i64,
    pub selected_option: String,
    /// Seconds spent on the question
    #[serde(default)]
    pub time_taken: f64,
}

/// GET /api/v1/exams
async fn list_exams(State(state): State<AppState>, _user: AuthUser) -> Result<Json<Vec<Exam>>> {
    Ok(Json(state.store.exams().list().await?))
}

/// GET /api/v1/exams/contents/{id}/questions
async fn list_questions(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(content_id): Path<i64>,
) -> Result<Json<Vec<Question>>> {
    let questions = state.store.catalog().list_questions(content_id).await?;
    if questions.is_empty() {
        return Err(ApiError::not_found("No questions found for this content."));
    }
    Ok(Json(questions))
}

/// POST /api/v1/exams/answers
///
/// Grades the answer, records a quiz attempt and, when correct, awards the
/// question's score.
async fn submit_answer(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<(StatusCode, Json<UserAnswer>)> {
    let answer = state
        .store
        .submit_answer(&user.id, req.question_id, &req.selected_option, req.time_taken)
        .await?;

    Ok((StatusCode::CREATED, Json(answer)))
}

/// GET /api/v1/exams/stats
async fn answer_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<AnswerStats>> {
    Ok(Json(state.store.answers().stats(&user.id).await?))
}
