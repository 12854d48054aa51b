//! Study goal endpoints
//!
//! | Endpoint | Auth | Notes |
//! |----------|------|-------|
//! | `GET /goals/choices` | No | Choice tables for every goal field |
//! | `POST /goals` | Required | 201 |
//! | `GET /goals` | Required | Own goals only |
//! | `PUT /goals/{id}` | Required | 404 for another user's goal |

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};

use tutor_store::{FieldOfStudy, Goal, GoalInput, Purpose, RankRange, StoreError, StudyHours};

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{Choice, choices};

/// Goal routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_goals).post(create_goal))
        .route("/choices", get(goal_choices))
        .route("/{id}", put(update_goal))
}

#[derive(Debug, Serialize)]
pub struct GoalChoicesResponse {
    pub field_of_study: Vec<Choice>,
    pub purpose: Vec<Choice>,
    pub study_hours: Vec<Choice>,
    pub rank_range: Vec<Choice>,
}

/// Goal create/update body; omitted choices take their defaults
#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub grade_id: i64,
    pub field_of_study: Option<String>,
    pub purpose: Option<String>,
    pub from_rank_range: Option<String>,
    pub to_rank_range: Option<String>,
    pub study_hours: Option<String>,
    #[serde(default)]
    pub average_tenth: f64,
    #[serde(default)]
    pub average_eleventh: f64,
}

impl GoalRequest {
    fn input(&self) -> Result<GoalInput> {
        Ok(GoalInput {
            grade_id: self.grade_id,
            field_of_study: parse(&self.field_of_study, "field_of_study", FieldOfStudy::from_str)?,
            purpose: parse(&self.purpose, "purpose", Purpose::from_str)?,
            from_rank_range: parse(&self.from_rank_range, "from_rank_range", RankRange::from_str)?,
            to_rank_range: parse(&self.to_rank_range, "to_rank_range", RankRange::from_str)?,
            study_hours: parse(&self.study_hours, "study_hours", StudyHours::from_str)?,
            average_tenth: self.average_tenth,
            average_eleventh: self.average_eleventh,
        })
    }
}

fn parse<T: Default>(
    value: &Option<String>,
    field: &str,
    from_str: fn(&str) -> Option<T>,
) -> Result<T> {
    match value {
        None => Ok(T::default()),
        Some(v) => from_str(v).ok_or_else(|| ApiError::validation(field, "not a valid choice")),
    }
}

/// An unknown grade is a bad field, not a missing resource
fn grade_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound { entity: "grade", .. } => {
            ApiError::validation("grade_id", "unknown grade")
        }
        other => other.into(),
    }
}

/// GET /api/v1/goals/choices
async fn goal_choices() -> Json<GoalChoicesResponse> {
    Json(GoalChoicesResponse {
        field_of_study: choices(FieldOfStudy::choices()),
        purpose: choices(Purpose::choices()),
        study_hours: choices(StudyHours::choices()),
        rank_range: choices(RankRange::choices()),
    })
}

/// POST /api/v1/goals
async fn create_goal(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<GoalRequest>,
) -> Result<(StatusCode, Json<Goal>)> {
    let goal = state
        .store
        .goals()
        .create(&user.id, &req.input()?)
        .await
        .map_err(grade_error)?;
    Ok((StatusCode::CREATED, Json(goal)))
}

/// GET /api/v1/goals
async fn list_goals(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<Goal>>> {
    Ok(Json(state.store.goals().list_for_user(&user.id).await?))
}

/// PUT /api/v1/goals/{id}
async fn update_goal(
    State(state): State<AppState>,
    user: AuthUser,
    Path(goal_id): Path<i64>,
    Json(req): Json<GoalRequest>,
) -> Result<Json<Goal>> {
    let goal = state
        .store
        .goals()
        .update(&user.id, goal_id, &req.input()?)
        .await
        .map_err(grade_error)?;
    Ok(Json(goal))
}
