//! Notification inbox endpoints
//!
//! Only the in-app inbox lives here. Reminders that have come due are moved
//! into the inbox when it is listed.
//!
//! | Endpoint | Auth | Notes |
//! |----------|------|-------|
//! | `GET /notifications` | Required | Newest first |
//! | `POST /notifications/{id}/read` | Required | 404 unless owned |
//! | `DELETE /notifications/{id}` | Required | 404 unless owned |
//! | `GET /notifications/reminders` | Required | Unsent, soonest first |
//! | `POST /notifications/reminders` | Required | 201 |

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use tutor_store::{Notification, Reminder};

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::MessageResponse;

/// Notification routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/{id}/read", post(mark_read))
        .route("/{id}", delete(delete_notification))
        .route("/reminders", get(list_reminders).post(create_reminder))
}

/// Reminder request
#[derive(Debug, Deserialize)]
pub struct ReminderRequest {
    pub message: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

const NOT_FOUND: &str = "Notification not found.";

/// GET /api/v1/notifications
async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Notification>>> {
    let repo = state.store.notifications();
    repo.deliver_due_reminders(&user.id, Utc::now()).await?;
    Ok(Json(repo.list_for_user(&user.id).await?))
}

/// POST /api/v1/notifications/{id}/read
async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(notification_id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    if !state
        .store
        .notifications()
        .mark_read(&user.id, notification_id)
        .await?
    {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    Ok(Json(MessageResponse::new("Notification marked as read.")))
}

/// DELETE /api/v1/notifications/{id}
async fn delete_notification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(notification_id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    if !state
        .store
        .notifications()
        .delete(&user.id, notification_id)
        .await?
    {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    Ok(Json(MessageResponse::new("Notification deleted successfully.")))
}

/// GET /api/v1/notifications/reminders
async fn list_reminders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Reminder>>> {
    Ok(Json(
        state.store.notifications().pending_reminders(&user.id).await?,
    ))
}

/// POST /api/v1/notifications/reminders
async fn create_reminder(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ReminderRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let (Some(message), Some(scheduled_at)) = (req.message.as_deref(), req.scheduled_at) else {
        return Err(ApiError::bad_request(
            "message and scheduled_at are required.",
        ));
    };

    state
        .store
        .notifications()
        .create_reminder(&user.id, message, scheduled_at)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Reminder created successfully.")),
    ))
}
