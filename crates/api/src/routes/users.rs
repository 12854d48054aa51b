//! User endpoints
//!
//! OTP issue and verify, signup, login and password changes.
//!
//! | Endpoint | Auth | Notes |
//! |----------|------|-------|
//! | `POST /users/otp` | No | 202 with the delivery outcome |
//! | `POST /users/otp/verify` | No | 400 on a wrong or expired code |
//! | `POST /users/signup` | No | 201 |
//! | `POST /users/login` | No | 401 on bad credentials |
//! | `POST /users/password` | Required | Changes the caller's password |

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use tutor_auth::{AuthResponse, Signup, SmsDelivery};
use tutor_store::User;

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::MessageResponse;

/// User routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/otp", post(issue_otp))
        .route("/otp/verify", post(verify_otp))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/password", post(set_password))
}

// =============================================================================
// Request/Response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
pub struct OtpResponse {
    pub message: String,
    pub delivery: SmsDelivery,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone_number: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub phone_number: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub referral_code: Option<String>,
}

impl From<SignupRequest> for Signup {
    fn from(req: SignupRequest) -> Self {
        Self {
            phone_number: req.phone_number,
            password: req.password,
            confirm_password: req.confirm_password,
            referral_code: req.referral_code,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/v1/users/otp
///
/// The code is stored even when the SMS gateway fails; the failure is
/// reported in `delivery`.
async fn issue_otp(
    State(state): State<AppState>,
    Json(req): Json<OtpRequest>,
) -> Result<(StatusCode, Json<OtpResponse>)> {
    let delivery = state.otp.issue(&req.phone_number).await?;

    let message = if delivery.is_sent() {
        "OTP sent"
    } else {
        "OTP issued but the SMS could not be delivered"
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(OtpResponse {
            message: message.to_string(),
            delivery,
        }),
    ))
}

/// POST /api/v1/users/otp/verify
async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<MessageResponse>> {
    if !state.otp.verify(&req.phone_number, &req.code).await? {
        return Err(ApiError::bad_request("invalid or expired code"));
    }

    Ok(Json(MessageResponse::new("OTP verified")))
}

/// POST /api/v1/users/signup
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    let user = state.identity.signup(&req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User registered".to_string(),
            user,
        }),
    ))
}

/// POST /api/v1/users/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let response = state
        .identity
        .login(&req.phone_number, &req.password)
        .await?;
    Ok(Json(response))
}

/// POST /api/v1/users/password
async fn set_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .identity
        .set_password(&user.phone_number, &req.password, &req.confirm_password)
        .await?;

    info!(user_id = %user.id, "password updated via API");
    Ok(Json(MessageResponse::new("Password updated")))
}
