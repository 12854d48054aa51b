//! Tutor - Authentication
//!
//! Phone-number identity, one-time passwords and bearer tokens.
//!
//! # Overview
//!
//! | Piece | Role |
//! |-------|------|
//! | [`OtpService`] | Issue a numeric code to a phone, verify it while it lives in the cache |
//! | [`IdentityService`] | Signup, login and password changes over the user store |
//! | [`LocalJwtProvider`] | Validate bearer tokens on incoming requests |
//!
//! # Tokens
//!
//! ```text
//! tutor_eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...
//! ```
//! - HS256 signed, claims `uid`, `phone`, `iat`, `exp`
//! - Stateless: no session table, expiry is the only revocation
//!
//! # Collaborators
//!
//! The OTP flow talks to a TTL cache ([`OtpCache`]: Redis or in-memory) and
//! an SMS gateway ([`SmsGateway`]: Kavenegar or log-only). Both are trait
//! objects chosen at startup from configuration.

mod cache;
mod claims;
mod error;
mod otp;
pub mod password;
mod provider;
mod service;
mod sms;
mod user;
pub mod validation;

/// Test utilities for generating tokens and faking collaborators
pub mod test_utils;

pub use error::{AuthError, Result};

// Tokens
pub use claims::{TOKEN_PREFIX, TokenClaims, strip_token_prefix};
pub use provider::{AuthProvider, LocalJwtProvider};
pub use user::UserInfo;

// Identity
pub use service::{
    AuthResponse, IdentityService, REFERRAL_CODE_LEN, Signup, generate_referral_code,
};

// OTP
pub use cache::{MemoryCache, OtpCache, RedisCache};
pub use otp::{OtpService, SmsDelivery, generate_code};
pub use sms::{KavenegarGateway, LogGateway, SmsError, SmsGateway, otp_message, redact_digits};
