//! Identity service: signup, login and password changes
//!
//! Users are keyed by phone number. Login issues a stateless bearer token
//! (`tutor_<jwt>`) that [`LocalJwtProvider`](crate::LocalJwtProvider)
//! validates with the same secret.

use std::time::Duration as StdDuration;

use chrono::Duration;
use jsonwebtoken::EncodingKey;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};
use tutor_store::{Store, StoreError, User};

use crate::claims::TokenClaims;
use crate::error::{AuthError, Result};
use crate::password::{hash_password, verify_password};
use crate::user::UserInfo;
use crate::validation::{validate_password, validate_phone};

/// Length of generated referral codes
pub const REFERRAL_CODE_LEN: usize = 6;

const REFERRAL_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Authentication response with token and user info
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// Bearer token (tutor_<jwt>)
    pub token: String,
    /// Authenticated user information
    pub user: UserInfo,
    /// When the token expires (Unix timestamp)
    pub expires_at: i64,
}

/// Registration input
#[derive(Debug, Clone, Default)]
pub struct Signup {
    pub phone_number: String,
    pub password: String,
    pub confirm_password: String,
    /// Another user's referral code
    pub referral_code: Option<String>,
}

/// Identity service
pub struct IdentityService {
    store: Store,
    encoding_key: EncodingKey,
    token_ttl: StdDuration,
}

impl std::fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityService")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl IdentityService {
    /// Create a new identity service
    ///
    /// `secret` must match the one given to the token provider.
    pub fn new(store: Store, secret: &[u8], token_ttl: StdDuration) -> Self {
        Self {
            store,
            encoding_key: EncodingKey::from_secret(secret),
            token_ttl,
        }
    }

    /// Register a new user
    ///
    /// Validates the phone number and password strength, requires the two
    /// passwords to match and resolves an optional referral code.
    pub async fn signup(&self, request: &Signup) -> Result<User> {
        validate_phone(&request.phone_number)?;
        validate_password(&request.password)?;
        if request.password != request.confirm_password {
            return Err(AuthError::validation("password", "passwords must match"));
        }

        let users = self.store.users();
        if users.get_by_phone(&request.phone_number).await?.is_some() {
            return Err(AuthError::PhoneTaken);
        }

        let referrer = match request.referral_code.as_deref().filter(|c| !c.is_empty()) {
            Some(code) => {
                let referrer = users
                    .get_by_referral_code(code)
                    .await?
                    .ok_or_else(|| AuthError::validation("referral_code", "invalid referral code"))?;
                if referrer.phone_number == request.phone_number {
                    return Err(AuthError::validation(
                        "referral_code",
                        "you cannot refer yourself",
                    ));
                }
                Some(referrer)
            }
            None => None,
        };

        let mut user = User::new(&request.phone_number, self.unused_referral_code().await?)
            .with_password_hash(hash_password(&request.password)?);
        if let Some(referrer) = referrer {
            user = user.referred_by(referrer.id);
        }

        users.create(&user).await.map_err(|e| match e {
            StoreError::AlreadyExists { .. } => AuthError::PhoneTaken,
            other => AuthError::Store(other),
        })?;

        info!(user_id = %user.id, referred = user.referred_by.is_some(), "User signed up");
        Ok(user)
    }

    /// Login with phone number and password
    pub async fn login(&self, phone_number: &str, password: &str) -> Result<AuthResponse> {
        validate_phone(phone_number)?;

        let user = self
            .store
            .users()
            .get_by_phone(phone_number)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, hash)? {
            warn!(user_id = %user.id, "Login failed");
            return Err(AuthError::InvalidCredentials);
        }

        let (token, claims) = self.generate_token(&user)?;
        info!(user_id = %user.id, "User logged in");

        Ok(AuthResponse {
            token,
            user: UserInfo::new(&user.id, &user.phone_number),
            expires_at: claims.expires_at,
        })
    }

    /// Replace a user's password
    pub async fn set_password(
        &self,
        phone_number: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        validate_phone(phone_number)?;
        validate_password(password)?;
        if password != confirm_password {
            return Err(AuthError::validation("password", "passwords must match"));
        }

        let hash = hash_password(password)?;
        if !self.store.users().set_password_hash(phone_number, &hash).await? {
            return Err(AuthError::UserNotFound);
        }

        info!(phone_number, "Password changed");
        Ok(())
    }

    // =========================================================================
    // Internal methods
    // =========================================================================

    /// Generate a bearer token for a user
    fn generate_token(&self, user: &User) -> Result<(String, TokenClaims)> {
        let ttl = Duration::from_std(self.token_ttl).unwrap_or_else(|_| Duration::hours(24));
        let claims = TokenClaims::new(&user.id, &user.phone_number, ttl);
        let token = claims.sign(&self.encoding_key)?;
        Ok((token, claims))
    }

    async fn unused_referral_code(&self) -> Result<String> {
        loop {
            let code = generate_referral_code();
            if self.store.users().get_by_referral_code(&code).await?.is_none() {
                return Ok(code);
            }
        }
    }
}

/// Random code of uppercase letters and digits
pub fn generate_referral_code() -> String {
    let mut rng = rand::rng();
    (0..REFERRAL_CODE_LEN)
        .map(|_| char::from(REFERRAL_CHARSET[rng.random_range(0..REFERRAL_CHARSET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{AuthProvider, LocalJwtProvider};
    use crate::test_utils::TEST_SECRET;

    const PHONE: &str = "09121234567";
    const PASSWORD: &str = "Str0ng!pass";

    async fn service() -> IdentityService {
        let store = Store::new_memory().await.unwrap();
        IdentityService::new(store, TEST_SECRET, StdDuration::from_secs(3600))
    }

    fn signup(phone: &str) -> Signup {
        Signup {
            phone_number: phone.to_string(),
            password: PASSWORD.to_string(),
            confirm_password: PASSWORD.to_string(),
            referral_code: None,
        }
    }

    #[test]
    fn test_referral_code_shape() {
        let code = generate_referral_code();
        assert_eq!(code.len(), REFERRAL_CODE_LEN);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let identity = service().await;
        let user = identity.signup(&signup(PHONE)).await.unwrap();
        assert_eq!(user.referral_code.len(), REFERRAL_CODE_LEN);

        let response = identity.login(PHONE, PASSWORD).await.unwrap();
        assert!(response.token.starts_with("tutor_"));
        assert_eq!(response.user.id, user.id);

        let provider = LocalJwtProvider::new(TEST_SECRET);
        let info = provider.validate(&response.token).await.unwrap();
        assert_eq!(info.phone_number, PHONE);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let identity = service().await;
        identity.signup(&signup(PHONE)).await.unwrap();

        let err = identity.login(PHONE, "Wr0ng!pass").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        let err = identity.login("09120000000", PASSWORD).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_signup_rejections() {
        let identity = service().await;
        identity.signup(&signup(PHONE)).await.unwrap();

        let err = identity.signup(&signup(PHONE)).await.unwrap_err();
        assert!(matches!(err, AuthError::PhoneTaken));

        let mut weak = signup("09120000001");
        weak.password = "weak".into();
        weak.confirm_password = "weak".into();
        let err = identity.signup(&weak).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation { field: "password", .. }));

        let mut mismatch = signup("09120000001");
        mismatch.confirm_password = "Other!pass1".into();
        let err = identity.signup(&mismatch).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation { field: "password", .. }));

        let mut bad_ref = signup("09120000001");
        bad_ref.referral_code = Some("NOPE00".into());
        let err = identity.signup(&bad_ref).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation { field: "referral_code", .. }));
    }

    #[tokio::test]
    async fn test_referral_links_users() {
        let identity = service().await;
        let first = identity.signup(&signup(PHONE)).await.unwrap();

        let mut request = signup("09120000001");
        request.referral_code = Some(first.referral_code.clone());
        let second = identity.signup(&request).await.unwrap();
        assert_eq!(second.referred_by.as_deref(), Some(first.id.as_str()));
    }

    #[tokio::test]
    async fn test_set_password() {
        let identity = service().await;
        identity.signup(&signup(PHONE)).await.unwrap();

        identity
            .set_password(PHONE, "N3w!password", "N3w!password")
            .await
            .unwrap();
        assert!(identity.login(PHONE, "N3w!password").await.is_ok());
        assert!(identity.login(PHONE, PASSWORD).await.is_err());

        let err = identity
            .set_password("09129999999", "N3w!password", "N3w!password")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }
}
