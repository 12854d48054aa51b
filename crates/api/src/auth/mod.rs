//! Authentication for route handlers
//!
//! Handlers that need a signed-in user take an [`AuthUser`] argument; the
//! extractor validates the bearer token through the state's provider.
//!
//! ```ignore
//! use tutor_api::auth::AuthUser;
//!
//! async fn dashboard(user: AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", user.phone_number)
//! }
//! ```

pub mod middleware;

pub use middleware::{AuthError, AuthUser, HasAuthProvider, extract_token};
pub use tutor_auth::{AuthProvider, LocalJwtProvider, TOKEN_PREFIX, UserInfo};
