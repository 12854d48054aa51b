//! Application state
//!
//! Shared state for API handlers: the store, the services built on it and
//! the token provider.

use std::sync::Arc;
use std::time::Duration;

use tutor_analytics::AnalyticsEngine;
use tutor_auth::{AuthProvider, IdentityService, LocalJwtProvider, OtpService};
use tutor_config::PaginationConfig;
use tutor_store::Store;

use crate::auth::HasAuthProvider;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Catalog, progress, ledger and the rest of the relational data
    pub store: Store,
    /// Read-side aggregations
    pub analytics: Arc<AnalyticsEngine>,
    /// OTP issue and verify
    pub otp: Arc<OtpService>,
    /// Signup, login and password changes
    pub identity: Arc<IdentityService>,
    /// Token validation for the `AuthUser` extractor
    pub auth: Arc<dyn AuthProvider>,
    /// Page size defaults for list endpoints
    pub pagination: PaginationConfig,
}

impl AppState {
    /// Create state with local HS256 tokens signed by `jwt_secret`
    pub fn new(
        store: Store,
        otp: OtpService,
        jwt_secret: &[u8],
        jwt_expires_in: Duration,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            analytics: Arc::new(AnalyticsEngine::new(store.clone())),
            identity: Arc::new(IdentityService::new(
                store.clone(),
                jwt_secret,
                jwt_expires_in,
            )),
            auth: Arc::new(LocalJwtProvider::new(jwt_secret)),
            otp: Arc::new(otp),
            store,
            pagination,
        }
    }
}

impl HasAuthProvider for AppState {
    fn auth_provider(&self) -> Arc<dyn AuthProvider> {
        Arc::clone(&self.auth)
    }
}
