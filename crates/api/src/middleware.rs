//! Session resolution middleware.
//!
//! Reads the auth cookie, validates the token, and re-checks the live
//! directory row so a block takes effect within the token's lifetime. The
//! middleware never rejects a request itself: it resolves to an identity or
//! to nothing, and handlers decide between 401 and 403.

use std::sync::Arc;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;

use mealbridge_auth::TokenService;
use mealbridge_core::{Identity, UserDirectory, UserStatus};

/// Cookie carrying the session token.
pub const AUTH_COOKIE: &str = "auth-token";

#[derive(Clone)]
pub struct SessionState {
    pub tokens: Arc<TokenService>,
    pub directory: Arc<dyn UserDirectory>,
}

impl SessionState {
    /// Token → live identity, or `None` for anything short of a valid token
    /// backed by a visible (existing, non-BLOCKED) user.
    pub async fn resolve(&self, token: &str) -> Option<Identity> {
        let claims = match self.tokens.validate(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "session token rejected");
                return None;
            }
        };

        let identity = match self.directory.find_identity(claims.sub).await {
            Ok(found) => found?,
            Err(e) => {
                // Fail unauthenticated rather than leak a storage error into
                // an authenticated session.
                tracing::warn!(error = %e, "identity lookup failed during session resolution");
                return None;
            }
        };

        match identity.status {
            UserStatus::Blocked => None,
            UserStatus::Pending | UserStatus::Approved | UserStatus::Rejected => Some(identity),
        }
    }
}

/// Resolved request identity, present on every request behind the middleware.
#[derive(Clone)]
pub struct CurrentUser(pub Option<Identity>);

pub async fn resolve_session(
    axum::extract::State(state): axum::extract::State<SessionState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let identity = match jar.get(AUTH_COOKIE) {
        Some(cookie) => state.resolve(cookie.value()).await,
        None => None,
    };

    req.extensions_mut().insert(CurrentUser(identity));
    next.run(req).await
}
