//! Public authentication routes: register, login, logout, me.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;

use mealbridge_accounts::{register as register_account, Registration};
use mealbridge_core::{Profile, Role, UserStatus};

use crate::app::dto::{LoginRequest, RegisterRequest, UserView};
use crate::app::{errors, AppServices};
use crate::middleware::{CurrentUser, AUTH_COOKIE};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(mealbridge_auth::TOKEN_TTL_DAYS))
        .build()
}

/// POST /api/auth/register - create a PENDING account.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterRequest>,
) -> axum::response::Response {
    let (Some(email), Some(password), Some(first_name), Some(last_name), Some(role)) = (
        body.email,
        body.password,
        body.first_name,
        body.last_name,
        body.role,
    ) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "missing required fields");
    };

    let Ok(role) = role.parse::<Role>() else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid role; must be DONOR or RECEIVER",
        );
    };

    let registration = Registration {
        email,
        password,
        first_name,
        last_name,
        role,
        profile: Profile {
            phone: body.phone_number,
            national_id: body.national_id,
            address: body.address,
            city: body.city,
            state: body.state,
            postal_code: body.postal_code,
            latitude: body.latitude,
            longitude: body.longitude,
        },
    };

    match register_account(services.directory.as_ref(), registration).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "registration successful; your account is pending approval",
                "user": UserView::from(&user),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_response(e),
    }
}

/// POST /api/auth/login - verify credentials and set the session cookie.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "missing email or password");
    };

    let user = match services.directory.find_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            // One message for unknown email and wrong password.
            return errors::json_error(StatusCode::UNAUTHORIZED, "invalid email or password");
        }
        Err(e) => return errors::domain_error_response(e),
    };

    match mealbridge_auth::verify_password(&password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return errors::json_error(StatusCode::UNAUTHORIZED, "invalid email or password");
        }
        Err(e) => return errors::domain_error_response(e),
    }

    if user.status == UserStatus::Blocked {
        return errors::json_error(StatusCode::FORBIDDEN, "account is blocked");
    }

    let token = match services.tokens.issue(&user.identity()) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "token issuance failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
        }
    };

    tracing::info!(user_id = %user.id, "login");
    (
        StatusCode::OK,
        jar.add(session_cookie(token)),
        Json(json!({
            "message": "login successful",
            "user": UserView::from(&user),
        })),
    )
        .into_response()
}

/// POST /api/auth/logout - clear the session cookie.
pub async fn logout(jar: CookieJar) -> axum::response::Response {
    let removal = Cookie::build((AUTH_COOKIE, "")).path("/").build();
    (
        StatusCode::OK,
        jar.remove(removal),
        Json(json!({ "message": "logged out" })),
    )
        .into_response()
}

/// GET /api/auth/me - current identity or 401.
pub async fn me(Extension(current): Extension<CurrentUser>) -> axum::response::Response {
    match current.0 {
        Some(identity) => (
            StatusCode::OK,
            Json(json!({ "user": UserView::from(&identity) })),
        )
            .into_response(),
        None => errors::json_error(StatusCode::UNAUTHORIZED, "not authenticated"),
    }
}
