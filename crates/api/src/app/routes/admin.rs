//! Admin routes for account review and lifecycle actions.
//!
//! Every handler re-checks the gate: SUPERADMIN role with APPROVED status.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use mealbridge_accounts::LifecycleAction;
use mealbridge_auth::require_role;
use mealbridge_core::{Identity, Role, UserId};

use crate::app::dto::{UserActionRequest, UserDetail, UserSummary};
use crate::app::{errors, AppServices};
use crate::middleware::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:user_id", get(get_user).patch(update_user))
}

fn gate(current: &CurrentUser) -> Result<&Identity, axum::response::Response> {
    require_role(current.0.as_ref(), &[Role::Superadmin]).map_err(errors::gate_error_response)
}

fn parse_user_id(raw: &str) -> Result<UserId, axum::response::Response> {
    raw.parse::<UserId>()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid user id"))
}

/// GET /api/admin/users - all users, newest first.
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(denied) = gate(&current) {
        return denied;
    }

    match services.directory.list_newest_first().await {
        Ok(users) => {
            let users: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();
            (StatusCode::OK, Json(json!({ "users": users }))).into_response()
        }
        Err(e) => errors::domain_error_response(e),
    }
}

/// GET /api/admin/users/:user_id - one user's full profile.
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = gate(&current) {
        return denied;
    }
    let user_id = match parse_user_id(&user_id) {
        Ok(id) => id,
        Err(rejected) => return rejected,
    };

    match services.directory.find_by_id(user_id).await {
        Ok(Some(user)) => {
            (StatusCode::OK, Json(json!({ "user": UserDetail::from(&user) }))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "user not found"),
        Err(e) => errors::domain_error_response(e),
    }
}

/// PATCH /api/admin/users/:user_id - apply a lifecycle action.
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<String>,
    Json(body): Json<UserActionRequest>,
) -> axum::response::Response {
    let admin = match gate(&current) {
        Ok(admin) => admin.clone(),
        Err(denied) => return denied,
    };
    let user_id = match parse_user_id(&user_id) {
        Ok(id) => id,
        Err(rejected) => return rejected,
    };

    let action = match body.action.as_deref().and_then(LifecycleAction::parse) {
        Some(action) => action,
        None => return errors::json_error(StatusCode::BAD_REQUEST, "invalid action"),
    };

    match services.lifecycle.apply(&admin, user_id, action).await {
        Ok(user) => (
            StatusCode::OK,
            Json(json!({
                "message": "user updated successfully",
                "user": { "id": user.id.to_string(), "status": user.status },
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_response(e),
    }
}
