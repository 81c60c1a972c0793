//! HTTP application wiring (axum router + service wiring).
//!
//! - `services.rs`: dependency wiring (directory, audit log, notifier, tokens)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware::{self, SessionState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{build_services, AppServices};

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let session_state = SessionState {
        tokens: services.tokens.clone(),
        directory: services.directory.clone(),
    };

    let api = Router::new()
        .nest("/api/auth", routes::auth::router())
        .nest("/api/admin", routes::admin::router())
        .layer(
            ServiceBuilder::new()
                .layer(Extension(services))
                .layer(axum::middleware::from_fn_with_state(
                    session_state,
                    middleware::resolve_session,
                )),
        );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
}
