use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;
use crate::{auth, handlers};

/// Routes reachable without a session.
pub(super) fn build_public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/me", get(auth::me_handler))
}
