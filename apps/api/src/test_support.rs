use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, State};
use folio_application::RegisterUserInput;
use folio_core::{AppError, UserIdentity};
use folio_infrastructure::InMemoryStore;
use tower_sessions::{MemoryStore, Session};

use crate::api_services::build_in_memory_app_state;
use crate::dto::{CreateJournalRequest, RoleChangeRequest};
use crate::error::ApiError;
use crate::handlers::{journals, roles};
use crate::state::AppState;

pub(crate) const FRONTEND_URL: &str = "http://localhost:3000";
pub(crate) const BOOTSTRAP_TOKEN: &str = "bootstrap-token-for-tests";
pub(crate) const PASSWORD: &str = "marginal-notes-2041";

pub(crate) fn test_state() -> AppState {
    build_in_memory_app_state(
        Arc::new(InMemoryStore::new()),
        FRONTEND_URL,
        BOOTSTRAP_TOKEN,
    )
}

pub(crate) fn empty_session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

pub(crate) fn registration(email: &str, display_name: &str) -> RegisterUserInput {
    RegisterUserInput {
        email: email.to_owned(),
        display_name: display_name.to_owned(),
        password: PASSWORD.to_owned(),
    }
}

pub(crate) fn app_error(error: ApiError) -> AppError {
    error.0
}

pub(crate) async fn bootstrap_admin(state: &AppState) -> UserIdentity {
    let (account, _) = state
        .user_service
        .bootstrap_site_admin(registration("editor-in-chief@press.test", "Chief"))
        .await
        .unwrap_or_else(|error| panic!("bootstrap failed: {error}"));
    account.identity()
}

pub(crate) async fn register(state: &AppState, admin: &UserIdentity, email: &str) -> UserIdentity {
    state
        .user_service
        .register_user(admin, registration(email, "Contributor"))
        .await
        .unwrap_or_else(|error| panic!("registration of {email} failed: {error}"))
        .identity()
}

pub(crate) async fn create_journal(state: &AppState, admin: &UserIdentity, path: &str) -> i64 {
    let (_, Json(envelope)) = journals::create_journal_handler(
        State(state.clone()),
        Extension(admin.clone()),
        Json(CreateJournalRequest {
            path: path.to_owned(),
            name: format!("Journal {path}"),
            description: None,
            enabled: true,
        }),
    )
    .await
    .unwrap_or_else(|error| panic!("journal creation failed: {}", error.0));

    envelope
        .data
        .unwrap_or_else(|| panic!("journal creation returned no data"))
        .id
}

pub(crate) async fn grant(
    state: &AppState,
    admin: &UserIdentity,
    user: &UserIdentity,
    role: &str,
    journal_id: Option<i64>,
) {
    roles::grant_role_handler(
        State(state.clone()),
        Extension(admin.clone()),
        Json(RoleChangeRequest {
            user_id: user.user_id().to_string(),
            role: role.to_owned(),
            journal_id,
        }),
    )
    .await
    .unwrap_or_else(|error| panic!("granting {role} failed: {}", error.0));
}
