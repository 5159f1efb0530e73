mod cors;
mod public_auth;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post};
use folio_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::handlers::{announcements, issues, journals, reviews, roles, submissions, users};
use crate::middleware;
use crate::state::AppState;

pub fn build_router<Store>(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<Store>,
) -> Result<Router, AppError>
where
    Store: SessionStore + Clone,
{
    let protected_routes = Router::new()
        .route("/api/me/roles", get(roles::my_roles_handler))
        .route(
            "/api/users",
            get(users::list_users_handler).post(users::create_user_handler),
        )
        .route(
            "/api/users/{user_id}",
            get(users::get_user_handler)
                .put(users::update_user_handler)
                .delete(users::delete_user_handler),
        )
        .route("/api/roles/grant", post(roles::grant_role_handler))
        .route("/api/roles/revoke", post(roles::revoke_role_handler))
        .route("/api/roles/check/site", get(roles::check_site_role_handler))
        .route(
            "/api/roles/check/journal",
            get(roles::check_journal_role_handler),
        )
        .route(
            "/api/journals",
            get(journals::list_journals_handler).post(journals::create_journal_handler),
        )
        .route(
            "/api/journals/by-path/{path}",
            get(journals::get_journal_by_path_handler),
        )
        .route(
            "/api/journals/{journal_id}",
            get(journals::get_journal_handler)
                .put(journals::update_journal_handler)
                .delete(journals::delete_journal_handler),
        )
        .route(
            "/api/journals/{journal_id}/settings",
            get(journals::list_journal_settings_handler),
        )
        .route(
            "/api/journals/{journal_id}/issues",
            get(issues::list_issues_handler).post(issues::create_issue_handler),
        )
        .route(
            "/api/journals/{journal_id}/submissions",
            get(submissions::list_journal_submissions_handler)
                .post(submissions::create_submission_handler),
        )
        .route(
            "/api/announcements",
            get(announcements::list_announcements_handler)
                .post(announcements::create_announcement_handler),
        )
        .route(
            "/api/announcements/{announcement_id}",
            get(announcements::get_announcement_handler)
                .put(announcements::update_announcement_handler)
                .delete(announcements::delete_announcement_handler),
        )
        .route(
            "/api/issues/{issue_id}",
            get(issues::get_issue_handler)
                .put(issues::update_issue_handler)
                .delete(issues::delete_issue_handler),
        )
        .route(
            "/api/submissions/mine",
            get(submissions::list_my_submissions_handler),
        )
        .route(
            "/api/submissions/{submission_id}",
            get(submissions::get_submission_handler)
                .put(submissions::update_submission_handler)
                .delete(submissions::delete_submission_handler),
        )
        .route(
            "/api/submissions/{submission_id}/publications",
            post(submissions::create_publication_handler),
        )
        .route(
            "/api/submissions/{submission_id}/reviews",
            get(reviews::list_submission_reviews_handler).post(reviews::assign_reviewer_handler),
        )
        .route("/api/reviews/mine", get(reviews::list_my_reviews_handler))
        .route(
            "/api/reviews/{assignment_id}",
            delete(reviews::delete_review_handler),
        )
        .route(
            "/api/reviews/{assignment_id}/respond",
            post(reviews::respond_to_review_handler),
        )
        .route(
            "/api/reviews/{assignment_id}/complete",
            post(reviews::complete_review_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    Ok(Router::new()
        .merge(public_auth::build_public_routes())
        .merge(protected_routes)
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
