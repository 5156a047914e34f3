use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::get;
use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers::{self, downloads, health, pages, projects, releases, thumbnails};
use crate::state::AppState;

const RELEASE: &str = "/projects/:project_id/releases/:release_id";

/// Build the axum router with all IMS endpoints.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health))
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/:project_id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/projects/:project_id/releases",
            get(releases::list_releases).post(releases::create_release),
        )
        .route(
            RELEASE,
            get(releases::get_release)
                .put(releases::update_release)
                .delete(releases::delete_release),
        )
        .route(
            &format!("{RELEASE}/pages"),
            get(pages::list_pages).post(pages::create_page),
        )
        .route(
            &format!("{RELEASE}/pages/:page"),
            get(pages::get_page).delete(pages::delete_page),
        )
        .route(
            &format!("{RELEASE}/thumbnails/:name"),
            get(thumbnails::get_thumbnail),
        )
        .route(
            &format!("{RELEASE}/download/:name"),
            get(downloads::download_archive),
        )
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_token))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
