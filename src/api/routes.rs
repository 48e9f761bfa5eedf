use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;

    let mut router = Router::new()
        // Catalog
        .route("/categories", get(handlers::list_categories))
        .route("/sections/:slug", get(handlers::section_content))
        .route("/content/:id", get(handlers::view_content))
        // Auth
        .route("/auth/sign-up", post(handlers::sign_up))
        .route("/auth/sign-in", post(handlers::sign_in))
        .route("/auth/sign-out", post(handlers::sign_out))
        .route("/auth/me", get(handlers::me))
        .route("/me/purchases", get(handlers::my_purchases))
        // Admin
        .route("/admin/content", get(handlers::admin_list_content))
        .route(
            "/admin/content",
            post(handlers::create_content).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/admin/content/:id",
            put(handlers::update_content).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/admin/content/:id", delete(handlers::delete_content))
        .route("/admin/categories", post(handlers::create_category))
        .route("/admin/categories/:id", put(handlers::update_category))
        .route("/admin/categories/:id", delete(handlers::delete_category))
        // Stored objects (public or signed)
        .route("/storage/:bucket/*path", get(handlers::serve_object))
        // Internal
        .route("/_internal/health", get(handlers::health));

    // Test-only routes
    if state.config.test_mode {
        tracing::warn!("Test mode enabled — purge route is available.");
        router = router.route("/admin/purge", delete(handlers::admin_purge));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
