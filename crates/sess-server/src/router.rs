use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use sess_repo::SessionRepository;
use tower_http::trace::TraceLayer;

use crate::handler;

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub repo: SessionRepository,
}

const COLLECTION: &str = "/api/sessions/:source/:type";

/// Build the axum router with all session endpoints.
pub fn build_router(repo: SessionRepository, max_body_bytes: usize) -> Router {
    let collection = get(handler::list_handler).post(handler::create_handler);
    Router::new()
        .route("/health", get(handler::health_handler))
        .route("/info", get(handler::info_handler))
        .route(COLLECTION, collection.clone())
        .route(&format!("{COLLECTION}/"), collection)
        .route(&format!("{COLLECTION}/query"), get(handler::query_handler))
        .route(&format!("{COLLECTION}/query/fetch"), post(handler::fetch_handler))
        .route(
            &format!("{COLLECTION}/:id"),
            get(handler::get_handler)
                .put(handler::update_handler)
                .delete(handler::delete_handler),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { repo })
}
