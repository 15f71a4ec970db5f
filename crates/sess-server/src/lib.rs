//! HTTP server for the session store.
//!
//! A thin boundary over [`SessionRepository`](sess_repo::SessionRepository):
//! it parses `source`/`type` from the path (rejecting unknown types before the
//! repository is called), hands request bodies and query parameters through
//! unmodified, and maps repository failures to status codes.
//!
//! # Endpoints
//!
//! | Method | Path | Result |
//! |---|---|---|
//! | `GET` | `/api/sessions/{source}/{type}` | all sessions in scope |
//! | `POST` | `/api/sessions/{source}/{type}` | `{"id": ...}` |
//! | `GET` | `/api/sessions/{source}/{type}/{id}` | one session |
//! | `PUT` | `/api/sessions/{source}/{type}/{id}` | empty body |
//! | `DELETE` | `/api/sessions/{source}/{type}/{id}` | empty body |
//! | `GET` | `/api/sessions/{source}/{type}/query?field=&value=` | matching sessions |
//! | `POST` | `/api/sessions/{source}/{type}/query/fetch` | matching sessions |
//! | `GET` | `/health`, `/info` | service status |

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use router::{build_router, AppState};
pub use server::SessionServer;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use sess_repo::SessionRepository;
    use tower::util::ServiceExt;

    fn app() -> axum::Router {
        build_router(SessionRepository::in_memory(), 1024)
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn info_endpoint() {
        let response = app()
            .oneshot(Request::builder().uri("/info").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let info: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(info["session_types"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let body = format!("{{\"blob\":\"{}\"}}", "x".repeat(2048));
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/sessions/msk_portal/main_session")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 413);
    }
}
