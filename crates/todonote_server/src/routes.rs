//! Route definitions for the todonote server.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use log::info;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
};

use crate::handlers;
use crate::state::AppState;

/// Page served for any GET that matches no API route or static file.
pub const INDEX_FILE: &str = "index.htm";

/// Creates the Axum router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    // The front-end may be served from another origin during development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route(
            "/notes",
            get(handlers::list_notes).post(handlers::create_note),
        )
        .route(
            "/notes/{id}",
            get(handlers::get_note)
                .put(handlers::update_note)
                .delete(handlers::soft_delete_note),
        )
        .route("/notes/{id}/complete", post(handlers::set_completed))
        .route("/notes/{id}/restore", post(handlers::restore_note))
        .route("/notes/{id}/permanent", delete(handlers::purge_note));

    let public_dir = state.config.public_dir.clone();
    let static_files =
        ServeDir::new(&public_dir).fallback(ServeFile::new(public_dir.join(INDEX_FILE)));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .fallback_service(static_files)
        .layer(middleware::from_fn(log_request))
        .layer(cors)
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    info!(
        "event=http_request module=server method={} path={} status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
