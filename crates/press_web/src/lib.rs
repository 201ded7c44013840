use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use press_core::Result;

pub mod auth;
pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/generate", post(handlers::generate))
        .route(
            "/api/articles",
            get(handlers::get_articles)
                .post(handlers::upsert_articles)
                .delete(handlers::delete_article),
        )
        .route("/api/drafts", get(handlers::list_drafts))
        .route("/api/drafts/:id", axum::routing::delete(handlers::discard_draft))
        .route("/api/drafts/:id/publish", post(handlers::publish_draft))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    if state.admin_token.is_none() {
        tracing::warn!("No admin token configured, every mutating endpoint will answer 401");
    }
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use press_core::{Article, Result, Error};
    pub use crate::{create_app, serve, AppState};
}
