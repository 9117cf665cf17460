use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;
pub mod views;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(handlers::list_articles))
        .route("/scrape", get(handlers::scrape))
        .route("/articles", get(handlers::list_articles).post(handlers::create_article))
        .route("/articles/:id", get(handlers::get_article).delete(handlers::delete_article))
        .route("/articles/:id/comments", post(handlers::add_comment))
        .route(
            "/articles/:article_id/comments/:comment_id/delete",
            get(handlers::delete_comment),
        )
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Bind `0.0.0.0:port` and serve until the process stops
pub async fn serve(app: Router, port: u16) -> ns_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("🌐 App running on port {}!", port);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use ns_core::{Article, Result, Error};
    pub use crate::AppState;
}
